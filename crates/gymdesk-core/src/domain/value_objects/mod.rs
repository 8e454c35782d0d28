//! Value objects shared by the gym entities.

mod attendance;
mod email;
mod membership;
mod payment;
mod plan;
mod role;
mod status;

pub use attendance::{AttendanceStatus, EnrollmentStatus};
pub use email::{Email, EmailError};
pub use membership::{MembershipStatus, MembershipType};
pub use payment::{PaymentMethod, PaymentStatus};
pub use plan::Difficulty;
pub use role::{Permission, UserRole};
pub use status::UserStatus;
