//! Domain entities.

mod attendance;
mod enrollment;
mod gym_class;
mod membership;
mod payment;
mod plans;
mod trainer;
mod user;

pub use attendance::{Attendance, AttendanceOutcome, AttendanceSummary, AttendanceWindow};
pub use enrollment::{Enrollment, EnrollmentOutcome};
pub use gym_class::{ClassUpdateOutcome, GymClass};
pub use membership::Membership;
pub use payment::{Payment, ProcessedPayment};
pub use plans::{Exercise, Meal, MealPlan, WorkoutPlan};
pub use trainer::{Trainer, TrainerProfile};
pub use user::{User, UserBuilder};
