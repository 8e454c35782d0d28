//! MySQL repository implementations.
//!
//! UUIDs are stored as `CHAR(36)` and enums as their lower-case names.

mod attendance_repository;
mod class_repository;
mod enrollment_repository;
mod membership_repository;
mod payment_repository;
mod plan_repository;
mod trainer_repository;
mod user_repository;

pub use attendance_repository::MySqlAttendanceRepository;
pub use class_repository::MySqlClassRepository;
pub use enrollment_repository::MySqlEnrollmentRepository;
pub use membership_repository::MySqlMembershipRepository;
pub use payment_repository::MySqlPaymentRepository;
pub use plan_repository::{MySqlMealPlanRepository, MySqlWorkoutPlanRepository};
pub use trainer_repository::MySqlTrainerRepository;
pub use user_repository::MySqlUserRepository;

use gymdesk_core::{GymdeskError, GymdeskResult};
use uuid::Uuid;

/// Parses a `CHAR(36)` column into a typed id.
fn parse_id<T: From<Uuid>>(value: &str, column: &'static str) -> GymdeskResult<T> {
    Uuid::parse_str(value)
        .map(T::from)
        .map_err(|e| GymdeskError::Internal(format!("Invalid UUID in column {column}: {e}")))
}

fn parse_opt_id<T: From<Uuid>>(value: Option<&str>, column: &'static str) -> GymdeskResult<Option<T>> {
    value.map(|v| parse_id(v, column)).transpose()
}

/// Parses an enum column with the type's own `parse`.
fn parse_enum<T>(value: &str, column: &'static str, parse: fn(&str) -> Option<T>) -> GymdeskResult<T> {
    parse(value).ok_or_else(|| GymdeskError::Internal(format!("Unknown value '{value}' in column {column}")))
}

/// `COUNT(*)` comes back as a signed `BIGINT`.
#[allow(clippy::cast_sign_loss)]
const fn count(value: i64) -> u64 {
    if value < 0 {
        0
    } else {
        value as u64
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn bind_u64(value: u64) -> i64 {
    value as i64
}
