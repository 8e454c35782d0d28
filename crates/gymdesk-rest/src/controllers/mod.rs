//! REST API controllers.

pub mod attendance_controller;
pub mod auth_controller;
pub mod class_controller;
pub mod dashboard_controller;
pub mod enrollment_controller;
pub mod health_controller;
pub mod meal_plan_controller;
pub mod member_controller;
pub mod membership_controller;
pub mod payment_controller;
pub mod trainer_controller;
pub mod user_controller;
pub mod workout_plan_controller;

pub use health_controller::*;

use crate::responses::AppError;
use gymdesk_core::GymdeskError;
use std::str::FromStr;

/// Parses a typed id from a path segment, answering 400 on garbage.
pub(crate) fn parse_id<T: FromStr>(kind: &str, raw: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError(GymdeskError::validation(format!("Invalid {kind} ID: {raw}"))))
}
