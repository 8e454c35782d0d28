//! Data Transfer Objects (DTOs).

mod attendance_dto;
mod auth_dto;
mod class_dto;
mod dashboard_dto;
mod membership_dto;
mod payment_dto;
mod plan_dto;
mod trainer_dto;
mod user_dto;

pub use attendance_dto::*;
pub use auth_dto::*;
pub use class_dto::*;
pub use dashboard_dto::*;
pub use membership_dto::*;
pub use payment_dto::*;
pub use plan_dto::*;
pub use trainer_dto::*;
pub use user_dto::*;
