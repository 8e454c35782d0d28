//! # Gymdesk Service
//!
//! Business logic service layer for Gymdesk.
//! One service trait per entity, each with an implementation that works
//! against the repository traits and enforces who may do what.

pub mod attendance_service;
pub mod auth_service;
pub mod class_service;
pub mod container;
pub mod dashboard_service;
pub mod dto;
pub mod enrollment_service;
pub mod r#impl;
pub mod mappers;
pub mod meal_plan_service;
pub mod membership_service;
pub mod payment_service;
pub mod trainer_service;
pub mod user_service;
pub mod workout_plan_service;

mod support;
#[cfg(test)]
mod testing;

pub use attendance_service::*;
pub use auth_service::*;
pub use class_service::*;
pub use container::*;
pub use dashboard_service::*;
pub use dto::*;
pub use enrollment_service::*;
pub use mappers::*;
pub use meal_plan_service::*;
pub use membership_service::*;
pub use payment_service::*;
pub use r#impl::*;
pub use trainer_service::*;
pub use user_service::*;
pub use workout_plan_service::*;
