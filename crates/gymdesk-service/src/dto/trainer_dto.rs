//! Trainer DTOs.

use chrono::{DateTime, Utc};
use gymdesk_core::rules::{not_blank, password_complexity, valid_person_name, valid_phone};
use gymdesk_core::{TrainerId, TrainerProfile, UserId, UserStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Creates the trainer's user account and profile together.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTrainerRequest {
    #[validate(length(min = 1, max = 64), custom(function = "valid_person_name"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 64), custom(function = "valid_person_name"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "password_complexity"))]
    pub password: String,

    #[validate(custom(function = "valid_phone"))]
    pub phone: Option<String>,

    #[validate(
        length(min = 1, max = 100, message = "Specialization must be 1-100 characters"),
        custom(function = "not_blank")
    )]
    pub specialization: String,

    #[validate(range(max = 60, message = "Experience cannot exceed 60 years"))]
    #[serde(default)]
    pub experience_years: u32,

    #[validate(length(max = 200))]
    pub certification: Option<String>,

    #[validate(length(max = 2000))]
    pub bio: Option<String>,

    #[validate(range(min = 0, message = "Hourly rate cannot be negative"))]
    pub hourly_rate_cents: Option<i64>,
}

/// Partial update of a trainer's account and profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTrainerRequest {
    #[validate(length(min = 1, max = 64), custom(function = "valid_person_name"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 64), custom(function = "valid_person_name"))]
    pub last_name: Option<String>,

    #[validate(custom(function = "valid_phone"))]
    pub phone: Option<String>,

    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub specialization: Option<String>,

    #[validate(range(max = 60))]
    pub experience_years: Option<u32>,

    #[validate(length(max = 200))]
    pub certification: Option<String>,

    #[validate(length(max = 2000))]
    pub bio: Option<String>,

    #[validate(range(min = 0))]
    pub hourly_rate_cents: Option<i64>,
}

/// Trainer with the contact details of their user account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrainerResponse {
    pub id: TrainerId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: UserStatus,
    pub specialization: String,
    pub experience_years: u32,
    pub certification: Option<String>,
    pub bio: Option<String>,
    pub hourly_rate_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TrainerProfile> for TrainerResponse {
    fn from(profile: TrainerProfile) -> Self {
        let TrainerProfile { trainer, user } = profile;
        Self {
            id: trainer.id,
            user_id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email.to_string(),
            phone: user.phone,
            status: user.status,
            specialization: trainer.specialization,
            experience_years: trainer.experience_years,
            certification: trainer.certification,
            bio: trainer.bio,
            hourly_rate_cents: trainer.hourly_rate_cents,
            created_at: trainer.created_at,
            updated_at: trainer.updated_at,
        }
    }
}
