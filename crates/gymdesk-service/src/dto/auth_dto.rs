//! Authentication-related DTOs.

use super::UserResponse;
use chrono::NaiveDate;
use gymdesk_core::rules::{password_complexity, valid_person_name, valid_phone};
use gymdesk_core::MembershipType;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Self-service registration of a new member.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 64, message = "First name must be 1-64 characters"),
        custom(function = "valid_person_name")
    )]
    pub first_name: String,

    #[validate(
        length(min = 1, max = 64, message = "Last name must be 1-64 characters"),
        custom(function = "valid_person_name")
    )]
    pub last_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "password_complexity"))]
    pub password: String,

    #[validate(custom(function = "valid_phone"))]
    pub phone: Option<String>,

    pub date_of_birth: Option<NaiveDate>,

    /// Starts a membership of this type today when given.
    pub membership_type: Option<MembershipType>,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Request to change the caller's own password.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(custom(function = "password_complexity"))]
    pub new_password: String,
}

/// Authentication response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Seconds until the access token expires.
    pub expires_in: u64,
    pub user: UserResponse,
}

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
