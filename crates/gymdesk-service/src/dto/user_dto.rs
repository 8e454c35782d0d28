//! User-related DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use gymdesk_core::rules::{password_complexity, valid_person_name, valid_phone};
use gymdesk_core::{User, UserId, UserRole, UserStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to create a user of any role (admin only).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
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

    #[serde(default)]
    pub role: UserRole,

    #[validate(custom(function = "valid_phone"))]
    pub phone: Option<String>,

    pub date_of_birth: Option<NaiveDate>,
}

/// Partial update of a user. Only admins may change `role` and `status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 64), custom(function = "valid_person_name"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 64), custom(function = "valid_person_name"))]
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(custom(function = "valid_phone"))]
    pub phone: Option<String>,

    pub date_of_birth: Option<NaiveDate>,

    pub role: Option<UserRole>,

    pub status: Option<UserStatus>,
}

impl UpdateUserRequest {
    /// Whether the request touches fields reserved for admins.
    #[must_use]
    pub const fn changes_access(&self) -> bool {
        self.role.is_some() || self.status.is_some()
    }
}

/// User response DTO.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email.to_string(),
            role: user.role,
            phone: user.phone,
            date_of_birth: user.date_of_birth,
            status: user.status,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self::from(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_core::Email;

    #[test]
    fn test_create_user_request_defaults_to_member() {
        let json = r#"{
            "first_name": "Ana",
            "last_name": "Silva",
            "email": "ana@gym.test",
            "password": "Secret123"
        }"#;
        let request: CreateUserRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.role, UserRole::Member);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_user_request_rejects_bad_name() {
        let request = UpdateUserRequest {
            first_name: Some("R2-D2".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(request.validate().is_err());
        assert!(!request.changes_access());
    }

    #[test]
    fn test_user_response_hides_password() {
        let user = User::new(
            "Ana".to_string(),
            "Silva".to_string(),
            Email::new("ana@gym.test").unwrap(),
            "secret-hash".to_string(),
            UserRole::Member,
        );
        let json = serde_json::to_string(&UserResponse::from(&user)).unwrap();
        assert!(json.contains("ana@gym.test"));
        assert!(!json.contains("secret-hash"));
    }
}
