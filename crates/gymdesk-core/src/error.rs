//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for all layers of Gymdesk.
///
/// Every repository, service and handler returns this type. The REST layer
/// turns it into an HTTP status and a JSON error body.
#[derive(Error, Debug)]
pub enum GymdeskError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (e.g., duplicate entry, class already full)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Business rule violation
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    // ============ Authentication/Authorization Errors ============
    /// Unauthorized access
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden access
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid token
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token expired
    #[error("Token expired")]
    TokenExpired,

    /// Invalid credentials
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Service unavailable (e.g. database not reachable during readiness checks)
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GymdeskError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) | Self::BusinessRule(_) => 400,
            Self::Conflict(_) => 409,
            Self::Unauthorized(_) | Self::InvalidToken(_) | Self::TokenExpired | Self::InvalidCredentials => 401,
            Self::Forbidden(_) => 403,
            Self::Unavailable(_) => 503,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a business rule violation.
    #[must_use]
    pub fn business_rule<T: Into<String>>(message: T) -> Self {
        Self::BusinessRule(message.into())
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized<T: Into<String>>(message: T) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error is the caller's fault (4xx) rather than ours.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        let code = self.status_code();
        code >= 400 && code < 500
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for GymdeskError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            // Only duplicate keys (MySQL 1062) are conflicts. SQLSTATE 23000 also
            // covers foreign key failures, which stay database errors.
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Self::Unavailable(err.to_string()),
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for GymdeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {err}"))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
    /// Request id of the failing request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `GymdeskError`.
    ///
    /// Server-side failures are reported with a generic message so that
    /// SQL text and internals do not leak to clients.
    #[must_use]
    pub fn from_error(error: &GymdeskError) -> Self {
        let message = if error.status_code() >= 500 && error.status_code() != 503 {
            "An internal error occurred".to_string()
        } else {
            error.to_string()
        };
        Self {
            code: error.error_code().to_string(),
            message,
            details: None,
            request_id: None,
        }
    }

    /// Sets the request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&GymdeskError> for ErrorResponse {
    fn from(error: &GymdeskError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(feature = "sqlx")]
    use sqlx::error::DatabaseError;

    #[cfg(feature = "sqlx")]
    #[derive(Debug)]
    struct FakeDbError(sqlx::error::ErrorKind);

    #[cfg(feature = "sqlx")]
    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message())
        }
    }

    #[cfg(feature = "sqlx")]
    impl std::error::Error for FakeDbError {}

    #[cfg(feature = "sqlx")]
    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "integrity constraint violation"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some("23000".into())
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            match self.0 {
                sqlx::error::ErrorKind::UniqueViolation => sqlx::error::ErrorKind::UniqueViolation,
                sqlx::error::ErrorKind::ForeignKeyViolation => sqlx::error::ErrorKind::ForeignKeyViolation,
                _ => sqlx::error::ErrorKind::Other,
            }
        }
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_only_duplicate_keys_become_conflicts() {
        let duplicate = sqlx::Error::Database(Box::new(FakeDbError(sqlx::error::ErrorKind::UniqueViolation)));
        assert_eq!(GymdeskError::from(duplicate).status_code(), 409);

        let foreign_key = sqlx::Error::Database(Box::new(FakeDbError(sqlx::error::ErrorKind::ForeignKeyViolation)));
        let err = GymdeskError::from(foreign_key);
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(GymdeskError::not_found("Class", 1).status_code(), 404);
        assert_eq!(GymdeskError::validation("invalid email").status_code(), 400);
        assert_eq!(GymdeskError::business_rule("membership expired").status_code(), 400);
        assert_eq!(GymdeskError::unauthorized("not logged in").status_code(), 401);
        assert_eq!(GymdeskError::forbidden("no permission").status_code(), 403);
        assert_eq!(GymdeskError::conflict("class is full").status_code(), 409);
        assert_eq!(GymdeskError::Unavailable("db down".to_string()).status_code(), 503);
    }

    #[test]
    fn test_auth_errors_are_401() {
        assert_eq!(GymdeskError::InvalidToken("bad".to_string()).status_code(), 401);
        assert_eq!(GymdeskError::TokenExpired.status_code(), 401);
        assert_eq!(GymdeskError::InvalidCredentials.status_code(), 401);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(GymdeskError::not_found("Member", 1).error_code(), "NOT_FOUND");
        assert_eq!(GymdeskError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(GymdeskError::validation("bad input").error_code(), "VALIDATION_ERROR");
        assert_eq!(GymdeskError::business_rule("nope").error_code(), "BUSINESS_RULE_VIOLATION");
        assert_eq!(GymdeskError::Database("db".to_string()).error_code(), "DATABASE_ERROR");
        assert_eq!(GymdeskError::internal("err").error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(GymdeskError::conflict("dup").is_client_error());
        assert!(GymdeskError::InvalidCredentials.is_client_error());
        assert!(!GymdeskError::Database("down".to_string()).is_client_error());
    }

    #[test]
    fn test_not_found_message_names_resource() {
        let err = GymdeskError::not_found("Trainer", "abc");
        assert!(err.to_string().contains("Trainer"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_error_response_hides_internal_messages() {
        let err = GymdeskError::Database("Table 'gym.users' doesn't exist".to_string());
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.code, "DATABASE_ERROR");
        assert!(!response.message.contains("gym.users"));
    }

    #[test]
    fn test_error_response_with_request_id_and_details() {
        let err = GymdeskError::validation("bad input");
        let response = ErrorResponse::from_error(&err)
            .with_request_id("req-123")
            .with_details(vec![FieldError {
                field: "email".to_string(),
                message: "Invalid email".to_string(),
                code: "email".to_string(),
            }]);
        assert_eq!(response.request_id.as_deref(), Some("req-123"));
        assert_eq!(response.details.map(|d| d.len()), Some(1));
        assert!(response.message.contains("bad input"));
    }
}
