//! Configuration validation.
//!
//! Collects every problem in one pass so an operator can fix the whole file
//! at once instead of restarting once per mistake.

use crate::{AppConfig, DatabaseConfig, GymConfig, ObservabilityConfig, SecurityConfig, ServerConfig};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// JWT secret is too short.
    JwtSecretTooShort { actual: usize, minimum: usize },
    /// Port 0 cannot be bound.
    InvalidPort { value: u16 },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Database URL is malformed or not MySQL.
    InvalidUrl { message: String },
    /// A duration must be positive.
    NonPositiveTimeout { name: String },
    /// Argon2 parameters out of range.
    InvalidHashCost { name: String, value: u32 },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
    /// Attendance back-dating window too large.
    BackdateWindowTooLarge { value: u32, maximum: u32 },
    /// Bootstrap admin has an unusable email or password.
    InvalidBootstrapAdmin { message: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JwtSecretTooShort { actual, minimum } => {
                write!(f, "JWT secret too short: {actual} characters (minimum {minimum})")
            }
            Self::InvalidPort { value } => write!(f, "Invalid server port: {value}"),
            Self::InvalidPoolSize { min, max } => {
                write!(f, "Invalid pool size: min ({min}) cannot be greater than max ({max})")
            }
            Self::InvalidUrl { message } => write!(f, "Invalid database URL: {message}"),
            Self::NonPositiveTimeout { name } => write!(f, "'{name}' must be positive"),
            Self::InvalidHashCost { name, value } => write!(f, "Invalid password hashing {name}: {value}"),
            Self::InvalidLogLevel { value } => {
                write!(f, "Invalid log level: '{value}' (valid: trace, debug, info, warn, error)")
            }
            Self::InvalidLogFormat { value } => write!(f, "Invalid log format: '{value}' (valid: json, pretty)"),
            Self::BackdateWindowTooLarge { value, maximum } => {
                write!(f, "gym.max_attendance_backdate_days is {value}, maximum is {maximum}")
            }
            Self::InvalidBootstrapAdmin { message } => write!(f, "Invalid bootstrap admin: {message}"),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    const MIN_JWT_SECRET_LENGTH: usize = 32;
    const MIN_MEMORY_COST_KIB: u32 = 8;
    const MAX_BACKDATE_DAYS: u32 = 365;
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    ///
    /// # Errors
    ///
    /// Returns every validation error found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_security(&config.security, &mut errors);
        Self::validate_server(&config.server, &mut errors);
        Self::validate_database(&config.database, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);
        Self::validate_gym(&config.gym, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_security(config: &SecurityConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.jwt_secret.len() < Self::MIN_JWT_SECRET_LENGTH {
            errors.push(ConfigValidationError::JwtSecretTooShort {
                actual: config.jwt_secret.len(),
                minimum: Self::MIN_JWT_SECRET_LENGTH,
            });
        }
        if config.jwt_access_expiration_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "security.jwt_access_expiration_secs".to_string(),
            });
        }
        if config.jwt_refresh_expiration_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "security.jwt_refresh_expiration_secs".to_string(),
            });
        }
        if config.password_memory_cost_kib < Self::MIN_MEMORY_COST_KIB {
            errors.push(ConfigValidationError::InvalidHashCost {
                name: "memory cost".to_string(),
                value: config.password_memory_cost_kib,
            });
        }
        if config.password_time_cost == 0 {
            errors.push(ConfigValidationError::InvalidHashCost {
                name: "time cost".to_string(),
                value: 0,
            });
        }
        if let Some(admin) = &config.bootstrap_admin {
            if !admin.email.contains('@') {
                errors.push(ConfigValidationError::InvalidBootstrapAdmin {
                    message: format!("'{}' is not an email address", admin.email),
                });
            }
            if admin.password.len() < 8 {
                errors.push(ConfigValidationError::InvalidBootstrapAdmin {
                    message: "password must be at least 8 characters".to_string(),
                });
            }
        }
    }

    fn validate_server(config: &ServerConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.port == 0 {
            errors.push(ConfigValidationError::InvalidPort { value: config.port });
        }
        if config.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "server.request_timeout_secs".to_string(),
            });
        }
    }

    fn validate_database(config: &DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.url.is_empty() {
            errors.push(ConfigValidationError::InvalidUrl {
                message: "URL cannot be empty".to_string(),
            });
        } else {
            match Url::parse(&config.url) {
                Ok(url) if url.scheme() == "mysql" => {}
                Ok(url) => errors.push(ConfigValidationError::InvalidUrl {
                    message: format!("unsupported scheme '{}', expected mysql://", url.scheme()),
                }),
                Err(e) => errors.push(ConfigValidationError::InvalidUrl { message: e.to_string() }),
            }
        }

        if config.min_connections > config.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: config.min_connections,
                max: config.max_connections,
            });
        }
        if config.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.connect_timeout_secs".to_string(),
            });
        }
    }

    fn validate_observability(config: &ObservabilityConfig, errors: &mut Vec<ConfigValidationError>) {
        if !Self::VALID_LOG_LEVELS.contains(&config.log_level.to_lowercase().as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }
        if !matches!(config.log_format.to_lowercase().as_str(), "json" | "pretty") {
            errors.push(ConfigValidationError::InvalidLogFormat {
                value: config.log_format.clone(),
            });
        }
    }

    fn validate_gym(config: &GymConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.max_attendance_backdate_days > Self::MAX_BACKDATE_DAYS {
            errors.push(ConfigValidationError::BackdateWindowTooLarge {
                value: config.max_attendance_backdate_days,
                maximum: Self::MAX_BACKDATE_DAYS,
            });
        }
        if config.max_bulk_attendance == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "gym.max_bulk_attendance".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BootstrapAdmin;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_short_jwt_secret() {
        let mut config = AppConfig::default();
        config.security.jwt_secret = "short".to_string();
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(errors[0], ConfigValidationError::JwtSecretTooShort { actual: 5, .. }));
    }

    #[test]
    fn test_non_mysql_url_rejected() {
        let mut config = AppConfig::default();
        config.database.url = "postgres://localhost/gym".to_string();
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ConfigValidationError::InvalidUrl { .. })));
    }

    #[test]
    fn test_collects_multiple_errors() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        config.database.min_connections = 50;
        config.observability.log_level = "loud".to_string();
        config.gym.max_attendance_backdate_days = 400;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_bootstrap_admin_checked() {
        let mut config = AppConfig::default();
        config.security.bootstrap_admin = Some(BootstrapAdmin {
            email: "nobody".to_string(),
            password: "123".to_string(),
            first_name: "Gym".to_string(),
            last_name: "Admin".to_string(),
        });
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_error_display() {
        let err = ConfigValidationError::BackdateWindowTooLarge { value: 400, maximum: 365 };
        assert!(err.to_string().contains("400"));
    }
}
