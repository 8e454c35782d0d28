//! Validation utilities.

use crate::{FieldError, GymdeskError};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `GymdeskError` on failure.
    fn validate_request(&self) -> Result<(), GymdeskError> {
        self.validate().map_err(validation_errors_to_gymdesk_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
///
/// Nested structs and lists are reported with dotted / indexed paths such as
/// `exercises[1].sets`.
#[must_use]
pub fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_into(errors, None, &mut out);
    out
}

fn collect_into(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{p}.{field}"),
            None => (*field).to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|error| FieldError {
                    field: path.clone(),
                    message: error
                        .message
                        .as_ref()
                        .map_or_else(|| error.code.to_string(), ToString::to_string),
                    code: error.code.to_string(),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_into(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_into(inner, Some(&format!("{path}[{index}]")), out);
                }
            }
        }
    }
}

/// Converts `validator::ValidationErrors` to `GymdeskError`.
#[must_use]
pub fn validation_errors_to_gymdesk_error(errors: ValidationErrors) -> GymdeskError {
    let message = collect_field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    GymdeskError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates that a password meets complexity requirements.
    pub fn password_complexity(password: &str) -> Result<(), ValidationError> {
        if password.len() < 8 {
            return Err(ValidationError::new("password_too_short"));
        }

        let has_uppercase = password.chars().any(char::is_uppercase);
        let has_lowercase = password.chars().any(char::is_lowercase);
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if !has_uppercase {
            return Err(ValidationError::new("password_missing_uppercase"));
        }
        if !has_lowercase {
            return Err(ValidationError::new("password_missing_lowercase"));
        }
        if !has_digit {
            return Err(ValidationError::new("password_missing_digit"));
        }

        Ok(())
    }

    /// Validates a phone number: digits with optional leading `+`, spaces or dashes, 7-20 digits.
    pub fn valid_phone(phone: &str) -> Result<(), ValidationError> {
        let body = phone.strip_prefix('+').unwrap_or(phone);
        if !body.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-') {
            return Err(ValidationError::new("phone_invalid_characters"));
        }
        let digits = body.chars().filter(char::is_ascii_digit).count();
        if !(7..=20).contains(&digits) {
            return Err(ValidationError::new("phone_invalid_length"));
        }
        Ok(())
    }

    /// Validates a person's name: letters, spaces, apostrophes and hyphens.
    pub fn valid_person_name(name: &str) -> Result<(), ValidationError> {
        not_blank(name)?;
        if !name
            .chars()
            .all(|c| c.is_alphabetic() || c == ' ' || c == '\'' || c == '-')
        {
            return Err(ValidationError::new("name_invalid_characters"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Exercise {
        #[validate(range(min = 1))]
        sets: u32,
    }

    #[derive(Validate)]
    struct Plan {
        #[validate(length(min = 1))]
        title: String,
        #[validate(nested)]
        exercises: Vec<Exercise>,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_password_complexity() {
        assert!(password_complexity("Abcd1234").is_ok());
        assert!(password_complexity("short").is_err());
        assert!(password_complexity("nouppercase1").is_err());
        assert!(password_complexity("NOLOWERCASE1").is_err());
        assert!(password_complexity("NoDigitsHere").is_err());
    }

    #[test]
    fn test_valid_phone() {
        assert!(valid_phone("+1 555-123-4567").is_ok());
        assert!(valid_phone("0712345678").is_ok());
        assert!(valid_phone("12345").is_err());
        assert!(valid_phone("555-CALL-NOW").is_err());
    }

    #[test]
    fn test_valid_person_name() {
        assert!(valid_person_name("Mary-Jane").is_ok());
        assert!(valid_person_name("O'Brien").is_ok());
        assert!(valid_person_name("R2D2").is_err());
        assert!(valid_person_name(" ").is_err());
    }

    #[test]
    fn test_nested_errors_use_indexed_paths() {
        let plan = Plan {
            title: String::new(),
            exercises: vec![Exercise { sets: 3 }, Exercise { sets: 0 }],
        };
        let errors = plan.validate().unwrap_err();
        let mut fields: Vec<String> = collect_field_errors(&errors)
            .into_iter()
            .map(|e| e.field)
            .collect();
        fields.sort();
        assert_eq!(fields, vec!["exercises[1].sets".to_string(), "title".to_string()]);
    }

    #[test]
    fn test_validate_request_maps_to_validation_error() {
        let plan = Plan {
            title: String::new(),
            exercises: vec![],
        };
        let err = plan.validate_request().unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("title"));
    }
}
