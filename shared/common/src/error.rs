use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid submission: {0}")]
    InvalidForm(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Capacity reached: {0}")]
    Capacity(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Field name -> first error message for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless the field already has an error.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// `Ok(value)` when no errors were recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::InvalidForm(errors)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error_code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
}

impl ApiError {
    pub fn new(error_code: String, message: String) -> Self {
        Self {
            error_code,
            message,
            details: None,
            timestamp: Utc::now(),
            request_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

// HTTP status code mapping
impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Authentication(_) => 401,
            AppError::Authorization(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::Validation(_) | AppError::InvalidForm(_) => 400,
            AppError::Conflict(_) | AppError::Capacity(_) => 409,
            AppError::ExternalService(_) => 502,
            _ => 500,
        }
    }

    pub fn error_code(&self) -> &str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Authentication(_) => "AUTHENTICATION_ERROR",
            AppError::Authorization(_) => "AUTHORIZATION_ERROR",
            AppError::Validation(_) | AppError::InvalidForm(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Capacity(_) => "CAPACITY_REACHED",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing body; server-side failures are not echoed back.
    pub fn to_api_error(&self) -> ApiError {
        match self {
            AppError::Database(_) | AppError::Internal(_) => ApiError::new(
                self.error_code().to_string(),
                "Internal server error".to_string(),
            ),
            AppError::InvalidForm(errors) => ApiError::new(
                self.error_code().to_string(),
                "Submitted data is invalid".to_string(),
            )
            .with_details(serde_json::to_value(errors).unwrap_or_default()),
            other => ApiError::new(other.error_code().to_string(), other.to_string()),
        }
    }

    /// Maps Postgres constraint violations onto client errors.
    pub fn from_db(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => {
                    return AppError::Conflict(format!(
                        "A record with this value already exists ({})",
                        db_err.constraint().unwrap_or("unique")
                    ))
                }
                // not_null_violation, check_violation, invalid_text_representation
                Some("23502") | Some("23514") | Some("22P02") => {
                    return AppError::Validation(db_err.message().to_string())
                }
                // foreign_key_violation
                Some("23503") => {
                    return AppError::Validation("Referenced record does not exist".to_string())
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_keep_first_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("email", "This field is required.");
        errors.add("email", "Enter a valid email address.");
        errors.add("name", "This field is required.");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("This field is required."));
        assert_eq!(
            errors.to_string(),
            "email: This field is required.; name: This field is required."
        );
    }

    #[test]
    fn invalid_form_carries_field_details() {
        let mut errors = FieldErrors::new();
        errors.add("phone", "bad");
        let err = AppError::from(errors);

        assert_eq!(err.status_code(), 400);
        let body = err.to_api_error();
        assert_eq!(body.error_code, "VALIDATION_ERROR");
        assert_eq!(body.details.unwrap()["phone"], "bad");
    }

    #[test]
    fn internal_errors_are_not_leaked() {
        let err = AppError::Internal("pool exhausted at 10.0.0.3".to_string());
        let body = err.to_api_error();
        assert_eq!(err.status_code(), 500);
        assert_eq!(body.message, "Internal server error");
    }

    #[test]
    fn capacity_maps_to_conflict_status() {
        let err = AppError::Capacity("Sorry, this event is already full.".to_string());
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "CAPACITY_REACHED");
    }
}
