//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command Function  ─────►  Result<T, ApiError>                          │
//! │                                                                         │
//! │  Unknown product?  ─── CoreError::ProductNotFound ──┐                   │
//! │  Invalid form?     ─── CoreError::InvalidForm ──────┼──► ApiError ────► │
//! │  Bad config?       ─── ConfigError::Invalid ────────┘                   │
//! │                                                                         │
//! │  Presentation receives: { "code": "VALIDATION_ERROR", "message": ... }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inline field errors never travel through here; they are part of
//! [`storefront_core::FormView`].

use std::path::PathBuf;

use serde::Serialize;
use storefront_core::CoreError;
use thiserror::Error;
use ts_rs::TS;

/// API error returned from commands.
///
/// ```json
/// { "code": "NOT_FOUND", "message": "Product not found: 9" }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Operation not allowed in the current state
    BusinessLogic,

    /// Configuration could not be loaded or is invalid
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn business(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BusinessLogic, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id.to_string()),
            CoreError::UnknownField(name) => ApiError::not_found("Field", &name),
            CoreError::InvalidForm { .. } | CoreError::Validation(_) => {
                ApiError::validation(err.to_string())
            }
            CoreError::AlreadySubmitting | CoreError::NothingChanged => {
                ApiError::business(err.to_string())
            }
            CoreError::StaleSubmission(_) => {
                tracing::error!("{}", err);
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Config Error
// =============================================================================

/// Failures while loading `storefront.toml` and environment overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CoreError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{FieldId, ProductId};

    #[test]
    fn test_core_error_codes() {
        let err: ApiError = CoreError::ProductNotFound(ProductId(9)).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: 9");

        let err: ApiError = CoreError::AlreadySubmitting.into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let err: ApiError = CoreError::InvalidForm {
            fields: vec![FieldId::Email],
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::not_found("Field", "nickname");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Field not found: nickname");
    }

    #[test]
    fn test_config_error_code() {
        let err: ApiError = ConfigError::Invalid("submit_delay_ms too large".into()).into();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }
}
