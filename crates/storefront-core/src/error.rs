//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Form lifecycle and lookup failures             │
//! │  └── ValidationError  - Catalog / input validation failures            │
//! │                                                                         │
//! │  apps/storefront errors                                                │
//! │  ├── ConfigError      - Config file and environment problems           │
//! │  └── ApiError         - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Presentation           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field-level form errors are NOT Rust errors: they are plain messages held
//! in [`crate::form::FormState`] and shown inline. The variants here cover
//! operations the caller asked for that could not happen.

use thiserror::Error;

use crate::form::{FieldId, SubmissionId};
use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Core logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Field name could not be parsed, or the schema does not declare it.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A submission is already in flight for this form.
    ///
    /// ## When This Occurs
    /// ```text
    /// submit() ──► Submitting ──► submit() again
    ///                                  │
    ///                                  ▼
    ///                          AlreadySubmitting
    /// ```
    #[error("A submission is already in progress")]
    AlreadySubmitting,

    /// No field has been touched since the form was created.
    #[error("Nothing to submit: no field has been changed")]
    NothingChanged,

    /// The form has failing rules.
    #[error("Form has {} invalid field(s)", fields.len())]
    InvalidForm { fields: Vec<FieldId> },

    /// A completion arrived for a submission that is no longer pending.
    #[error("Submission {0} is not pending")]
    StaleSubmission(SubmissionId),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when externally supplied data (catalog entries, schema overrides)
/// does not meet requirements.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Duplicate value (e.g., duplicate product id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A rule references a field the schema does not declare.
    #[error("rule references undeclared field {field}")]
    UndeclaredField { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
