//! # Error Hierarchy
//!
//! Structured error types shared by every crate in the workspace, built
//! with `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Data absence and unparseable values are *not* errors in this stack:
//! they are modelled as skipped checks or as issues. The variants here are
//! reserved for broken invariants at construction time and for
//! configuration faults that must stop the process before it accepts work.

use thiserror::Error;

/// Top-level error type for the LC examination stack.
#[derive(Error, Debug)]
pub enum LcxError {
    /// Domain value failed construction-time validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded or is out of range.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// I/O error while reading configuration or fixtures.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Validation errors for model values.
///
/// Each carries the offending input so that a caller building a baseline
/// from an extraction payload can report exactly which field was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Field name is empty or whitespace.
    #[error("field name must be non-empty")]
    EmptyFieldName,

    /// Confidence is NaN or outside `[0, 1]`.
    #[error("confidence for field \"{field}\" must be within [0, 1], got {confidence}")]
    ConfidenceOutOfRange {
        /// The field whose confidence was rejected.
        field: String,
        /// The rejected value.
        confidence: f64,
    },

    /// A non-MISSING field result carries no value.
    #[error("field \"{field}\" has status {status} but no value")]
    MissingValue {
        /// The field name.
        field: String,
        /// The declared status.
        status: String,
    },

    /// The field name is not one of the named LC baseline fields.
    #[error("unknown LC baseline field \"{0}\"")]
    UnknownField(String),
}
