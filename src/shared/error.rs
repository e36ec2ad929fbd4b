//! Shared Error Types
//!
//! Error types shared between the client and the backend.
//!
//! # Error Categories
//!
//! - `ValidationError` - A report draft is missing a required field
//!
//! # Usage
//!
//! ```rust
//! use fieldreport::shared::error::SharedError;
//!
//! let error = SharedError::validation("title", "Title is required");
//! ```
use thiserror::Error;

/// Shared error types that can occur in both client and backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
