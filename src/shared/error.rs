//! Payload errors
//!
//! Raised while checking a request body or decoding a stored row, before
//! any position is read or written. `Invalid` names the offending field so
//! the HTTP layer can echo it back.
//!
//! ```rust
//! use taskboard::shared::error::SharedError;
//!
//! let error = SharedError::validation("title", "List title is required");
//! assert_eq!(error.field(), Some("title"));
//! ```
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// A field is missing, too long or holds an unknown value
    #[error("{field}: {message}")]
    Invalid { field: String, message: String },

    /// A body or stored JSON column could not be decoded
    #[error("Malformed payload: {message}")]
    Malformed { message: String },
}

impl SharedError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Field that failed, for `Invalid`
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Invalid { field, .. } => Some(field),
            Self::Malformed { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

/// Check that a trimmed text field is within `min..=max` characters
///
/// Returns the trimmed value so callers store what they validated.
pub fn validate_length(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
    label: &str,
) -> Result<String, SharedError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min {
        return Err(SharedError::validation(field, format!("{} is required", label)));
    }
    if len > max {
        return Err(SharedError::validation(
            field,
            format!("{} cannot exceed {} characters", label, max),
        ));
    }
    Ok(trimmed.to_string())
}
