//! Error Model - One Channel For Every Failure
//!
//! Validation failures happen before any I/O; I/O failures happen inside a
//! rendition. Both travel through the same `Result`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IconError {
    /// Declaration is missing a source, has no sizes, or a size does not
    /// resolve to positive integers.
    #[error("Invalid icon: {0}")]
    Validation(String),

    /// Source could not be read, decoded, or re-encoded.
    #[error("Icon I/O failed for '{src}': {reason}")]
    Io { src: String, reason: String },
}

impl IconError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn io(src: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Io {
            src: src.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
