//! Weave error types

use thiserror::Error;

/// Errors raised by Weave controllers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeaveError {
    /// A preference value outside the allowed set for its key
    #[error("Invalid value {value:?} for preference {key}")]
    InvalidValue { key: String, value: String },

    /// An inbound host message that could not be decoded
    #[error("Malformed host message: {0}")]
    MalformedMessage(String),

    /// An operation referenced a control that is not registered
    #[error("No such control: {0}")]
    MissingTarget(String),

    /// The durable storage backend rejected a write
    #[error("Storage write failed: {0}")]
    Storage(String),
}

impl WeaveError {
    /// Build an [`WeaveError::InvalidValue`] from borrowed parts
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build a [`WeaveError::MissingTarget`]
    pub fn missing_target(id: impl Into<String>) -> Self {
        Self::MissingTarget(id.into())
    }
}

/// Result type for Weave operations
pub type Result<T> = std::result::Result<T, WeaveError>;
