//! Error types for the expression engine

use serde::{Deserialize, Serialize};

/// Errors surfaced by registration, queuing, configuration and playback.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FaceError {
    /// Malformed expression definition (empty or unsorted keyframes, bad values)
    #[error("Invalid expression '{name}': {reason}")]
    Validation { name: String, reason: String },

    /// An expression with this name is already registered
    #[error("Expression already registered: {name}")]
    DuplicateName { name: String },

    /// No expression with this name is registered
    #[error("Expression not found: {name}")]
    NotFound { name: String },

    /// Configuration value outside its accepted range
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// `play` while another instance is active and the new one cannot interrupt
    #[error("Player busy with '{active}'")]
    PlayerBusy { active: String },

    /// An active instance produced a non-finite time or pose and was discarded
    #[error("Corrupt instance '{name}': {reason}")]
    CorruptInstance { name: String, reason: String },

    /// Definition document could not be parsed
    #[error("Parse error: {reason}")]
    Parse { reason: String },
}

impl FaceError {
    pub(crate) fn validation(name: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(name: &str) -> Self {
        Self::NotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn config(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type FaceResult<T> = Result<T, FaceError>;

/// The inbox was full; the oldest pending events were dropped to admit new ones.
///
/// Recoverable: the engine keeps running and the newest events are kept.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("Inbox over capacity ({capacity}): dropped {dropped} oldest event(s)")]
pub struct BackpressureWarning {
    pub dropped: u64,
    pub capacity: usize,
}
