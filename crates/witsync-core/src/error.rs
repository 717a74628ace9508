//! Error types for Witsync Core.

use thiserror::Error;

use crate::types::IndexKind;

/// Errors raised by the pure index/window/policy primitives.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Two cursors (or a cursor and a step) of different index kinds met.
    #[error("index kind mismatch: {left:?} vs {right:?}")]
    KindMismatch { left: IndexKind, right: IndexKind },

    /// A range whose bounds are inverted or of the wrong kind.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// A timestamp that could not be read even after falling back to UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A depth value that is not a finite number.
    #[error("invalid depth: {0}")]
    InvalidDepth(String),

    /// An object reference with empty or malformed parts.
    #[error("invalid object reference: {0}")]
    InvalidObjectRef(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
