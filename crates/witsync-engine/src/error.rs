//! Error types for sync sessions.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use witsync_core::{CoreError, IndexCursor};
use witsync_render::RenderError;
use witsync_wire::WireError;

/// Tag of a session failure, stable across error message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MetadataUnavailable,
    QueryFailed,
    SchemaTransformError,
    DeserializationError,
    InvalidRange,
    KindMismatch,
    CursorRegression,
    InvalidConfig,
}

impl FailureKind {
    /// Programming and protocol errors. These abort the call instead of being
    /// reported inside a result.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            FailureKind::InvalidRange
                | FailureKind::KindMismatch
                | FailureKind::CursorRegression
                | FailureKind::InvalidConfig
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::MetadataUnavailable => "metadata unavailable",
            FailureKind::QueryFailed => "query failed",
            FailureKind::SchemaTransformError => "schema transform error",
            FailureKind::DeserializationError => "deserialization error",
            FailureKind::InvalidRange => "invalid range",
            FailureKind::KindMismatch => "kind mismatch",
            FailureKind::CursorRegression => "cursor regression",
            FailureKind::InvalidConfig => "invalid config",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during a sync session.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Metadata could not be obtained.
    #[error("metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// The transport failed to execute a query.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Response transform, parse, or query construction failed.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A page could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Index arithmetic or range validation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A page reported an end below the session's cursor.
    #[error("cursor regression: page reported {reported} after cursor {cursor}")]
    CursorRegression {
        cursor: IndexCursor,
        reported: IndexCursor,
    },

    /// Configuration or request validation failed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    /// The tagged failure kind.
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::MetadataUnavailable(_) => FailureKind::MetadataUnavailable,
            SyncError::QueryFailed(_) => FailureKind::QueryFailed,
            SyncError::Wire(WireError::SchemaTransform(_)) => FailureKind::SchemaTransformError,
            SyncError::Wire(WireError::Deserialization(_)) => FailureKind::DeserializationError,
            SyncError::Wire(WireError::UnsupportedQuery(_)) => FailureKind::InvalidConfig,
            SyncError::Render(_) => FailureKind::DeserializationError,
            SyncError::Core(CoreError::KindMismatch { .. }) => FailureKind::KindMismatch,
            SyncError::Core(CoreError::InvalidRange(_)) => FailureKind::InvalidRange,
            SyncError::Core(CoreError::InvalidObjectRef(_)) => FailureKind::InvalidConfig,
            SyncError::Core(CoreError::InvalidTimestamp(_) | CoreError::InvalidDepth(_)) => {
                FailureKind::DeserializationError
            }
            SyncError::CursorRegression { .. } => FailureKind::CursorRegression,
            SyncError::InvalidConfig(_) => FailureKind::InvalidConfig,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
