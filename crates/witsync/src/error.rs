//! Error types for Witsync.

use thiserror::Error;
use witsync_core::CoreError;
use witsync_engine::{FailureKind, SyncError};
use witsync_render::RenderError;
use witsync_wire::WireError;

/// Errors that can occur during Witsync operations.
#[derive(Debug, Error)]
pub enum WitsyncError {
    /// Cursor, range, or object reference error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Wire format error.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// Rendering error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Sync session error.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// A spawned session did not run to completion.
    #[error("sync task failed: {0}")]
    Task(String),
}

impl WitsyncError {
    /// The tagged failure kind, when the error maps onto one.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            WitsyncError::Sync(e) => Some(e.kind()),
            WitsyncError::Core(e) => Some(SyncError::from(e.clone()).kind()),
            WitsyncError::Wire(e) => Some(SyncError::from(e.clone()).kind()),
            WitsyncError::Render(_) => Some(FailureKind::DeserializationError),
            WitsyncError::Task(_) => None,
        }
    }
}

/// Result type for Witsync operations.
pub type Result<T> = std::result::Result<T, WitsyncError>;
