//! Error types for rendering.

use thiserror::Error;

/// Errors that can occur while rendering a page.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Columnar serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A row does not line up with the page's columns.
    #[error("malformed page: {0}")]
    MalformedPage(String),
}

/// Result type for rendering.
pub type Result<T> = std::result::Result<T, RenderError>;
