//! Error types for the wire layer.

use thiserror::Error;

/// Errors raised while building queries or reading server responses.
///
/// Response errors concern one response only; they never invalidate a cursor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    /// The 1.3.1.1 to 1.4.1.1 transform could not produce valid XML.
    #[error("schema transform failed: {0}")]
    SchemaTransform(String),

    /// The payload does not fit the internal object model.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A query document that cannot be expressed for the object type.
    #[error("unsupported query: {0}")]
    UnsupportedQuery(String),
}

impl From<quick_xml::Error> for WireError {
    fn from(err: quick_xml::Error) -> Self {
        WireError::SchemaTransform(err.to_string())
    }
}

impl From<quick_xml::DeError> for WireError {
    fn from(err: quick_xml::DeError) -> Self {
        WireError::Deserialization(err.to_string())
    }
}

impl From<witsync_core::CoreError> for WireError {
    fn from(err: witsync_core::CoreError) -> Self {
        WireError::Deserialization(err.to_string())
    }
}

/// Result type for wire operations.
pub type Result<T> = std::result::Result<T, WireError>;
