//! Rendered payloads handed to sinks.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;

/// Output encoding of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Header line plus one comma-separated line per row.
    #[default]
    Delimited,
    /// JSON array with one record per channel.
    Columnar,
}

impl OutputFormat {
    pub const fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Delimited => "text/csv",
            OutputFormat::Columnar => "application/json",
        }
    }
}

/// One page rendered for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPayload {
    pub body: Bytes,
    pub format: OutputFormat,
    pub content_hash: ContentHash,
    /// Data rows in the page.
    pub row_count: usize,
    /// Non-absent data values, index column excluded.
    pub point_count: usize,
}

impl RenderedPayload {
    pub fn new(body: Bytes, format: OutputFormat, row_count: usize, point_count: usize) -> Self {
        let content_hash = ContentHash::of(&body);
        Self {
            body,
            format,
            content_hash,
            row_count,
            point_count,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// The body as text; both formats are UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}
