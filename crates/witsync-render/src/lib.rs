//! # Witsync Render
//!
//! Turns normalized pages into the bytes handed to a sink.
//!
//! ## Formats
//!
//! - [`OutputFormat::Delimited`] - header of mnemonics, one comma-joined line per row
//! - [`OutputFormat::Columnar`] - JSON array, one record per channel
//!
//! ## Deduplication
//!
//! Every payload carries a [`ContentHash`] of its body. A [`Deduplicator`]
//! drops a payload whose hash equals the previous emission's for the same
//! object; suppression is a normal outcome, never an error.

pub mod dedup;
pub mod error;
pub mod format;
pub mod hash;
pub mod payload;

pub use dedup::{Deduplicator, Emission};
pub use error::{RenderError, Result};
pub use format::{ChannelRecord, DataPoint, RowFormatter};
pub use hash::ContentHash;
pub use payload::{OutputFormat, RenderedPayload};
