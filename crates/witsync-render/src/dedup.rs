//! Suppression of consecutive identical payloads.

use crate::hash::ContentHash;
use crate::payload::RenderedPayload;

/// Outcome of offering a payload to a [`Deduplicator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// New content; hand it to the sink.
    Emit,
    /// Same content as the previous emission; drop it.
    Suppressed,
}

/// Tracks the last emitted content hash of one object.
///
/// Seeded with the hash a previous invocation ended on, so suppression also
/// holds across invocations.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    last: Option<ContentHash>,
}

impl Deduplicator {
    pub fn new(last: Option<ContentHash>) -> Self {
        Self { last }
    }

    /// Record `payload` and decide whether it should be emitted.
    pub fn offer(&mut self, payload: &RenderedPayload) -> Emission {
        if self.last == Some(payload.content_hash) {
            return Emission::Suppressed;
        }
        self.last = Some(payload.content_hash);
        Emission::Emit
    }

    pub fn last_hash(&self) -> Option<ContentHash> {
        self.last
    }
}
