//! # Witsync Engine
//!
//! Incremental retrieval sessions for growing WITSML objects.
//!
//! A [`SyncSession`] fetches an object's metadata, optionally plans day
//! windows, and queries page by page until the configured
//! [`GrowingObjectPolicy`](witsync_core::GrowingObjectPolicy) says the object
//! is done or the deadline passes. New, non-duplicate pages go to a [`Sink`].
//!
//! ## Collaborators
//!
//! - [`MetadataClient`] / [`DataClient`] - the remote store
//! - [`QueryExecutor`] - raw transport, adapted by [`WitsmlClient`]
//! - [`Sink`] - receives rendered payloads with attributes
//! - [`Reporter`] - synchronous measurements, no-op by default
//!
//! ## Example
//!
//! ```rust,ignore
//! use witsync_engine::{SyncConfig, SyncRequest, SyncSession, TracingReporter};
//!
//! async fn example() {
//!     // let client = Arc::new(WitsmlClient::new(executor));
//!     // let config = SyncConfig::default();
//!     // let session = SyncSession::new(client.clone(), client, sink, TracingReporter, config);
//!     // let result = session.run(SyncRequest::new(object).with_cursor(cursor)).await?;
//!     // persist(result.final_cursor, result.last_payload_hash);
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod sink;

pub use client::{
    memory::{LogStore, RecordingExecutor, Reply, ScriptedClient},
    DataClient, MetadataClient, QueryExecutor, WitsmlClient,
};
pub use config::{BatchPlanning, SyncConfig};
pub use error::{FailureKind, Result, SyncError};
pub use session::{Failure, SessionPhase, SessionState, SyncRequest, SyncResult, SyncSession};
pub use sink::{
    attr,
    memory::{Emitted, Measurement, MemorySink, RecordingReporter},
    Attributes, NoopReporter, Reporter, Sink, TracingReporter,
};
