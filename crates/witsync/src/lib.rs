//! # Witsync
//!
//! Incremental retrieval of growing WITSML objects (logs and trajectories).
//!
//! ## Overview
//!
//! A drilling rig keeps appending rows to its logs. Witsync asks the store
//! only for what arrived since the last delivered index, plans day windows on
//! the first run of a time log, follows the object until it stops growing or
//! a deadline passes, and hands deduplicated payloads to a sink. The caller
//! persists the returned cursor and passes it back next time.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use witsync::{Witsync, SyncConfig};
//! use witsync::core::{ObjectRef, ObjectType};
//!
//! async fn example() {
//!     // let witsync = Witsync::over_executor(executor, Arc::new(sink))
//!     //     .with_config(SyncConfig::from_json(config_json)?);
//!
//!     let object = ObjectRef::new("W-1", "WB-1", "LOG-1", ObjectType::Log).unwrap();
//!
//!     // let result = witsync.synchronize(object, last_cursor).await?;
//!     // store(result.final_cursor, result.last_payload_hash);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `witsync::core` - Cursors, metadata, planner, policies
//! - `witsync::wire` - Schema versions, normalizer, query documents
//! - `witsync::render` - Formatters and deduplication
//! - `witsync::engine` - Collaborator traits and sessions

pub mod error;
mod witsync;

pub use error::{Result, WitsyncError};
pub use witsync::Witsync;

// Re-export component crates
pub use witsync_core as core;
pub use witsync_engine as engine;
pub use witsync_render as render;
pub use witsync_wire as wire;

// Re-export commonly used types
pub use witsync_core::{
    DayEdges, Granularity, GrowingObjectPolicyKind, IndexCursor, IndexKind, ObjectRef, ObjectType,
};
pub use witsync_engine::{
    Attributes, BatchPlanning, DataClient, FailureKind, MetadataClient, QueryExecutor, Reporter,
    Sink, SyncConfig, SyncRequest, SyncResult,
};
pub use witsync_render::{ContentHash, OutputFormat, RenderedPayload};
pub use witsync_wire::SchemaVersion;
