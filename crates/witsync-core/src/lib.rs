//! # Witsync Core
//!
//! Pure primitives for incremental retrieval of growing WITSML objects:
//! cursors, object metadata, batch windows, and continuation policies.
//!
//! This crate contains no I/O and no async. Everything here is computation
//! over index values, which keeps the protocol rules testable in isolation.
//!
//! ## Key Types
//!
//! - [`IndexCursor`] - How far an object has been delivered (depth or time)
//! - [`LogMetadata`] - Header of a growing object, validated on construction
//! - [`BatchWindowPlanner`] - Splits a time range into bounded query windows
//! - [`GrowingObjectPolicy`] - Decides whether to query again, and from where

pub mod cursor;
pub mod error;
pub mod model;
pub mod planner;
pub mod policy;
pub mod time;
pub mod types;

pub use cursor::{IndexCursor, IndexStep};
pub use error::{CoreError, Result};
pub use model::{CurveInfo, LogDataPage, LogMetadata, QueryRange, QueryWindow, Row};
pub use planner::{
    plan, BatchWindowPlanner, DayEdges, Granularity, TIME_RESOLUTION_MS, WHOLE_BATCH_ID,
};
pub use policy::{
    Continuation, ContinuationBounds, GrowingObjectPolicy, GrowingObjectPolicyKind, PolicyInput,
};
pub use time::{format_offset, offset_from_minutes, offset_or_utc, parse_utc_offset};
pub use types::{IndexKind, ObjectRef, ObjectType};
