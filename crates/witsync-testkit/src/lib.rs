//! # Witsync Testkit
//!
//! Testing utilities for Witsync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: sample WITSML documents in both schema versions, object
//!   references, metadata, and scripted clients
//! - **Generators**: Proptest strategies for cursors, ranges, and rows
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use witsync_testkit::generators::time_range;
//!
//! proptest! {
//!     #[test]
//!     fn windows_cover_range((start, end) in time_range(30)) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Fixtures
//!
//! ```rust
//! use witsync_testkit::fixtures::{depth_metadata, depth_page, scripted};
//!
//! let client = scripted(
//!     depth_metadata(1000.0, 1500.0, true),
//!     [depth_page(false, &["1001.0,12.5"])],
//! );
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{depth, log_ref, scripted, time, trajectory_ref};
