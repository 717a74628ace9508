//! # Witsync Wire
//!
//! WITSML wire formats: the two supported schema versions, the structural
//! upgrade from 1.3.1.1 to 1.4.1.1, normalization into core types, and query
//! document construction.
//!
//! ## Versions
//!
//! | version | namespace | curve layout |
//! |---|---|---|
//! | 1.3.1.1 | `.../schemas/131` | `logCurveInfo/columnIndex` |
//! | 1.4.1.1 | `.../schemas/1series` | `logData/mnemonicList` |
//!
//! Everything past [`SchemaNormalizer`] sees 1.4.1.1 semantics only.

pub mod error;
pub mod normalize;
pub mod query;
mod schema;
pub mod transform;
pub mod version;

pub use error::{Result, WireError};
pub use normalize::{SchemaNormalizer, TRAJECTORY_INDEX};
pub use query::QueryBuilder;
pub use transform::upgrade_v1;
pub use version::{RawPayload, SchemaVersion, NAMESPACE_V1, NAMESPACE_V2};
