//! Wire schema versions and raw payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WireError;

/// Namespace of WITSML 1.3.1.1 documents.
pub const NAMESPACE_V1: &str = "http://www.witsml.org/schemas/131";

/// Namespace of WITSML 1.4.1.1 documents.
pub const NAMESPACE_V2: &str = "http://www.witsml.org/schemas/1series";

/// A WITSML data schema version spoken by a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// WITSML 1.3.1.1
    #[serde(rename = "1.3.1.1", alias = "v1")]
    V1,
    /// WITSML 1.4.1.1
    #[default]
    #[serde(rename = "1.4.1.1", alias = "v2")]
    V2,
}

impl SchemaVersion {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "1.3.1.1",
            SchemaVersion::V2 => "1.4.1.1",
        }
    }

    pub const fn namespace(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => NAMESPACE_V1,
            SchemaVersion::V2 => NAMESPACE_V2,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVersion {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.3.1.1" | "v1" | "V1" => Ok(SchemaVersion::V1),
            "1.4.1.1" | "v2" | "V2" => Ok(SchemaVersion::V2),
            other => Err(WireError::Deserialization(format!(
                "unsupported schema version `{other}`"
            ))),
        }
    }
}

/// A server response tagged with the schema version it is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub version: SchemaVersion,
    pub body: String,
}

impl RawPayload {
    pub fn new(version: SchemaVersion, body: impl Into<String>) -> Self {
        Self {
            version,
            body: body.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }
}
