//! Strong type definitions for remote object addressing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// The kind of growing object being synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// A well log (depth- or time-indexed curves).
    Log,
    /// A trajectory (survey stations indexed by measured depth).
    Trajectory,
}

impl ObjectType {
    /// The WITSML element name for this object type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Log => "log",
            ObjectType::Trajectory => "trajectory",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(ObjectType::Log),
            "trajectory" => Ok(ObjectType::Trajectory),
            other => Err(CoreError::InvalidObjectRef(format!(
                "unsupported object type `{other}`"
            ))),
        }
    }
}

/// How an object's index column is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Floating-point depth (measured depth, vertical depth, ...).
    Depth,
    /// Timestamp with UTC offset.
    Time,
}

impl IndexKind {
    /// Classify a WITSML `indexType` value.
    ///
    /// Anything mentioning "time" (`date time`, `elapsed time`) is time-indexed;
    /// everything else is depth.
    pub fn from_index_type(index_type: &str) -> Self {
        if index_type.to_ascii_lowercase().contains("time") {
            IndexKind::Time
        } else {
            IndexKind::Depth
        }
    }

    /// Label used in emission attributes (`object.type`).
    pub const fn label(&self) -> &'static str {
        match self {
            IndexKind::Depth => "depth",
            IndexKind::Time => "date time",
        }
    }
}

/// Identifies one remote object: well, wellbore, object uid and type.
///
/// Identifiers are sanitized on construction: whitespace and `;` are stripped,
/// and each part must be non-empty afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    well_id: String,
    wellbore_id: String,
    object_id: String,
    object_type: ObjectType,
}

impl ObjectRef {
    /// Create a sanitized object reference.
    pub fn new(
        well_id: &str,
        wellbore_id: &str,
        object_id: &str,
        object_type: ObjectType,
    ) -> Result<Self> {
        Ok(Self {
            well_id: sanitize_id("well", well_id)?,
            wellbore_id: sanitize_id("wellbore", wellbore_id)?,
            object_id: sanitize_id(object_type.as_str(), object_id)?,
            object_type,
        })
    }

    /// Parse `/well(W)/wellbore(B)/<type>(O)`.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let nodes: Vec<&str> = uri.split('/').filter(|n| !n.is_empty()).collect();
        if nodes.len() != 3 {
            return Err(CoreError::InvalidObjectRef(format!(
                "expected /well(..)/wellbore(..)/<type>(..), got `{uri}`"
            )));
        }

        let (well_name, well_id) = parse_node(nodes[0])?;
        let (wellbore_name, wellbore_id) = parse_node(nodes[1])?;
        let (type_name, object_id) = parse_node(nodes[2])?;

        if !well_name.eq_ignore_ascii_case("well")
            || !wellbore_name.eq_ignore_ascii_case("wellbore")
        {
            return Err(CoreError::InvalidObjectRef(format!(
                "unexpected node names in `{uri}`"
            )));
        }

        Self::new(well_id, wellbore_id, object_id, type_name.parse()?)
    }

    /// Render as `/well(W)/wellbore(B)/<type>(O)`.
    pub fn uri(&self) -> String {
        format!(
            "/well({})/wellbore({})/{}({})",
            self.well_id, self.wellbore_id, self.object_type, self.object_id
        )
    }

    pub fn well_id(&self) -> &str {
        &self.well_id
    }

    pub fn wellbore_id(&self) -> &str {
        &self.wellbore_id
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

fn sanitize_id(part: &str, raw: &str) -> Result<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ';')
        .collect();
    if cleaned.is_empty() {
        return Err(CoreError::InvalidObjectRef(format!("empty {part} id")));
    }
    Ok(cleaned)
}

/// Split `name(id)` into its two halves.
fn parse_node(node: &str) -> Result<(&str, &str)> {
    let open = node
        .find('(')
        .ok_or_else(|| CoreError::InvalidObjectRef(format!("missing `(` in `{node}`")))?;
    let rest = &node[open + 1..];
    let id = rest
        .strip_suffix(')')
        .ok_or_else(|| CoreError::InvalidObjectRef(format!("missing `)` in `{node}`")))?;
    Ok((&node[..open], id))
}
