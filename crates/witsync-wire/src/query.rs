//! WITSML query document construction.
//!
//! Query documents are templates: empty elements ask the server to fill in a
//! value, populated elements constrain the selection.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use witsync_core::{IndexCursor, IndexKind, ObjectRef, ObjectType, QueryRange};

use crate::error::{Result, WireError};
use crate::version::SchemaVersion;

/// Renders metadata and data queries for one schema version.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    version: SchemaVersion,
}

type XmlWriter = Writer<Vec<u8>>;

impl QueryBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Header-only query: index range, growing flag, curve list.
    pub fn metadata_query(&self, object: &ObjectRef) -> Result<String> {
        self.document(object, |w, this| match object.object_type() {
            ObjectType::Log => {
                for name in [
                    "nameWell",
                    "objectGrowing",
                    "indexType",
                    "startIndex",
                    "endIndex",
                    "startDateTimeIndex",
                    "endDateTimeIndex",
                    "indexCurve",
                ] {
                    empty(w, name)?;
                }
                this.curve_template(w)
            }
            ObjectType::Trajectory => {
                for name in ["nameWell", "objectGrowing", "mdMn", "mdMx"] {
                    empty(w, name)?;
                }
                Ok(())
            }
        })
    }

    /// Data query for `range`.
    ///
    /// Trajectories are depth-indexed; a time range for one is rejected.
    pub fn data_query(&self, object: &ObjectRef, range: &QueryRange) -> Result<String> {
        if object.object_type() == ObjectType::Trajectory && range.kind() == IndexKind::Time {
            return Err(WireError::UnsupportedQuery(format!(
                "trajectory {object} cannot be queried by time"
            )));
        }

        self.document(object, |w, this| match object.object_type() {
            ObjectType::Log => {
                empty(w, "objectGrowing")?;
                empty(w, "indexType")?;
                this.log_range(w, range)?;
                this.curve_template(w)?;

                w.write_event(Event::Start(BytesStart::new("logData")))?;
                if this.version == SchemaVersion::V2 {
                    empty(w, "mnemonicList")?;
                    empty(w, "unitList")?;
                }
                empty(w, "data")?;
                w.write_event(Event::End(BytesEnd::new("logData")))?;
                Ok(())
            }
            ObjectType::Trajectory => {
                empty(w, "objectGrowing")?;
                text(w, "mdMn", &range.start().format())?;
                match range.end() {
                    Some(end) => text(w, "mdMx", &end.format())?,
                    None => empty(w, "mdMx")?,
                }
                w.write_event(Event::Start(BytesStart::new("trajectoryStation")))?;
                for name in ["md", "tvd", "incl", "azi", "dispNs", "dispEw", "vertSect", "dls"] {
                    empty(w, name)?;
                }
                w.write_event(Event::End(BytesEnd::new("trajectoryStation")))?;
                Ok(())
            }
        })
    }

    /// Wrap `body` in the plural container and the object element.
    fn document(
        &self,
        object: &ObjectRef,
        body: impl FnOnce(&mut XmlWriter, &Self) -> Result<()>,
    ) -> Result<String> {
        let (plural, singular) = match object.object_type() {
            ObjectType::Log => ("logs", "log"),
            ObjectType::Trajectory => ("trajectorys", "trajectory"),
        };

        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new(plural);
        root.push_attribute(("xmlns", self.version.namespace()));
        root.push_attribute(("version", self.version.as_str()));
        writer.write_event(Event::Start(root))?;

        let mut elem = BytesStart::new(singular);
        elem.push_attribute(("uidWell", object.well_id()));
        elem.push_attribute(("uidWellbore", object.wellbore_id()));
        elem.push_attribute(("uid", object.object_id()));
        writer.write_event(Event::Start(elem))?;

        body(&mut writer, self)?;

        writer.write_event(Event::End(BytesEnd::new(singular)))?;
        writer.write_event(Event::End(BytesEnd::new(plural)))?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| WireError::UnsupportedQuery(format!("query is not UTF-8: {e}")))
    }

    fn curve_template(&self, w: &mut XmlWriter) -> Result<()> {
        w.write_event(Event::Start(BytesStart::new("logCurveInfo")))?;
        empty(w, "mnemonic")?;
        empty(w, "unit")?;
        if self.version == SchemaVersion::V1 {
            empty(w, "columnIndex")?;
        }
        w.write_event(Event::End(BytesEnd::new("logCurveInfo")))?;
        Ok(())
    }

    fn log_range(&self, w: &mut XmlWriter, range: &QueryRange) -> Result<()> {
        let (start_name, end_name) = match range.kind() {
            IndexKind::Depth => ("startIndex", "endIndex"),
            IndexKind::Time => ("startDateTimeIndex", "endDateTimeIndex"),
        };
        text(w, start_name, &self.render(range.start()))?;
        if let Some(end) = range.end() {
            text(w, end_name, &self.render(end))?;
        }
        Ok(())
    }

    /// 1.3.1.1 servers reject offsets on time bounds.
    fn render(&self, cursor: &IndexCursor) -> String {
        match self.version {
            SchemaVersion::V1 => cursor.format_without_offset(),
            SchemaVersion::V2 => cursor.format(),
        }
    }
}

fn empty(w: &mut XmlWriter, name: &str) -> Result<()> {
    w.write_event(Event::Empty(BytesStart::new(name)))?;
    Ok(())
}

fn text(w: &mut XmlWriter, name: &str, value: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(value)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
