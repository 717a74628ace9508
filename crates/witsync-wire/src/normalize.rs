//! Normalization of server responses into the internal object model.
//!
//! Every payload is first brought into 1.4.1.1 form (1.3.1.1 documents go
//! through [`upgrade_v1`]) and then deserialized into the same shapes, so the
//! rest of the engine never sees a version difference.

use quick_xml::de::from_str;
use std::borrow::Cow;

use witsync_core::{
    CurveInfo, IndexCursor, IndexKind, LogDataPage, LogMetadata, ObjectRef, ObjectType,
    QueryRange, Row,
};

use crate::error::{Result, WireError};
use crate::schema::{
    parse_flag, LogXml, LogsDoc, Measure, StationXml, TrajectoryXml, TrajectorysDoc,
    STATION_COLUMNS,
};
use crate::transform::upgrade_v1;
use crate::version::{RawPayload, SchemaVersion};

/// Index mnemonic of trajectory pages.
pub const TRAJECTORY_INDEX: &str = "MD";

/// Converts raw payloads of either schema version into core types.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaNormalizer;

impl SchemaNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// The payload body in 1.4.1.1 form. Empty bodies are rejected.
    pub fn to_current<'a>(&self, raw: &'a RawPayload) -> Result<Cow<'a, str>> {
        if raw.is_blank() {
            return Err(WireError::Deserialization("empty response".into()));
        }
        match raw.version {
            SchemaVersion::V1 => Ok(Cow::Owned(upgrade_v1(&raw.body)?)),
            SchemaVersion::V2 => Ok(Cow::Borrowed(raw.body.as_str())),
        }
    }

    /// Read object metadata from a metadata query response.
    pub fn metadata(&self, object: &ObjectRef, raw: &RawPayload) -> Result<LogMetadata> {
        let xml = self.to_current(raw)?;
        match object.object_type() {
            ObjectType::Log => {
                let doc: LogsDoc = from_str(&xml)?;
                let log = select(doc.logs, |l| l.uid.as_deref(), object.object_id(), "log")?;
                log_metadata(object, log)
            }
            ObjectType::Trajectory => {
                let doc: TrajectorysDoc = from_str(&xml)?;
                let traj = select(
                    doc.trajectories,
                    |t| t.uid.as_deref(),
                    object.object_id(),
                    "trajectory",
                )?;
                trajectory_metadata(object, traj)
            }
        }
    }

    /// Read one page of rows from a data query response.
    ///
    /// The index values are parsed with the query range's kind. A page without
    /// rows reports the range's start as its end.
    pub fn page(
        &self,
        object: &ObjectRef,
        range: &QueryRange,
        raw: &RawPayload,
    ) -> Result<LogDataPage> {
        let xml = self.to_current(raw)?;
        match object.object_type() {
            ObjectType::Log => {
                let doc: LogsDoc = from_str(&xml)?;
                let log = select(doc.logs, |l| l.uid.as_deref(), object.object_id(), "log")?;
                log_page(range, log)
            }
            ObjectType::Trajectory => {
                let doc: TrajectorysDoc = from_str(&xml)?;
                let traj = select(
                    doc.trajectories,
                    |t| t.uid.as_deref(),
                    object.object_id(),
                    "trajectory",
                )?;
                trajectory_page(range, traj)
            }
        }
    }
}

/// Pick the object whose uid matches.
///
/// A response holding a single object without a uid is accepted with a
/// warning; anything else without a match is rejected.
fn select<T>(
    items: Vec<T>,
    uid: impl Fn(&T) -> Option<&str>,
    object_id: &str,
    what: &str,
) -> Result<T> {
    let pos = match items.iter().position(|t| uid(t) == Some(object_id)) {
        Some(pos) => pos,
        None if items.len() == 1 && uid(&items[0]).is_none() => {
            tracing::warn!(
                uid = object_id,
                "response {what} has no uid, assuming requested object"
            );
            0
        }
        None => {
            let found: Vec<&str> = items.iter().filter_map(|t| uid(t)).collect();
            return Err(WireError::Deserialization(format!(
                "response contains no {what} with uid {object_id} (found {found:?})"
            )));
        }
    };
    items
        .into_iter()
        .nth(pos)
        .ok_or_else(|| WireError::Deserialization(format!("response contains no {what}")))
}

fn required_index(kind: IndexKind, raw: Option<&str>, what: &str) -> Result<IndexCursor> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| WireError::Deserialization(format!("missing {what} index")))?;
    Ok(IndexCursor::parse(kind, raw)?)
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(|s| s.trim().to_string()).collect()
}

fn parse_row(line: &str, width: usize) -> Row {
    let mut values: Vec<Option<String>> = line
        .split(',')
        .map(|v| {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        })
        .collect();
    if values.len() != width {
        tracing::debug!(
            expected = width,
            got = values.len(),
            "data row width differs from mnemonic list"
        );
    }
    values.resize(width, None);
    Row::new(values)
}

/// The greatest index on the page, or the range's start when it has no rows.
fn reported_end(range: &QueryRange, rows: &[Row]) -> Result<IndexCursor> {
    let mut end: Option<IndexCursor> = None;
    for row in rows {
        let raw = row
            .index_value()
            .ok_or_else(|| WireError::Deserialization("row without index value".into()))?;
        let index = IndexCursor::parse(range.kind(), raw)?;
        end = Some(match end {
            Some(current) => current.max(index)?,
            None => index,
        });
    }
    Ok(end.unwrap_or(*range.start()))
}

// ─────────────────────────────────────────────────────────────────────────
// Logs
// ─────────────────────────────────────────────────────────────────────────

fn log_kind(log: &LogXml) -> IndexKind {
    match (&log.index_type, &log.start_date_time_index) {
        (Some(index_type), _) => IndexKind::from_index_type(index_type),
        (None, Some(_)) => IndexKind::Time,
        (None, None) => IndexKind::Depth,
    }
}

/// Declared curves, in `mnemonicList` order when the log carries one.
fn log_curves(log: &LogXml) -> Vec<CurveInfo> {
    let declared: Vec<CurveInfo> = log
        .curves
        .iter()
        .filter_map(|c| {
            let mnemonic = c.mnemonic.as_ref()?.value.trim();
            (!mnemonic.is_empty()).then(|| {
                CurveInfo::new(mnemonic, c.unit.as_deref().unwrap_or_default().trim())
            })
        })
        .collect();

    let Some(data) = log.log_data.first() else {
        return declared;
    };
    let Some(list) = data.mnemonic_list.as_deref() else {
        return declared;
    };
    let units = data.unit_list.as_deref().map(split_list).unwrap_or_default();

    let listed: Vec<String> = split_list(list);
    let mut curves: Vec<CurveInfo> = listed
        .iter()
        .enumerate()
        .map(|(i, m)| {
            declared
                .iter()
                .find(|c| c.mnemonic.eq_ignore_ascii_case(m))
                .cloned()
                .unwrap_or_else(|| {
                    CurveInfo::new(m.as_str(), units.get(i).cloned().unwrap_or_default())
                })
        })
        .collect();
    curves.extend(
        declared
            .into_iter()
            .filter(|c| !listed.iter().any(|m| m.eq_ignore_ascii_case(&c.mnemonic))),
    );
    curves
}

fn log_metadata(object: &ObjectRef, log: LogXml) -> Result<LogMetadata> {
    let kind = log_kind(&log);
    let (start, end) = match kind {
        IndexKind::Time => (
            log.start_date_time_index.as_deref(),
            log.end_date_time_index.as_deref(),
        ),
        IndexKind::Depth => (
            log.start_index.as_ref().map(|m| m.value.as_str()),
            log.end_index.as_ref().map(|m| m.value.as_str()),
        ),
    };
    let start = required_index(kind, start, "start")?;
    let end = required_index(kind, end, "end")?;

    let curves = log_curves(&log);
    let index_curve = log
        .index_curve
        .as_ref()
        .map(|t| t.value.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| curves.first().map(|c| c.mnemonic.clone()))
        .unwrap_or_default();
    let is_growing = parse_flag(log.object_growing.as_deref()).unwrap_or(false);

    let metadata = LogMetadata::new(object.clone(), index_curve, start, end, is_growing, curves)?;
    Ok(match log.name_well {
        Some(name) => metadata.with_name_well(name.trim()),
        None => metadata,
    })
}

fn log_page(range: &QueryRange, log: LogXml) -> Result<LogDataPage> {
    let object_growing = parse_flag(log.object_growing.as_deref());
    let curves = log_curves(&log);
    let index_curve = log.index_curve.as_ref().map(|t| t.value.trim().to_string());
    let data = log.log_data.into_iter().next();

    let listed = data.as_ref().and_then(|d| d.mnemonic_list.as_deref());
    let (mut mnemonics, mut units) = match listed {
        Some(list) => (
            split_list(list),
            data.as_ref()
                .and_then(|d| d.unit_list.as_deref())
                .map(split_list)
                .unwrap_or_default(),
        ),
        None => (
            curves.iter().map(|c| c.mnemonic.clone()).collect(),
            curves.iter().map(|c| c.unit.clone()).collect(),
        ),
    };
    units.resize(mnemonics.len(), String::new());

    let mut rows: Vec<Row> = data
        .as_ref()
        .map(|d| d.data.as_slice())
        .unwrap_or_default()
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_row(line, mnemonics.len()))
        .collect();
    if !rows.is_empty() && mnemonics.is_empty() {
        return Err(WireError::Deserialization("data rows without mnemonics".into()));
    }

    // Without a mnemonic list the columns follow logCurveInfo order.
    if listed.is_none() {
        let index_pos = index_curve
            .as_deref()
            .and_then(|name| mnemonics.iter().position(|m| m.eq_ignore_ascii_case(name)));
        if let Some(pos) = index_pos.filter(|&pos| pos > 0) {
            move_to_front(&mut mnemonics, pos);
            move_to_front(&mut units, pos);
            for row in &mut rows {
                move_to_front(&mut row.values, pos);
            }
        }
    }

    Ok(LogDataPage {
        reported_end: reported_end(range, &rows)?,
        mnemonics,
        units,
        rows,
        object_growing,
    })
}

fn move_to_front<T>(items: &mut [T], pos: usize) {
    if pos < items.len() {
        items[..=pos].rotate_right(1);
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Trajectories
// ─────────────────────────────────────────────────────────────────────────

fn measure_text(m: Option<&Measure>) -> Option<&str> {
    m.map(|m| m.value.trim()).filter(|v| !v.is_empty())
}

fn station_units(stations: &[StationXml], fallback_md_unit: Option<&str>) -> Vec<String> {
    let first = stations.first().map(StationXml::columns);
    STATION_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, _)| {
            first
                .as_ref()
                .and_then(|cols| cols[i])
                .and_then(|m| m.uom.clone())
                .or_else(|| (i == 0).then(|| fallback_md_unit.map(str::to_string)).flatten())
                .unwrap_or_default()
        })
        .collect()
}

fn deepest_station(stations: &[StationXml]) -> Result<Option<IndexCursor>> {
    let mut deepest: Option<IndexCursor> = None;
    for md in stations.iter().filter_map(|s| measure_text(s.md.as_ref())) {
        let md = IndexCursor::parse(IndexKind::Depth, md)?;
        deepest = Some(match deepest {
            Some(current) => current.max(md)?,
            None => md,
        });
    }
    Ok(deepest)
}

fn trajectory_metadata(object: &ObjectRef, traj: TrajectoryXml) -> Result<LogMetadata> {
    let md_unit = traj.md_min.as_ref().and_then(|m| m.uom.clone());
    let start = required_index(IndexKind::Depth, measure_text(traj.md_min.as_ref()), "start")?;

    let end = match measure_text(traj.md_max.as_ref()) {
        Some(md_max) => required_index(IndexKind::Depth, Some(md_max), "end")?,
        None => deepest_station(&traj.stations)?
            .ok_or_else(|| WireError::Deserialization("missing end index".into()))?,
    };

    let units = station_units(&traj.stations, md_unit.as_deref());
    let curves = STATION_COLUMNS
        .iter()
        .zip(units)
        .map(|(m, u)| CurveInfo::new(*m, u))
        .collect();
    let is_growing = parse_flag(traj.object_growing.as_deref()).unwrap_or(false);

    let metadata =
        LogMetadata::new(object.clone(), TRAJECTORY_INDEX, start, end, is_growing, curves)?;
    Ok(match traj.name_well {
        Some(name) => metadata.with_name_well(name.trim()),
        None => metadata,
    })
}

fn trajectory_page(range: &QueryRange, traj: TrajectoryXml) -> Result<LogDataPage> {
    let md_unit = traj.md_min.as_ref().and_then(|m| m.uom.clone());
    let units = station_units(&traj.stations, md_unit.as_deref());

    let rows: Vec<Row> = traj
        .stations
        .iter()
        .map(|s| {
            Row::new(
                s.columns()
                    .iter()
                    .map(|m| measure_text(*m).map(str::to_string))
                    .collect(),
            )
        })
        .collect();

    Ok(LogDataPage {
        reported_end: reported_end(range, &rows)?,
        mnemonics: STATION_COLUMNS.iter().map(|m| m.to_string()).collect(),
        units,
        rows,
        object_growing: parse_flag(traj.object_growing.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const V2_META: &str = r#"<logs xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1">
  <log uidWell="W1" uidWellbore="B1" uid="L1">
    <nameWell>Well 1</nameWell>
    <objectGrowing>true</objectGrowing>
    <indexType>date time</indexType>
    <startDateTimeIndex>2024-01-01T00:00:00.000-06:00</startDateTimeIndex>
    <endDateTimeIndex>2024-01-03T00:00:00.000-06:00</endDateTimeIndex>
    <indexCurve>TIME</indexCurve>
    <logCurveInfo uid="TIME"><mnemonic>TIME</mnemonic><unit>s</unit></logCurveInfo>
    <logCurveInfo uid="ROP"><mnemonic>ROP</mnemonic><unit>m/h</unit></logCurveInfo>
  </log>
</logs>"#;

    const V1_META: &str = r#"<logs xmlns="http://www.witsml.org/schemas/131" version="1.3.1.1">
  <log uidWell="W1" uidWellbore="B1" uid="L1">
    <nameWell>Well 1</nameWell>
    <objectGrowing>true</objectGrowing>
    <indexType>date time</indexType>
    <startDateTimeIndex>2024-01-01T00:00:00.000-06:00</startDateTimeIndex>
    <endDateTimeIndex>2024-01-03T00:00:00.000-06:00</endDateTimeIndex>
    <indexCurve columnIndex="1">TIME</indexCurve>
    <logCurveInfo uid="ROP"><mnemonic>ROP</mnemonic><unit>m/h</unit><columnIndex>2</columnIndex></logCurveInfo>
    <logCurveInfo uid="TIME"><mnemonic>TIME</mnemonic><unit>s</unit><columnIndex>1</columnIndex></logCurveInfo>
  </log>
</logs>"#;

    fn log_ref() -> ObjectRef {
        ObjectRef::new("W1", "B1", "L1", ObjectType::Log).unwrap()
    }

    fn depth(v: f64) -> IndexCursor {
        IndexCursor::depth(v).unwrap()
    }

    #[test]
    fn test_v2_metadata() {
        let meta = SchemaNormalizer::new()
            .metadata(&log_ref(), &RawPayload::new(SchemaVersion::V2, V2_META))
            .unwrap();
        assert_eq!(meta.index_kind(), IndexKind::Time);
        assert!(meta.is_growing());
        assert_eq!(meta.index_curve(), "TIME");
        assert_eq!(meta.name_well(), Some("Well 1"));
        assert_eq!(meta.curves().len(), 2);
        assert_eq!(meta.start_index().format(), "2024-01-01T00:00:00.000-06:00");
    }

    #[test]
    fn test_v1_metadata_matches_v2() {
        let n = SchemaNormalizer::new();
        let v1 = n.metadata(&log_ref(), &RawPayload::new(SchemaVersion::V1, V1_META)).unwrap();
        let v2 = n.metadata(&log_ref(), &RawPayload::new(SchemaVersion::V2, V2_META)).unwrap();
        assert_eq!(v1.index_kind(), v2.index_kind());
        assert_eq!(v1.is_growing(), v2.is_growing());
        assert_eq!(v1.start_index(), v2.start_index());
        assert_eq!(v1.end_index(), v2.end_index());
        assert_eq!(v1.index_curve(), v2.index_curve());
        assert_eq!(v1.curves(), v2.curves());
    }

    #[test]
    fn test_empty_body_is_deserialization_error() {
        let err = SchemaNormalizer::new()
            .metadata(&log_ref(), &RawPayload::new(SchemaVersion::V2, "  "))
            .unwrap_err();
        assert!(matches!(err, WireError::Deserialization(_)));
    }

    #[test]
    fn test_empty_object_list_is_deserialization_error() {
        let xml = r#"<logs xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1"></logs>"#;
        let err = SchemaNormalizer::new()
            .metadata(&log_ref(), &RawPayload::new(SchemaVersion::V2, xml))
            .unwrap_err();
        assert!(matches!(err, WireError::Deserialization(_)));
    }

    #[test]
    fn test_missing_index_is_deserialization_error() {
        let xml = r#"<logs version="1.4.1.1"><log uid="L1"><indexType>measured depth</indexType>
<startIndex uom="m">10</startIndex></log></logs>"#;
        let err = SchemaNormalizer::new()
            .metadata(&log_ref(), &RawPayload::new(SchemaVersion::V2, xml))
            .unwrap_err();
        assert_eq!(err, WireError::Deserialization("missing end index".into()));
    }

    #[test]
    fn test_inverted_range_is_deserialization_error() {
        let xml = r#"<logs version="1.4.1.1"><log uid="L1"><indexType>measured depth</indexType>
<startIndex uom="m">10</startIndex><endIndex uom="m">5</endIndex></log></logs>"#;
        let err = SchemaNormalizer::new()
            .metadata(&log_ref(), &RawPayload::new(SchemaVersion::V2, xml))
            .unwrap_err();
        assert!(matches!(err, WireError::Deserialization(_)));
    }

    #[test]
    fn test_v1_page_uses_column_order() {
        let xml = r#"<logs xmlns="http://www.witsml.org/schemas/131" version="1.3.1.1">
<log uid="L1"><objectGrowing>false</objectGrowing>
<logCurveInfo><mnemonic>GR</mnemonic><unit>gAPI</unit><columnIndex>2</columnIndex></logCurveInfo>
<logCurveInfo><mnemonic>DEPT</mnemonic><unit>m</unit><columnIndex>1</columnIndex></logCurveInfo>
<logData><data>100,50</data><data>101,</data></logData></log></logs>"#;
        let range = QueryRange::OpenEnded { start: depth(100.0) };
        let page = SchemaNormalizer::new()
            .page(&log_ref(), &range, &RawPayload::new(SchemaVersion::V1, xml))
            .unwrap();
        assert_eq!(page.mnemonics, ["DEPT", "GR"]);
        assert_eq!(page.units, ["m", "gAPI"]);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[1].values, [Some("101".to_string()), None]);
        assert_eq!(page.reported_end, depth(101.0));
        assert_eq!(page.object_growing, Some(false));
    }

    #[test]
    fn test_empty_page_reports_range_start() {
        let xml = r#"<logs version="1.4.1.1"><log uid="L1"><logData>
<mnemonicList>DEPT,GR</mnemonicList><unitList>m,gAPI</unitList></logData></log></logs>"#;
        let range = QueryRange::Bounded { start: depth(5.0), end: depth(10.0) };
        let page = SchemaNormalizer::new()
            .page(&log_ref(), &range, &RawPayload::new(SchemaVersion::V2, xml))
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(page.reported_end, depth(5.0));
    }

    #[test]
    fn test_trajectory_metadata_and_page() {
        let xml = r#"<trajectorys xmlns="http://www.witsml.org/schemas/131" version="1.3.1.1">
<trajectory uidWell="W1" uidWellbore="B1" uid="T1">
  <objectGrowing>true</objectGrowing>
  <mdMn uom="ft">0</mdMn><mdMx uom="ft">200</mdMx>
  <trajectoryStation uid="s1"><md uom="ft">100</md><tvd uom="ft">99.9</tvd><incl uom="dega">1.5</incl><azi uom="dega">45</azi></trajectoryStation>
  <trajectoryStation uid="s2"><md uom="ft">200</md><tvd uom="ft">199.5</tvd><incl uom="dega">2.0</incl><azi uom="dega">46</azi></trajectoryStation>
</trajectory></trajectorys>"#;
        let traj = ObjectRef::new("W1", "B1", "T1", ObjectType::Trajectory).unwrap();
        let raw = RawPayload::new(SchemaVersion::V1, xml);
        let n = SchemaNormalizer::new();

        let meta = n.metadata(&traj, &raw).unwrap();
        assert_eq!(meta.index_kind(), IndexKind::Depth);
        assert_eq!(meta.end_index(), &depth(200.0));
        assert_eq!(meta.curve("md").map(|c| c.unit.as_str()), Some("ft"));

        let page = n.page(&traj, &QueryRange::OpenEnded { start: depth(0.0) }, &raw).unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.mnemonics[0], TRAJECTORY_INDEX);
        assert_eq!(page.reported_end, depth(200.0));
        assert_eq!(page.rows[0].values[3].as_deref(), Some("45"));
        assert_eq!(page.rows[0].values[4], None);
    }

    #[test]
    fn test_unmatched_uid_is_deserialization_error() {
        let xml = V2_META.replace(r#"uid="L1""#, r#"uid="OTHER""#);
        let err = SchemaNormalizer::new()
            .metadata(&log_ref(), &RawPayload::new(SchemaVersion::V2, xml))
            .unwrap_err();
        match err {
            WireError::Deserialization(msg) => {
                assert!(msg.contains("uid L1"), "{msg}");
                assert!(msg.contains("OTHER"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_page_for_other_object_is_rejected() {
        let xml = r#"<logs version="1.4.1.1"><log uid="L2"><logData>
<mnemonicList>DEPT,GR</mnemonicList><unitList>m,gAPI</unitList><data>7,1</data></logData></log></logs>"#;
        let range = QueryRange::OpenEnded { start: depth(5.0) };
        let err = SchemaNormalizer::new()
            .page(&log_ref(), &range, &RawPayload::new(SchemaVersion::V2, xml))
            .unwrap_err();
        assert!(matches!(err, WireError::Deserialization(_)));
    }

    #[test]
    fn test_selects_matching_log_among_several() {
        let xml = r#"<logs version="1.4.1.1">
<log uid="L0"><logData><mnemonicList>DEPT,GR</mnemonicList><data>1,1</data></logData></log>
<log uid="L1"><logData><mnemonicList>DEPT,GR</mnemonicList><data>9,2</data></logData></log>
</logs>"#;
        let range = QueryRange::OpenEnded { start: depth(0.0) };
        let page = SchemaNormalizer::new()
            .page(&log_ref(), &range, &RawPayload::new(SchemaVersion::V2, xml))
            .unwrap();
        assert_eq!(page.reported_end, depth(9.0));
    }

    #[test]
    fn test_lone_log_without_uid_is_accepted() {
        let xml = r#"<logs version="1.4.1.1"><log><logData>
<mnemonicList>DEPT,GR</mnemonicList><data>7,1</data></logData></log></logs>"#;
        let range = QueryRange::OpenEnded { start: depth(5.0) };
        let page = SchemaNormalizer::new()
            .page(&log_ref(), &range, &RawPayload::new(SchemaVersion::V2, xml))
            .unwrap();
        assert_eq!(page.reported_end, depth(7.0));
    }

    #[test]
    fn test_reported_end_is_greatest_index() {
        let xml = r#"<logs version="1.4.1.1"><log uid="L1"><logData>
<mnemonicList>DEPT,GR</mnemonicList><data>12,1</data><data>15,2</data><data>13,3</data>
</logData></log></logs>"#;
        let range = QueryRange::OpenEnded { start: depth(10.0) };
        let page = SchemaNormalizer::new()
            .page(&log_ref(), &range, &RawPayload::new(SchemaVersion::V2, xml))
            .unwrap();
        assert_eq!(page.reported_end, depth(15.0));
    }

    #[test]
    fn test_index_curve_moves_first_without_mnemonic_list() {
        let xml = r#"<logs version="1.4.1.1"><log uid="L1"><indexCurve>DEPT</indexCurve>
<logCurveInfo><mnemonic>GR</mnemonic><unit>gAPI</unit></logCurveInfo>
<logCurveInfo><mnemonic>DEPT</mnemonic><unit>m</unit></logCurveInfo>
<logData><data>50,100</data><data>51,101</data></logData></log></logs>"#;
        let range = QueryRange::OpenEnded { start: depth(100.0) };
        let page = SchemaNormalizer::new()
            .page(&log_ref(), &range, &RawPayload::new(SchemaVersion::V2, xml))
            .unwrap();
        assert_eq!(page.mnemonics, ["DEPT", "GR"]);
        assert_eq!(page.units, ["m", "gAPI"]);
        assert_eq!(page.rows[0].values, [Some("100".to_string()), Some("50".to_string())]);
        assert_eq!(page.reported_end, depth(101.0));
    }

    #[test]
    fn test_trajectory_end_falls_back_to_deepest_station() {
        let xml = r#"<trajectorys version="1.4.1.1"><trajectory uid="T1"><mdMn uom="m">0</mdMn>
<trajectoryStation uid="a"><md uom="m">300</md></trajectoryStation>
<trajectoryStation uid="b"><md uom="m">150</md></trajectoryStation>
</trajectory></trajectorys>"#;
        let traj = ObjectRef::new("W1", "B1", "T1", ObjectType::Trajectory).unwrap();
        let raw = RawPayload::new(SchemaVersion::V2, xml);
        let n = SchemaNormalizer::new();

        assert_eq!(n.metadata(&traj, &raw).unwrap().end_index(), &depth(300.0));
        let page = n.page(&traj, &QueryRange::OpenEnded { start: depth(0.0) }, &raw).unwrap();
        assert_eq!(page.reported_end, depth(300.0));
    }
}
