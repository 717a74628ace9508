//! WITSML fixtures and helpers.
//!
//! Sample documents in both schema versions, built so that a 1.3.1.1
//! document and its 1.4.1.1 counterpart normalize to the same model.

use witsync_core::{CurveInfo, IndexCursor, LogMetadata, ObjectRef, ObjectType};
use witsync_engine::ScriptedClient;
use witsync_wire::{SchemaVersion, NAMESPACE_V1, NAMESPACE_V2};

pub const WELL: &str = "W-100";
pub const WELLBORE: &str = "WB-1";
pub const LOG: &str = "LOG-7";
pub const TRAJECTORY: &str = "TRAJ-1";

/// The fixture log.
pub fn log_ref() -> ObjectRef {
    object(LOG, ObjectType::Log)
}

/// The fixture trajectory.
pub fn trajectory_ref() -> ObjectRef {
    object(TRAJECTORY, ObjectType::Trajectory)
}

fn object(id: &str, object_type: ObjectType) -> ObjectRef {
    match ObjectRef::new(WELL, WELLBORE, id, object_type) {
        Ok(object) => object,
        Err(e) => panic!("fixture object ref is invalid: {e}"),
    }
}

/// Parse a cursor, panicking on bad fixture input.
pub fn depth(value: f64) -> IndexCursor {
    match IndexCursor::depth(value) {
        Ok(cursor) => cursor,
        Err(e) => panic!("fixture depth is invalid: {e}"),
    }
}

/// Parse a time cursor, panicking on bad fixture input.
pub fn time(raw: &str) -> IndexCursor {
    match IndexCursor::parse_time(raw) {
        Ok(cursor) => cursor,
        Err(e) => panic!("fixture time is invalid: {e}"),
    }
}

/// Depth log metadata with `DEPT`, `GR` and `ROP` curves.
pub fn depth_metadata(start: f64, end: f64, growing: bool) -> LogMetadata {
    let curves = vec![
        CurveInfo::new("DEPT", "m"),
        CurveInfo::new("GR", "gAPI"),
        CurveInfo::new("ROP", "m/h"),
    ];
    match LogMetadata::new(log_ref(), "DEPT", depth(start), depth(end), growing, curves) {
        Ok(metadata) => metadata.with_name_well("Fixture Well"),
        Err(e) => panic!("fixture metadata is invalid: {e}"),
    }
}

/// Time log metadata with `TIME` and `ROP` curves.
pub fn time_metadata(start: &str, end: &str, growing: bool) -> LogMetadata {
    let curves = vec![CurveInfo::new("TIME", "s"), CurveInfo::new("ROP", "m/h")];
    match LogMetadata::new(log_ref(), "TIME", time(start), time(end), growing, curves) {
        Ok(metadata) => metadata.with_name_well("Fixture Well"),
        Err(e) => panic!("fixture metadata is invalid: {e}"),
    }
}

/// A scripted client serving `metadata` and then `pages` in order.
pub fn scripted(metadata: LogMetadata, pages: impl IntoIterator<Item = String>) -> ScriptedClient {
    pages
        .into_iter()
        .fold(ScriptedClient::new(metadata), |client, page| client.reply(page))
}

// ─────────────────────────────────────────────────────────────────────────
// Documents
// ─────────────────────────────────────────────────────────────────────────

/// Header-only time log document.
pub fn time_metadata_xml(version: SchemaVersion, start: &str, end: &str, growing: bool) -> String {
    let curves = match version {
        // Deliberately out of column order; columnIndex decides.
        SchemaVersion::V1 => concat!(
            r#"<logCurveInfo uid="ROP"><mnemonic>ROP</mnemonic><unit>m/h</unit><columnIndex>2</columnIndex></logCurveInfo>"#,
            r#"<logCurveInfo uid="TIME"><mnemonic>TIME</mnemonic><unit>s</unit><columnIndex>1</columnIndex></logCurveInfo>"#,
        ),
        SchemaVersion::V2 => concat!(
            r#"<logCurveInfo uid="TIME"><mnemonic>TIME</mnemonic><unit>s</unit></logCurveInfo>"#,
            r#"<logCurveInfo uid="ROP"><mnemonic>ROP</mnemonic><unit>m/h</unit></logCurveInfo>"#,
        ),
    };
    let index_curve = match version {
        SchemaVersion::V1 => r#"<indexCurve columnIndex="1">TIME</indexCurve>"#,
        SchemaVersion::V2 => "<indexCurve>TIME</indexCurve>",
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><logs xmlns="{ns}" version="{v}"><log uidWell="{WELL}" uidWellbore="{WELLBORE}" uid="{LOG}"><nameWell>Fixture Well</nameWell><objectGrowing>{growing}</objectGrowing><indexType>date time</indexType><startDateTimeIndex>{start}</startDateTimeIndex><endDateTimeIndex>{end}</endDateTimeIndex>{index_curve}{curves}</log></logs>"#,
        ns = namespace(version),
        v = version.as_str(),
    )
}

/// Header-only depth log document.
pub fn depth_metadata_xml(version: SchemaVersion, start: f64, end: f64, growing: bool) -> String {
    let curves = match version {
        SchemaVersion::V1 => concat!(
            r#"<logCurveInfo uid="GR"><mnemonic>GR</mnemonic><unit>gAPI</unit><columnIndex>2</columnIndex></logCurveInfo>"#,
            r#"<logCurveInfo uid="DEPT"><mnemonic>DEPT</mnemonic><unit>m</unit><columnIndex>1</columnIndex></logCurveInfo>"#,
        ),
        SchemaVersion::V2 => concat!(
            r#"<logCurveInfo uid="DEPT"><mnemonic>DEPT</mnemonic><unit>m</unit></logCurveInfo>"#,
            r#"<logCurveInfo uid="GR"><mnemonic>GR</mnemonic><unit>gAPI</unit></logCurveInfo>"#,
        ),
    };
    format!(
        r#"<logs xmlns="{ns}" version="{v}"><log uidWell="{WELL}" uidWellbore="{WELLBORE}" uid="{LOG}"><objectGrowing>{growing}</objectGrowing><indexType>measured depth</indexType><startIndex uom="m">{start}</startIndex><endIndex uom="m">{end}</endIndex><indexCurve>DEPT</indexCurve>{curves}</log></logs>"#,
        ns = namespace(version),
        v = version.as_str(),
    )
}

/// A data response for the fixture log.
///
/// `mnemonics` and `units` describe the columns in order, index first.
/// V1 documents carry the layout as `logCurveInfo/columnIndex`, V2 documents
/// as `mnemonicList`/`unitList`.
pub fn log_page_xml(
    version: SchemaVersion,
    growing: bool,
    mnemonics: &[&str],
    units: &[&str],
    rows: &[&str],
) -> String {
    let data: String = rows.iter().map(|r| format!("<data>{r}</data>")).collect();
    let body = match version {
        SchemaVersion::V1 => {
            let curves: String = mnemonics
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    let unit = units.get(i).copied().unwrap_or_default();
                    format!(
                        "<logCurveInfo uid=\"{m}\"><mnemonic>{m}</mnemonic><unit>{unit}</unit><columnIndex>{}</columnIndex></logCurveInfo>",
                        i + 1
                    )
                })
                .collect();
            format!("{curves}<logData>{data}</logData>")
        }
        SchemaVersion::V2 => format!(
            "<logData><mnemonicList>{}</mnemonicList><unitList>{}</unitList>{data}</logData>",
            mnemonics.join(","),
            units.join(","),
        ),
    };
    format!(
        r#"<logs xmlns="{ns}" version="{v}"><log uidWell="{WELL}" uidWellbore="{WELLBORE}" uid="{LOG}"><objectGrowing>{growing}</objectGrowing>{body}</log></logs>"#,
        ns = namespace(version),
        v = version.as_str(),
    )
}

/// A V2 depth page with `DEPT,GR` columns.
pub fn depth_page(growing: bool, rows: &[&str]) -> String {
    log_page_xml(SchemaVersion::V2, growing, &["DEPT", "GR"], &["m", "gAPI"], rows)
}

/// A V2 time page with `TIME,ROP` columns.
pub fn time_page(growing: bool, rows: &[&str]) -> String {
    log_page_xml(SchemaVersion::V2, growing, &["TIME", "ROP"], &["s", "m/h"], rows)
}

/// A 1.3.1.1 trajectory with the given station depths.
pub fn trajectory_xml(growing: bool, stations: &[f64]) -> String {
    let rendered: String = stations
        .iter()
        .enumerate()
        .map(|(i, md)| {
            format!(
                r#"<trajectoryStation uid="S{i}"><md uom="m">{md}</md><tvd uom="m">{md}</tvd><incl uom="dega">0.5</incl><azi uom="dega">12</azi></trajectoryStation>"#
            )
        })
        .collect();
    let md_min = stations.first().copied().unwrap_or_default();
    format!(
        r#"<trajectorys xmlns="{NAMESPACE_V1}" version="1.3.1.1"><trajectory uidWell="{WELL}" uidWellbore="{WELLBORE}" uid="{TRAJECTORY}"><objectGrowing>{growing}</objectGrowing><mdMn uom="m">{md_min}</mdMn>{rendered}</trajectory></trajectorys>"#
    )
}

fn namespace(version: SchemaVersion) -> &'static str {
    match version {
        SchemaVersion::V1 => NAMESPACE_V1,
        SchemaVersion::V2 => NAMESPACE_V2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use witsync_core::IndexKind;
    use witsync_wire::{RawPayload, SchemaNormalizer};

    #[test]
    fn test_metadata_documents_agree() {
        let n = SchemaNormalizer::new();
        let start = "2024-01-01T00:00:00.000Z";
        let end = "2024-01-03T00:00:00.000Z";
        let document = |v| RawPayload::new(v, time_metadata_xml(v, start, end, true));
        let v1 = n.metadata(&log_ref(), &document(SchemaVersion::V1)).unwrap();
        let v2 = n.metadata(&log_ref(), &document(SchemaVersion::V2)).unwrap();
        assert_eq!(v1.index_kind(), IndexKind::Time);
        assert_eq!(v1.curves(), v2.curves());
        assert_eq!(v1.is_growing(), v2.is_growing());
    }

    #[test]
    fn test_trajectory_document_parses() {
        let raw = RawPayload::new(SchemaVersion::V1, trajectory_xml(false, &[0.0, 150.0, 300.0]));
        let meta = SchemaNormalizer::new().metadata(&trajectory_ref(), &raw).unwrap();
        assert_eq!(*meta.end_index(), depth(300.0));
        assert!(!meta.is_growing());
    }
}
