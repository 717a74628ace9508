//! Structural upgrade of WITSML 1.3.1.1 documents to 1.4.1.1.
//!
//! The 1.3.1.1 log schema positions curves with `logCurveInfo/columnIndex`
//! where 1.4.1.1 carries `logData/mnemonicList` and `logData/unitList`. The
//! upgrade runs in two streaming passes over the document: the first collects
//! each log's column layout, the second rewrites the event stream.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;

use crate::error::{Result, WireError};
use crate::version::{SchemaVersion, NAMESPACE_V1, NAMESPACE_V2};

/// Upgrade a 1.3.1.1 document to 1.4.1.1.
///
/// - namespace `.../131` becomes `.../1series`, `version` becomes `1.4.1.1`
/// - `logCurveInfo/columnIndex` is folded into `logData/mnemonicList` and
///   `logData/unitList`, ordered by column, then dropped (a log without
///   `logData` gets one holding only the lists)
/// - the `columnIndex` attribute of `indexCurve` is dropped
pub fn upgrade_v1(xml: &str) -> Result<String> {
    let layouts = scan_layouts(xml)?;
    rewrite(xml, &layouts)
}

#[derive(Debug, Default)]
struct CurveColumn {
    mnemonic: String,
    unit: String,
    column: Option<u32>,
}

#[derive(Debug, Default)]
struct LogLayout {
    curves: Vec<CurveColumn>,
    has_mnemonic_list: bool,
}

impl LogLayout {
    /// Comma-joined mnemonics and units in column order, if the log declares
    /// any column positions.
    fn column_lists(&self) -> Result<Option<(String, String)>> {
        if self.has_mnemonic_list || self.curves.iter().all(|c| c.column.is_none()) {
            return Ok(None);
        }

        let mut ordered: Vec<&CurveColumn> = self.curves.iter().collect();
        // Curves without a position keep document order after positioned ones.
        ordered.sort_by_key(|c| c.column.unwrap_or(u32::MAX));

        for pair in ordered.windows(2) {
            if pair[0].column.is_some() && pair[0].column == pair[1].column {
                return Err(WireError::SchemaTransform(format!(
                    "curves `{}` and `{}` share column {}",
                    pair[0].mnemonic,
                    pair[1].mnemonic,
                    pair[0].column.unwrap_or_default()
                )));
            }
        }

        let mnemonics = ordered
            .iter()
            .map(|c| c.mnemonic.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let units = ordered
            .iter()
            .map(|c| c.unit.as_str())
            .collect::<Vec<_>>()
            .join(",");
        Ok(Some((mnemonics, units)))
    }
}

fn parent_is(path: &[Vec<u8>], name: &[u8]) -> bool {
    path.last().map(|p| p.as_slice() == name).unwrap_or(false)
}

// ─────────────────────────────────────────────────────────────────────────
// Pass 1: column layouts
// ─────────────────────────────────────────────────────────────────────────

fn scan_layouts(xml: &str) -> Result<Vec<LogLayout>> {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut layouts: Vec<LogLayout> = Vec::new();
    let mut curve: Option<CurveColumn> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"log" => layouts.push(LogLayout::default()),
                    b"logCurveInfo" => curve = Some(CurveColumn::default()),
                    b"mnemonicList" if parent_is(&path, b"logData") => {
                        if let Some(layout) = layouts.last_mut() {
                            layout.has_mnemonic_list = true;
                        }
                    }
                    _ => {}
                }
                path.push(name);
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"mnemonicList" && parent_is(&path, b"logData") {
                    if let Some(layout) = layouts.last_mut() {
                        layout.has_mnemonic_list = true;
                    }
                }
            }
            Event::End(_) => {
                if let Some(name) = path.pop() {
                    if name == b"logCurveInfo" {
                        if let (Some(c), Some(layout)) = (curve.take(), layouts.last_mut()) {
                            layout.curves.push(c);
                        }
                    }
                }
            }
            Event::Text(t) => {
                let in_curve = path.len() >= 2 && path[path.len() - 2] == b"logCurveInfo";
                if let (true, Some(c)) = (in_curve, curve.as_mut()) {
                    let text = t.unescape()?;
                    let text = text.trim();
                    match path.last().map(|p| p.as_slice()) {
                        Some(b"mnemonic") => c.mnemonic = text.to_string(),
                        Some(b"unit") => c.unit = text.to_string(),
                        Some(b"columnIndex") => {
                            let column = text.parse().map_err(|_| {
                                WireError::SchemaTransform(format!("bad columnIndex `{text}`"))
                            })?;
                            c.column = Some(column);
                        }
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(layouts)
}

// ─────────────────────────────────────────────────────────────────────────
// Pass 2: rewrite
// ─────────────────────────────────────────────────────────────────────────

fn rewrite(xml: &str, layouts: &[LogLayout]) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut logs_seen = 0usize;
    let mut log_has_data = false;
    // Depth inside an element being dropped; zero when copying.
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event()?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => {
                    return Err(WireError::SchemaTransform("unexpected end of document".into()))
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"columnIndex" && parent_is(&path, b"logCurveInfo") {
                    skip_depth = 1;
                    continue;
                }
                if name == b"log" {
                    logs_seen += 1;
                    log_has_data = false;
                }

                writer.write_event(Event::Start(upgrade_element(&e)?))?;
                if name == b"logData" {
                    log_has_data = true;
                    if let Some(lists) = column_lists(layouts, logs_seen)? {
                        write_lists(&mut writer, &lists)?;
                    }
                }
                path.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"columnIndex" && parent_is(&path, b"logCurveInfo") {
                    continue;
                }

                let upgraded = upgrade_element(&e)?;
                let lists = match name.as_slice() {
                    b"logData" => column_lists(layouts, logs_seen)?,
                    _ => None,
                };
                match lists {
                    Some(lists) => {
                        log_has_data = true;
                        // Expand so the synthesized lists have a parent.
                        let end = BytesEnd::new(
                            String::from_utf8_lossy(upgraded.name().as_ref()).into_owned(),
                        );
                        writer.write_event(Event::Start(upgraded))?;
                        write_lists(&mut writer, &lists)?;
                        writer.write_event(Event::End(end))?;
                    }
                    _ => writer.write_event(Event::Empty(upgraded))?,
                }
            }
            Event::End(e) => {
                let closes_log = path.pop().map(|p| p == b"log").unwrap_or(false);
                if closes_log && !log_has_data {
                    if let Some(lists) = column_lists(layouts, logs_seen)? {
                        writer.write_event(Event::Start(BytesStart::new("logData")))?;
                        write_lists(&mut writer, &lists)?;
                        writer.write_event(Event::End(BytesEnd::new("logData")))?;
                    }
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| WireError::SchemaTransform(format!("transformed document is not UTF-8: {e}")))
}

/// Lists to synthesize for the log currently being copied.
fn column_lists(layouts: &[LogLayout], logs_seen: usize) -> Result<Option<(String, String)>> {
    match logs_seen.checked_sub(1).and_then(|i| layouts.get(i)) {
        Some(layout) => layout.column_lists(),
        None => Ok(None),
    }
}

fn write_lists(writer: &mut Writer<Vec<u8>>, (mnemonics, units): &(String, String)) -> Result<()> {
    write_simple_element(writer, "mnemonicList", mnemonics)?;
    write_simple_element(writer, "unitList", units)?;
    Ok(())
}

fn write_simple_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Copy an element, rewriting version-specific attributes.
fn upgrade_element(e: &BytesStart<'_>) -> Result<BytesStart<'static>> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| WireError::SchemaTransform(err.to_string()))?
        .to_string();
    let is_index_curve = e.local_name().as_ref() == b"indexCurve";

    let mut out = BytesStart::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| WireError::SchemaTransform(err.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| WireError::SchemaTransform(err.to_string()))?;
        let value = attr.unescape_value()?;

        let value: Cow<'_, str> = match key {
            "columnIndex" if is_index_curve => continue,
            "version" if value.starts_with("1.3.1") => Cow::Borrowed(SchemaVersion::V2.as_str()),
            k if (k == "xmlns" || k.starts_with("xmlns:")) && value == NAMESPACE_V1 => {
                Cow::Borrowed(NAMESPACE_V2)
            }
            _ => value,
        };
        out.push_attribute((key, value.as_ref()));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1_LOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<logs xmlns="http://www.witsml.org/schemas/131" version="1.3.1.1">
  <log uidWell="W1" uidWellbore="B1" uid="L1">
    <indexType>measured depth</indexType>
    <indexCurve columnIndex="1">DEPT</indexCurve>
    <logCurveInfo uid="GR">
      <mnemonic>GR</mnemonic>
      <unit>gAPI</unit>
      <columnIndex>2</columnIndex>
    </logCurveInfo>
    <logCurveInfo uid="DEPT">
      <mnemonic>DEPT</mnemonic>
      <unit>m</unit>
      <columnIndex>1</columnIndex>
    </logCurveInfo>
    <logData>
      <data>100.0,55.1</data>
    </logData>
  </log>
</logs>"#;

    #[test]
    fn test_upgrade_rewrites_namespace_and_version() {
        let out = upgrade_v1(V1_LOG).unwrap();
        assert!(out.contains(r#"xmlns="http://www.witsml.org/schemas/1series""#));
        assert!(out.contains(r#"version="1.4.1.1""#));
        assert!(!out.contains("schemas/131"));
        // The XML declaration's own version is untouched.
        assert!(out.starts_with(r#"<?xml version="1.0""#));
    }

    #[test]
    fn test_upgrade_synthesizes_lists_in_column_order() {
        let out = upgrade_v1(V1_LOG).unwrap();
        assert!(out.contains("<mnemonicList>DEPT,GR</mnemonicList>"));
        assert!(out.contains("<unitList>m,gAPI</unitList>"));
        assert!(!out.contains("columnIndex"));
        assert!(out.contains("<indexCurve>DEPT</indexCurve>"));
        assert!(out.contains("<data>100.0,55.1</data>"));
    }

    #[test]
    fn test_upgrade_adds_log_data_for_header_only_log() {
        let xml = r#"<logs version="1.3.1.1"><log uid="L1">
<logCurveInfo><mnemonic>B</mnemonic><unit>u2</unit><columnIndex>2</columnIndex></logCurveInfo>
<logCurveInfo><mnemonic>A</mnemonic><unit>u1</unit><columnIndex>1</columnIndex></logCurveInfo>
</log></logs>"#;
        let out = upgrade_v1(xml).unwrap();
        assert!(out.contains(
            "<logData><mnemonicList>A,B</mnemonicList><unitList>u1,u2</unitList></logData></log>"
        ));
    }

    #[test]
    fn test_upgrade_keeps_existing_mnemonic_list() {
        let xml = r#"<logs xmlns="http://www.witsml.org/schemas/131" version="1.3.1.1">
<log uid="L1"><logCurveInfo><mnemonic>A</mnemonic><columnIndex>1</columnIndex></logCurveInfo>
<logData><mnemonicList>A</mnemonicList><data>1</data></logData></log></logs>"#;
        let out = upgrade_v1(xml).unwrap();
        assert_eq!(out.matches("<mnemonicList>").count(), 1);
    }

    #[test]
    fn test_upgrade_rejects_duplicate_columns() {
        let xml = r#"<logs version="1.3.1.1"><log uid="L1">
<logCurveInfo><mnemonic>A</mnemonic><columnIndex>1</columnIndex></logCurveInfo>
<logCurveInfo><mnemonic>B</mnemonic><columnIndex>1</columnIndex></logCurveInfo>
<logData><data>1,2</data></logData></log></logs>"#;
        assert!(matches!(upgrade_v1(xml), Err(WireError::SchemaTransform(_))));
    }

    #[test]
    fn test_upgrade_rejects_malformed_xml() {
        let xml = r#"<logs version="1.3.1.1"><log uid="L1"></logs>"#;
        assert!(matches!(upgrade_v1(xml), Err(WireError::SchemaTransform(_))));
    }

    #[test]
    fn test_upgrade_trajectory_touches_only_header() {
        let xml = r#"<trajectorys xmlns="http://www.witsml.org/schemas/131" version="1.3.1.1"><trajectory uid="T1"><mdMn uom="m">0</mdMn></trajectory></trajectorys>"#;
        let out = upgrade_v1(xml).unwrap();
        assert!(out.contains(r#"<mdMn uom="m">0</mdMn>"#));
        assert!(out.contains("1series"));
    }
}
