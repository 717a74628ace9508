//! Page rendering.

use bytes::Bytes;
use serde::Serialize;

use witsync_core::{LogDataPage, ObjectRef};

use crate::error::{RenderError, Result};
use crate::payload::{OutputFormat, RenderedPayload};

/// Renders pages in a fixed output format.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowFormatter {
    format: OutputFormat,
    include_units_row: bool,
}

/// One channel of a columnar payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRecord<'a> {
    pub mnemonic: &'a str,
    pub unit: &'a str,
    pub uri: String,
    pub data_points: Vec<DataPoint<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint<'a> {
    pub index: &'a str,
    pub value: &'a str,
}

impl RowFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            include_units_row: false,
        }
    }

    /// Emit a units line after the header (delimited only).
    pub fn with_units_row(mut self, include: bool) -> Self {
        self.include_units_row = include;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render a page for `object`.
    pub fn render(&self, object: &ObjectRef, page: &LogDataPage) -> Result<RenderedPayload> {
        let width = page.mnemonics.len();
        if let Some(pos) = page.rows.iter().position(|r| r.values.len() != width) {
            return Err(RenderError::MalformedPage(format!(
                "row {pos} has {} values for {width} columns",
                page.rows[pos].values.len()
            )));
        }

        let body = match self.format {
            OutputFormat::Delimited => self.delimited(page),
            OutputFormat::Columnar => columnar(object, page)?,
        };
        Ok(RenderedPayload::new(
            Bytes::from(body),
            self.format,
            page.rows.len(),
            page.point_count(),
        ))
    }

    fn delimited(&self, page: &LogDataPage) -> Vec<u8> {
        let mut out = String::new();
        push_line(&mut out, page.mnemonics.iter().map(String::as_str));
        if self.include_units_row {
            push_line(&mut out, page.units.iter().map(String::as_str));
        }
        for row in &page.rows {
            push_line(&mut out, row.values.iter().map(|v| v.as_deref().unwrap_or("")));
        }
        out.into_bytes()
    }
}

fn columnar(object: &ObjectRef, page: &LogDataPage) -> Result<Vec<u8>> {
    let records: Vec<ChannelRecord<'_>> = page
        .mnemonics
        .iter()
        .enumerate()
        .skip(1)
        .map(|(col, mnemonic)| ChannelRecord {
            mnemonic,
            unit: page.units.get(col).map(String::as_str).unwrap_or(""),
            uri: format!("{}/{}", object.object_id(), mnemonic),
            data_points: page
                .rows
                .iter()
                .filter_map(|row| {
                    Some(DataPoint {
                        index: row.index_value()?,
                        value: row.values.get(col)?.as_deref()?,
                    })
                })
                .collect(),
        })
        .collect();
    Ok(serde_json::to_vec(&records)?)
}

fn push_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push('\n');
}

/// Quote fields containing a delimiter, quote or line break.
fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
