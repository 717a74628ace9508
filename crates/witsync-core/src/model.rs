//! The internal object model every schema version normalizes into.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::cursor::IndexCursor;
use crate::error::{CoreError, Result};
use crate::types::{IndexKind, ObjectRef};

/// One channel of a log (or one trajectory column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveInfo {
    pub mnemonic: String,
    /// Unit of measure, empty when the server reports none.
    pub unit: String,
}

impl CurveInfo {
    pub fn new(mnemonic: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            unit: unit.into(),
        }
    }
}

/// Header information for one growing object.
///
/// Built once per session from a metadata query and never mutated.
/// Construction enforces `start_index <= end_index` and matching kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMetadata {
    object: ObjectRef,
    index_kind: IndexKind,
    index_curve: String,
    start_index: IndexCursor,
    end_index: IndexCursor,
    is_growing: bool,
    curves: Vec<CurveInfo>,
    name_well: Option<String>,
    time_zone: Option<FixedOffset>,
}

impl LogMetadata {
    pub fn new(
        object: ObjectRef,
        index_curve: impl Into<String>,
        start_index: IndexCursor,
        end_index: IndexCursor,
        is_growing: bool,
        curves: Vec<CurveInfo>,
    ) -> Result<Self> {
        if start_index.compare(&end_index)? == Ordering::Greater {
            return Err(CoreError::InvalidRange(format!(
                "start index {start_index} is after end index {end_index}"
            )));
        }

        let time_zone = start_index.as_time().map(|t| *t.offset());

        Ok(Self {
            object,
            index_kind: start_index.kind(),
            index_curve: index_curve.into(),
            start_index,
            end_index,
            is_growing,
            curves,
            name_well: None,
            time_zone,
        })
    }

    pub fn with_name_well(mut self, name_well: impl Into<String>) -> Self {
        self.name_well = Some(name_well.into());
        self
    }

    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    pub fn index_kind(&self) -> IndexKind {
        self.index_kind
    }

    pub fn index_curve(&self) -> &str {
        &self.index_curve
    }

    pub fn start_index(&self) -> &IndexCursor {
        &self.start_index
    }

    pub fn end_index(&self) -> &IndexCursor {
        &self.end_index
    }

    pub fn is_growing(&self) -> bool {
        self.is_growing
    }

    pub fn curves(&self) -> &[CurveInfo] {
        &self.curves
    }

    pub fn name_well(&self) -> Option<&str> {
        self.name_well.as_deref()
    }

    /// The offset the server expressed the start time in (time-indexed only).
    pub fn time_zone(&self) -> Option<FixedOffset> {
        self.time_zone
    }

    /// Case-insensitive curve lookup.
    pub fn curve(&self, mnemonic: &str) -> Option<&CurveInfo> {
        self.curves
            .iter()
            .find(|c| c.mnemonic.eq_ignore_ascii_case(mnemonic))
    }
}

/// A planned bounded sub-range of an object's index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub start: IndexCursor,
    pub end: IndexCursor,
    /// Stable identifier: the local date for day windows, `"0"` otherwise.
    pub batch_id: String,
}

/// The index range of one data query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryRange {
    /// Both bounds given.
    Bounded {
        start: IndexCursor,
        end: IndexCursor,
    },
    /// Everything from `start` on.
    OpenEnded { start: IndexCursor },
}

impl QueryRange {
    pub fn start(&self) -> &IndexCursor {
        match self {
            QueryRange::Bounded { start, .. } | QueryRange::OpenEnded { start } => start,
        }
    }

    pub fn end(&self) -> Option<&IndexCursor> {
        match self {
            QueryRange::Bounded { end, .. } => Some(end),
            QueryRange::OpenEnded { .. } => None,
        }
    }

    pub fn kind(&self) -> IndexKind {
        self.start().kind()
    }
}

impl From<&QueryWindow> for QueryRange {
    fn from(window: &QueryWindow) -> Self {
        QueryRange::Bounded {
            start: window.start,
            end: window.end,
        }
    }
}

/// One data row. Values line up with [`LogDataPage::mnemonics`]; the index
/// value comes first. Values keep their wire text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<Option<String>>,
}

impl Row {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// The index column's value.
    pub fn index_value(&self) -> Option<&str> {
        self.values.first().and_then(|v| v.as_deref())
    }
}

/// The result of one data query.
#[derive(Debug, Clone, PartialEq)]
pub struct LogDataPage {
    /// Column order, index mnemonic first.
    pub mnemonics: Vec<String>,
    /// Units aligned with `mnemonics`.
    pub units: Vec<String>,
    pub rows: Vec<Row>,
    /// The last index the server returned, or the query's start when empty.
    pub reported_end: IndexCursor,
    /// Growing flag carried by the data response, if any.
    pub object_growing: Option<bool>,
}

impl LogDataPage {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of non-absent data values, index column excluded.
    pub fn point_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.values.iter().skip(1).filter(|v| v.is_some()).count())
            .sum()
    }

    /// Case-insensitive column lookup.
    pub fn column(&self, mnemonic: &str) -> Option<usize> {
        self.mnemonics
            .iter()
            .position(|m| m.eq_ignore_ascii_case(mnemonic))
    }

    pub fn value<'a>(&self, row: &'a Row, mnemonic: &str) -> Option<&'a str> {
        let col = self.column(mnemonic)?;
        row.values.get(col).and_then(|v| v.as_deref())
    }

    /// Drop rows whose index is at or below `cursor`, returning how many went.
    ///
    /// `reported_end` is left alone; it still describes what the server sent.
    pub fn retain_after(&mut self, cursor: &IndexCursor) -> Result<usize> {
        let before = self.rows.len();
        let mut kept = Vec::with_capacity(before);
        for row in self.rows.drain(..) {
            let raw = row.index_value().ok_or_else(|| {
                CoreError::InvalidRange("row without index value".to_string())
            })?;
            if IndexCursor::parse(cursor.kind(), raw)?.compare(cursor)? == Ordering::Greater {
                kept.push(row);
            }
        }
        self.rows = kept;
        Ok(before - self.rows.len())
    }
}
