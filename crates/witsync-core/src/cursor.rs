//! Index cursors: how far synchronization of one object has progressed.
//!
//! A cursor is either a depth or a timestamp. Cursors only order against
//! cursors of the same kind; mixing kinds is a [`CoreError::KindMismatch`].
//! Timestamps order by their epoch-millisecond instant, so two cursors in
//! different offsets describing the same instant are equal.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{CoreError, Result};
use crate::time::utc;
use crate::types::IndexKind;

/// Wire format for time cursors: millisecond precision, explicit offset.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Wire format for legacy servers that reject an offset suffix.
const TIME_FORMAT_NO_OFFSET: &str = "%Y-%m-%dT%H:%M:%S%.3f";

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Last confirmed delivered position of an object (exclusive).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum IndexCursor {
    Depth(f64),
    Time(DateTime<FixedOffset>),
}

/// A typed increment for [`IndexCursor::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexStep {
    Depth(f64),
    Time(Duration),
}

impl IndexStep {
    pub fn kind(&self) -> IndexKind {
        match self {
            IndexStep::Depth(_) => IndexKind::Depth,
            IndexStep::Time(_) => IndexKind::Time,
        }
    }
}

impl IndexCursor {
    /// A depth cursor; rejects NaN and infinities.
    pub fn depth(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(CoreError::InvalidDepth(value.to_string()));
        }
        Ok(IndexCursor::Depth(value))
    }

    /// Parse a wire value of the given kind.
    pub fn parse(kind: IndexKind, raw: &str) -> Result<Self> {
        match kind {
            IndexKind::Depth => {
                let value: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| CoreError::InvalidDepth(raw.to_string()))?;
                Self::depth(value)
            }
            IndexKind::Time => Self::parse_time(raw),
        }
    }

    /// Parse an ISO-8601 timestamp.
    ///
    /// A missing or malformed UTC offset is treated as UTC and logged; only a
    /// timestamp whose date/time part is unreadable is an error.
    pub fn parse_time(raw: &str) -> Result<Self> {
        let s = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(IndexCursor::Time(dt));
        }
        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Ok(IndexCursor::Time(dt));
            }
        }

        let local = strip_offset(s);
        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(local, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(local, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .ok_or_else(|| CoreError::InvalidTimestamp(raw.to_string()))?;

        tracing::warn!(timestamp = %raw, "missing or malformed UTC offset, assuming UTC");
        Ok(IndexCursor::Time(DateTime::from_naive_utc_and_offset(
            naive,
            utc(),
        )))
    }

    pub fn kind(&self) -> IndexKind {
        match self {
            IndexCursor::Depth(_) => IndexKind::Depth,
            IndexCursor::Time(_) => IndexKind::Time,
        }
    }

    /// Order two cursors of the same kind.
    pub fn compare(&self, other: &IndexCursor) -> Result<Ordering> {
        match (self, other) {
            (IndexCursor::Depth(a), IndexCursor::Depth(b)) => Ok(a.total_cmp(b)),
            (IndexCursor::Time(a), IndexCursor::Time(b)) => {
                Ok(a.timestamp_millis().cmp(&b.timestamp_millis()))
            }
            _ => Err(CoreError::KindMismatch {
                left: self.kind(),
                right: other.kind(),
            }),
        }
    }

    /// Move the cursor forward (or backward, for negative steps).
    pub fn advance(&self, by: IndexStep) -> Result<Self> {
        match (self, by) {
            (IndexCursor::Depth(v), IndexStep::Depth(d)) => Self::depth(v + d),
            (IndexCursor::Time(t), IndexStep::Time(d)) => t
                .checked_add_signed(d)
                .map(IndexCursor::Time)
                .ok_or_else(|| CoreError::InvalidTimestamp(format!("{t} + {d}"))),
            _ => Err(CoreError::KindMismatch {
                left: self.kind(),
                right: by.kind(),
            }),
        }
    }

    /// The later of two cursors of the same kind.
    pub fn max(self, other: IndexCursor) -> Result<Self> {
        Ok(match self.compare(&other)? {
            Ordering::Less => other,
            _ => self,
        })
    }

    /// Render to the wire representation for this kind.
    pub fn format(&self) -> String {
        match self {
            IndexCursor::Depth(v) => format_depth(*v),
            IndexCursor::Time(t) => t.format(TIME_FORMAT).to_string(),
        }
    }

    /// Render without an offset suffix (time cursors are rendered in their own
    /// offset). Depth cursors render as in [`IndexCursor::format`].
    pub fn format_without_offset(&self) -> String {
        match self {
            IndexCursor::Depth(v) => format_depth(*v),
            IndexCursor::Time(t) => t.format(TIME_FORMAT_NO_OFFSET).to_string(),
        }
    }

    /// The same instant expressed in another offset. Depth cursors are unchanged.
    pub fn in_offset(&self, offset: &FixedOffset) -> Self {
        match self {
            IndexCursor::Depth(v) => IndexCursor::Depth(*v),
            IndexCursor::Time(t) => IndexCursor::Time(t.with_timezone(offset)),
        }
    }

    /// The timestamp, if this is a time cursor.
    pub fn as_time(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            IndexCursor::Time(t) => Some(t),
            IndexCursor::Depth(_) => None,
        }
    }

    /// The depth, if this is a depth cursor.
    pub fn as_depth(&self) -> Option<f64> {
        match self {
            IndexCursor::Depth(v) => Some(*v),
            IndexCursor::Time(_) => None,
        }
    }
}

impl PartialEq for IndexCursor {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Ok(Ordering::Equal))
    }
}

impl PartialOrd for IndexCursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl fmt::Display for IndexCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Integral depths keep one decimal (`1500.0`), others print as-is.
fn format_depth(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Cut a trailing `Z`/`+hh..`/`-hh..` offset after the time part.
fn strip_offset(s: &str) -> &str {
    let Some(t_pos) = s.find(['T', ' ']) else {
        return s;
    };
    match s[t_pos..].find(['Z', 'z', '+', '-']) {
        Some(rel) => &s[..t_pos + rel],
        None => s,
    }
}
