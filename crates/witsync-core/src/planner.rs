//! Batch window planning.
//!
//! Splits a time range into bounded query windows so that no single query
//! asks the server for an unbounded amount of data. Day windows are keyed by
//! their local date, which keeps batch ids stable across retries.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::cursor::IndexCursor;
use crate::error::{CoreError, Result};
use crate::model::QueryWindow;
use crate::time::utc;

/// Batch id of the single window produced by [`Granularity::Whole`].
pub const WHOLE_BATCH_ID: &str = "0";

/// Smallest step between WITSML timestamps. Interior day windows end this far
/// before the next local midnight, so adjacent closed windows share no instant.
pub const TIME_RESOLUTION_MS: i64 = 1;

/// How a range is partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One window per local calendar day.
    PerCalendarDay,
    /// A single window covering the range.
    #[default]
    Whole,
}

/// Where day windows start and stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayEdges {
    /// Each window runs from local midnight to one millisecond before the
    /// next; first and last windows are clamped to the requested bounds.
    #[default]
    Contiguous,
    /// Every window spans `00:00:01.000` to `23:59:59.000` local time.
    InsetSecond,
}

/// Plans query windows over a time range.
#[derive(Debug, Clone)]
pub struct BatchWindowPlanner {
    granularity: Granularity,
    day_edges: DayEdges,
    timezone: FixedOffset,
}

impl Default for BatchWindowPlanner {
    fn default() -> Self {
        Self::new(Granularity::default(), utc())
    }
}

impl BatchWindowPlanner {
    pub fn new(granularity: Granularity, timezone: FixedOffset) -> Self {
        Self {
            granularity,
            day_edges: DayEdges::default(),
            timezone,
        }
    }

    pub fn with_day_edges(mut self, day_edges: DayEdges) -> Self {
        self.day_edges = day_edges;
        self
    }

    /// Plan windows for `[start, end]`.
    ///
    /// Both bounds must be time cursors and `start <= end`.
    pub fn plan(&self, start: &IndexCursor, end: &IndexCursor) -> Result<Vec<QueryWindow>> {
        let (Some(start_t), Some(end_t)) = (start.as_time(), end.as_time()) else {
            return Err(CoreError::InvalidRange(format!(
                "window planning needs time bounds, got {:?}..{:?}",
                start.kind(),
                end.kind()
            )));
        };
        if start.compare(end)? == Ordering::Greater {
            return Err(CoreError::InvalidRange(format!("{start} is after {end}")));
        }

        match self.granularity {
            Granularity::Whole => Ok(vec![QueryWindow {
                start: *start,
                end: *end,
                batch_id: WHOLE_BATCH_ID.to_string(),
            }]),
            Granularity::PerCalendarDay => self.plan_days(start_t, end_t),
        }
    }

    fn plan_days(
        &self,
        start: &DateTime<FixedOffset>,
        end: &DateTime<FixedOffset>,
    ) -> Result<Vec<QueryWindow>> {
        let local_start = start.with_timezone(&self.timezone);
        let local_end = end.with_timezone(&self.timezone);
        let first_day = local_start.date_naive();
        let last_day = local_end.date_naive();

        let mut windows = Vec::new();
        let mut day = first_day;
        loop {
            let next_day = day
                .succ_opt()
                .ok_or_else(|| CoreError::InvalidRange(format!("no day after {day}")))?;

            let (window_start, window_end) = match self.day_edges {
                DayEdges::Contiguous => {
                    let s = if day == first_day {
                        local_start
                    } else {
                        self.local(day, NaiveTime::MIN)?
                    };
                    let e = if day == last_day {
                        local_end
                    } else {
                        let midnight = self.local(next_day, NaiveTime::MIN)?;
                        (midnight - Duration::milliseconds(TIME_RESOLUTION_MS)).max(s)
                    };
                    (s, e)
                }
                DayEdges::InsetSecond => (
                    self.local(day, hms(0, 0, 1)?)?,
                    self.local(day, hms(23, 59, 59)?)?,
                ),
            };

            windows.push(QueryWindow {
                start: IndexCursor::Time(window_start),
                end: IndexCursor::Time(window_end),
                batch_id: day.format("%Y-%m-%d").to_string(),
            });

            if day == last_day {
                break;
            }
            day = next_day;
        }

        tracing::debug!(
            windows = windows.len(),
            first = %first_day,
            last = %last_day,
            "planned day windows"
        );
        Ok(windows)
    }

    fn local(&self, day: NaiveDate, time: NaiveTime) -> Result<DateTime<FixedOffset>> {
        self.timezone
            .from_local_datetime(&day.and_time(time))
            .single()
            .ok_or_else(|| {
                CoreError::InvalidRange(format!("unrepresentable local time {day} {time}"))
            })
    }
}

/// Convenience wrapper using contiguous day edges.
pub fn plan(
    start: &IndexCursor,
    end: &IndexCursor,
    granularity: Granularity,
    timezone: FixedOffset,
) -> Result<Vec<QueryWindow>> {
    BatchWindowPlanner::new(granularity, timezone).plan(start, end)
}

fn hms(h: u32, m: u32, s: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, s)
        .ok_or_else(|| CoreError::InvalidRange(format!("invalid time {h}:{m}:{s}")))
}
