//! Proptest generators for property-based testing.

use chrono::{DateTime, FixedOffset, TimeZone};
use proptest::prelude::*;

use witsync_core::{offset_from_minutes, Granularity, IndexCursor, Row};
use witsync_render::OutputFormat;

/// A finite depth in a realistic range.
pub fn depth_value() -> impl Strategy<Value = f64> {
    -100.0f64..20_000.0
}

/// A depth cursor.
pub fn depth_cursor() -> impl Strategy<Value = IndexCursor> {
    depth_value().prop_map(IndexCursor::Depth)
}

/// A whole-quarter-hour UTC offset between -12:00 and +14:00.
pub fn utc_offset() -> impl Strategy<Value = FixedOffset> {
    (-48i32..=56).prop_filter_map("offset out of range", |q| offset_from_minutes(q * 15))
}

/// An instant between 2000 and 2040, expressed in a generated offset.
pub fn timestamp() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (946_684_800_000i64..2_208_988_800_000, utc_offset()).prop_filter_map(
        "unrepresentable instant",
        |(millis, offset)| offset.timestamp_millis_opt(millis).single(),
    )
}

/// A time cursor.
pub fn time_cursor() -> impl Strategy<Value = IndexCursor> {
    timestamp().prop_map(IndexCursor::Time)
}

/// An ordered time range spanning up to `max_days` days.
pub fn time_range(max_days: i64) -> impl Strategy<Value = (IndexCursor, IndexCursor)> {
    (timestamp(), 0i64..max_days * 86_400_000).prop_map(|(start, span)| {
        let end = start + chrono::Duration::milliseconds(span);
        (IndexCursor::Time(start), IndexCursor::Time(end))
    })
}

pub fn granularity() -> impl Strategy<Value = Granularity> {
    prop_oneof![Just(Granularity::PerCalendarDay), Just(Granularity::Whole)]
}

pub fn output_format() -> impl Strategy<Value = OutputFormat> {
    prop_oneof![Just(OutputFormat::Delimited), Just(OutputFormat::Columnar)]
}

/// Rows of `width` columns with an always-present index value.
pub fn rows(width: usize, max_rows: usize) -> impl Strategy<Value = Vec<Row>> {
    let value = prop::option::weighted(0.8, "[-0-9.]{1,8}");
    let row = (
        0u32..100_000,
        prop::collection::vec(value, width.saturating_sub(1)),
    )
        .prop_map(|(index, mut values)| {
            values.insert(0, Some(index.to_string()));
            Row::new(values)
        });
    prop::collection::vec(row, 0..=max_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use witsync_core::plan;

    proptest! {
        #[test]
        fn test_day_windows_tile_range(
            (start, end) in time_range(10),
            tz in utc_offset(),
        ) {
            let windows = plan(&start, &end, Granularity::PerCalendarDay, tz)?;
            prop_assert_eq!(windows[0].start, start);
            prop_assert_eq!(windows[windows.len() - 1].end, end);
            for pair in windows.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
        }

        #[test]
        fn test_generated_rows_have_index(rows in rows(4, 20)) {
            for row in &rows {
                prop_assert_eq!(row.values.len(), 4);
                prop_assert!(row.index_value().is_some());
            }
        }
    }
}
