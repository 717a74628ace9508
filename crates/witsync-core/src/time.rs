//! UTC offset helpers.
//!
//! Timezones travel as plain UTC offsets (`+HH:MM`), the form the server uses
//! in its own timestamps. Unreadable offsets never fail a session: callers use
//! [`offset_or_utc`], which logs and falls back to UTC.

use chrono::{FixedOffset, Offset, Utc};

/// The UTC offset.
pub fn utc() -> FixedOffset {
    Utc.fix()
}

/// Parse `Z`, `UTC`, `+HH`, `+HHMM` or `+HH:MM` (and the `-` forms).
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Some(utc());
    }

    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Resolve an optional timezone string, falling back to UTC with a warning.
pub fn offset_or_utc(raw: Option<&str>) -> FixedOffset {
    match raw {
        None => utc(),
        Some(tz) => parse_utc_offset(tz).unwrap_or_else(|| {
            tracing::warn!(timezone = %tz, "unreadable timezone offset, using UTC");
            utc()
        }),
    }
}

/// Render an offset as `+HH:MM`.
pub fn format_offset(offset: &FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.abs();
    format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
}

/// Build an offset from a signed minute count, as servers report it.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}
