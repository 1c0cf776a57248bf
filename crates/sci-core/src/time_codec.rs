//! Clock-string codec.
//!
//! Converts the `"HH:MM:SS"` strings recorded by the entry forms into minutes
//! and seconds, and renders durations back into display strings. Every
//! function here is total: malformed input degrades to zero instead of
//! failing.

/// Seconds in one day, added when an interval crosses midnight.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parse a clock string into seconds.
///
/// Fields are read left to right as hours, minutes and seconds; trailing
/// fields may be omitted and default to 0 (`"01:30"` is one hour and a half).
/// Returns `0.0` for `None`, blank input, more than three fields, or any field
/// that is not a non-negative number.
///
/// # Examples
///
/// ```
/// use sci_core::time_codec::parse_clock_to_seconds;
///
/// assert_eq!(parse_clock_to_seconds(Some("00:02:30")), 150.0);
/// assert_eq!(parse_clock_to_seconds(Some("01")), 3600.0);
/// assert_eq!(parse_clock_to_seconds(Some("x:10")), 0.0);
/// assert_eq!(parse_clock_to_seconds(None), 0.0);
/// ```
pub fn parse_clock_to_seconds(value: Option<&str>) -> f64 {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0.0;
    };

    let fields: Vec<&str> = raw.split(':').collect();
    if fields.len() > 3 {
        return 0.0;
    }

    let mut total = 0.0;
    for (field, weight) in fields.iter().zip([3600.0, 60.0, 1.0]) {
        match field.trim().parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => total += n * weight,
            _ => return 0.0,
        }
    }
    total
}

/// Parse a clock string into fractional minutes.
///
/// Same rules as [`parse_clock_to_seconds`].
///
/// # Examples
///
/// ```
/// use sci_core::time_codec::parse_clock_to_minutes;
///
/// assert_eq!(parse_clock_to_minutes(Some("01:30:00")), 90.0);
/// assert_eq!(parse_clock_to_minutes(Some("00:01:30")), 1.5);
/// assert_eq!(parse_clock_to_minutes(Some("")), 0.0);
/// assert_eq!(parse_clock_to_minutes(Some("bad")), 0.0);
/// ```
pub fn parse_clock_to_minutes(value: Option<&str>) -> f64 {
    parse_clock_to_seconds(value) / 60.0
}

/// Seconds elapsed between two clock times on a 24-hour dial.
///
/// When `end` is earlier than `start` the interval is assumed to have crossed
/// midnight. Returns `0.0` when both ends are absent or zero.
///
/// # Examples
///
/// ```
/// use sci_core::time_codec::diff_with_wraparound;
///
/// assert_eq!(diff_with_wraparound(Some("08:00:00"), Some("08:05:30")), 330.0);
/// assert_eq!(diff_with_wraparound(Some("23:50:00"), Some("00:10:00")), 1200.0);
/// assert_eq!(diff_with_wraparound(None, None), 0.0);
/// ```
pub fn diff_with_wraparound(start: Option<&str>, end: Option<&str>) -> f64 {
    let start = parse_clock_to_seconds(start);
    let end = parse_clock_to_seconds(end);

    if start == 0.0 && end == 0.0 {
        return 0.0;
    }
    if end < start {
        end + SECONDS_PER_DAY - start
    } else {
        end - start
    }
}

/// Render a duration in minutes as `"1h 05min"` / `"45 min"`.
///
/// The value is rounded to whole minutes first. Non-positive and non-finite
/// input renders as `"0 min"`.
///
/// # Examples
///
/// ```
/// use sci_core::time_codec::format_minutes_human;
///
/// assert_eq!(format_minutes_human(90.0), "1h 30min");
/// assert_eq!(format_minutes_human(125.0), "2h 05min");
/// assert_eq!(format_minutes_human(45.0), "45 min");
/// assert_eq!(format_minutes_human(0.0), "0 min");
/// ```
pub fn format_minutes_human(minutes: f64) -> String {
    if !minutes.is_finite() || minutes <= 0.0 {
        return "0 min".to_string();
    }

    let total = minutes.round() as u64;
    if total >= 60 {
        format!("{}h {:02}min", total / 60, total % 60)
    } else {
        format!("{} min", total)
    }
}

/// Render a duration in seconds as a zero-padded `HH:MM:SS` clock.
///
/// # Examples
///
/// ```
/// use sci_core::time_codec::format_seconds_clock;
///
/// assert_eq!(format_seconds_clock(3725.0), "01:02:05");
/// assert_eq!(format_seconds_clock(-5.0), "00:00:00");
/// ```
pub fn format_seconds_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00:00".to_string();
    }

    let total = seconds.round() as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
