use std::sync::OnceLock;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use regex::Regex;
use tracing::warn;

use crate::window::format_month_key;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a configured timezone name.
///
/// `"auto"` (any case) or an empty name means the system timezone. An
/// unrecognised name logs a warning and falls back to UTC.
pub fn resolve_timezone(name: &str) -> Tz {
    let trimmed = name.trim();
    let effective = if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        trimmed.to_string()
    };

    effective.parse::<Tz>().unwrap_or_else(|_| {
        warn!(
            "unrecognised timezone \"{}\", falling back to UTC",
            effective
        );
        Tz::UTC
    })
}

/// Current calendar date in `tz`; the anchor of a freshly built window.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

// ── Date-like field resolution ────────────────────────────────────────────────

fn iso_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").expect("regex is valid"))
}

fn br_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").expect("regex is valid"))
}

/// Parse the calendar date a record's date-like field was written with.
///
/// Accepts an ISO date at the start of the value (`"2024-04-02"`,
/// `"2024-04-02T23:30:00-03:00"`, `"2024-04-02 10:00"`) or a Brazilian
/// `"DD/MM/YYYY"` date. The written date is used as-is; any time or offset
/// suffix is ignored so a late-evening record never shifts into the next
/// month. Returns `None` for anything else, including impossible dates.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Some(caps) = iso_prefix().captures(value) {
        return NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
    }

    if let Some(caps) = br_date().captures(value) {
        return NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[2].parse().ok()?,
            caps[1].parse().ok()?,
        );
    }

    None
}

/// The `"YYYY-MM"` bucket key for a record's date-like field.
pub fn month_key_of(value: &str) -> Option<String> {
    parse_record_date(value).map(format_month_key)
}

/// First non-blank date among a row's own field and its fallbacks.
///
/// Blank strings count as absent so a fallback parent date still applies.
pub fn first_present<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
