//! Rolling month calendar.
//!
//! A [`TimeWindow`] is the ordered run of month buckets every series in a
//! snapshot is expressed in. [`MonthSeries`] is the one ordered map type all
//! reducers accumulate into, so every source formats and orders its month
//! keys identically.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::time_utils::month_key_of;

/// Smallest window a request may ask for.
pub const MIN_MONTHS: u32 = 1;

/// Largest window a request may ask for.
pub const MAX_MONTHS: u32 = 24;

/// Window length used when the request does not specify one.
pub const DEFAULT_MONTHS: u32 = 12;

/// Abbreviated pt-BR month names, January first.
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

// ── MonthBucket ───────────────────────────────────────────────────────────────

/// One calendar month of the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    /// `"YYYY-MM"`, month zero-padded.
    pub key: String,
    /// Short display label, e.g. `"jun/24"`.
    pub label: String,
    /// First day of the month.
    pub date: NaiveDate,
}

impl MonthBucket {
    fn for_month(first_day: NaiveDate) -> Self {
        let abbreviation = MONTH_ABBREVIATIONS[first_day.month0() as usize];
        Self {
            key: format_month_key(first_day),
            label: format!("{}/{:02}", abbreviation, first_day.year().rem_euclid(100)),
            date: first_day,
        }
    }
}

/// Format the `"YYYY-MM"` key of the month containing `date`.
pub fn format_month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// ── TimeWindow ────────────────────────────────────────────────────────────────

/// Ordered, immutable run of consecutive month buckets ending at an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    buckets: Vec<MonthBucket>,
}

impl TimeWindow {
    /// Buckets in chronological order.
    pub fn buckets(&self) -> &[MonthBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// First day of the earliest bucket; the lower bound of every fetch.
    pub fn start(&self) -> Option<NaiveDate> {
        self.buckets.first().map(|b| b.date)
    }

    /// Whether `key` names one of this window's buckets.
    pub fn contains(&self, key: &str) -> bool {
        self.buckets
            .binary_search_by(|b| b.key.as_str().cmp(key))
            .is_ok()
    }

    /// The trailing `months` buckets as a new window.
    ///
    /// `months` is clamped to `1..=len`.
    pub fn last_months(&self, months: usize) -> TimeWindow {
        let keep = months.clamp(1, self.buckets.len().max(1));
        let skip = self.buckets.len().saturating_sub(keep);
        TimeWindow {
            buckets: self.buckets[skip..].to_vec(),
        }
    }
}

/// Clamp a requested month count into `[MIN_MONTHS, MAX_MONTHS]`.
pub fn clamp_months(requested: i64) -> u32 {
    requested.clamp(i64::from(MIN_MONTHS), i64::from(MAX_MONTHS)) as u32
}

/// Build the window of `months` buckets whose last bucket contains `anchor`.
///
/// Each preceding bucket is one calendar month earlier. A request for zero
/// months yields a single bucket.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use sci_core::window::build_month_sequence;
///
/// let anchor = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
/// let window = build_month_sequence(3, anchor);
/// let keys: Vec<&str> = window.buckets().iter().map(|b| b.key.as_str()).collect();
/// assert_eq!(keys, vec!["2023-12", "2024-01", "2024-02"]);
/// ```
pub fn build_month_sequence(months: u32, anchor: NaiveDate) -> TimeWindow {
    let months = months.max(MIN_MONTHS);
    let first_of_anchor = anchor.with_day(1).unwrap_or(anchor);

    let buckets = (0..months)
        .rev()
        .filter_map(|back| first_of_anchor.checked_sub_months(Months::new(back)))
        .map(MonthBucket::for_month)
        .collect();

    TimeWindow { buckets }
}

// ── MonthSeries ───────────────────────────────────────────────────────────────

/// One month of a [`MonthSeries`], serialised as `{ key, label, ...value }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSlot<A> {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub value: A,
}

/// Month-keyed accumulator map pre-seeded with every bucket of a window.
///
/// Keys outside the window are never created, which keeps every series in a
/// snapshot on the same calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSeries<A> {
    slots: BTreeMap<String, MonthSlot<A>>,
}

impl<A: Default> MonthSeries<A> {
    /// Seed one default accumulator per bucket of `window`.
    pub fn new(window: &TimeWindow) -> Self {
        let slots = window
            .buckets()
            .iter()
            .map(|b| {
                (
                    b.key.clone(),
                    MonthSlot {
                        key: b.key.clone(),
                        label: b.label.clone(),
                        value: A::default(),
                    },
                )
            })
            .collect();
        Self { slots }
    }
}

impl<A> MonthSeries<A> {
    /// Accumulator for `key`, or `None` when the key is outside the window.
    pub fn bucket_mut(&mut self, key: &str) -> Option<&mut A> {
        self.slots.get_mut(key).map(|slot| &mut slot.value)
    }

    /// Accumulator for the month a date-like value falls in.
    ///
    /// `None` when the value does not resolve to a date or the month is
    /// outside the window.
    pub fn bucket_for(&mut self, date: Option<&str>) -> Option<&mut A> {
        let key = month_key_of(date?)?;
        self.bucket_mut(&key)
    }

    pub fn get(&self, key: &str) -> Option<&A> {
        self.slots.get(key).map(|slot| &slot.value)
    }

    /// Slots in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &MonthSlot<A>> {
        self.slots.values()
    }

    /// Accumulators in chronological order.
    pub fn values(&self) -> impl Iterator<Item = &A> {
        self.slots.values().map(|slot| &slot.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Convert every accumulator, keeping keys and labels.
    pub fn map<B>(self, mut f: impl FnMut(A) -> B) -> MonthSeries<B> {
        let slots = self
            .slots
            .into_iter()
            .map(|(key, slot)| {
                (
                    key,
                    MonthSlot {
                        key: slot.key,
                        label: slot.label,
                        value: f(slot.value),
                    },
                )
            })
            .collect();
        MonthSeries { slots }
    }
}

impl<A: Serialize> Serialize for MonthSeries<A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.slots.len()))?;
        for slot in self.slots.values() {
            seq.serialize_element(slot)?;
        }
        seq.end()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
