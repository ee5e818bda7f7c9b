// Utility helpers for dates, numbers and small collection chores.
//
// Filter input arrives as free text from the menu, so the parsing helpers here
// are the single place where user-typed dates become typed values.
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use num_format::{Locale, ToFormattedString};
use std::collections::HashSet;
use std::hash::Hash;

/// Parse a `YYYY-MM-DD` date as typed into a date filter.
///
/// - Trims whitespace.
/// - Returns `None` for empty input and for anything that is not a calendar date.
pub fn parse_date_safe(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Calendar day of `ts` as seen at `offset`. Date filters, display dates and
/// daily trends all go through here so they agree on where a day starts.
pub fn local_day(ts: &DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    ts.with_timezone(&offset).date_naive()
}

/// Day-first display date at `offset`, the way the dashboard lists dates.
pub fn format_date(ts: &DateTime<Utc>, offset: FixedOffset) -> String {
    local_day(ts, offset).format("%d/%m/%Y").to_string()
}

pub fn format_int<T>(n: T, locale: &Locale) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format`, e.g. `1.040` for the Spanish locale.
    n.to_formatted_string(locale)
}

/// Share of `part` in `total` as a fraction in `0.0..=1.0`.
///
/// Returns `None` when the total is zero so callers never see a NaN.
pub fn share(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(part as f64 / total as f64)
}

/// Distinct values in first-seen order.
pub fn distinct<T, I>(values: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
