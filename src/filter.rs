//! Record filters for the three report views.
//!
//! Every criterion is optional. An empty criterion places no constraint on its
//! field, so a default filter matches every record. Text typed by the user goes
//! through [`Criteria::set`], which rejects malformed input instead of storing
//! it; a rejected value leaves the previous constraint in force.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

use crate::error::FilterError;
use crate::types::{Direction, Movement, Outbreak, OutbreakStatus, Severity, Vaccination};
use crate::util::parse_date_safe;

/// A set of per-field constraints over records of type `R`.
pub trait Criteria<R> {
    /// Field names accepted by [`Criteria::set`].
    const FIELDS: &'static [&'static str];

    fn matches(&self, record: &R) -> bool;

    /// Sets one field from user text. An empty value clears the field.
    fn set(&mut self, field: &str, value: &str) -> Result<(), FilterError>;

    /// Drops every constraint. Configuration such as the day-boundary offset survives.
    fn reset(&mut self);

    fn is_unconstrained(&self) -> bool;
}

/// Keeps the records matching `criteria`, in their original order.
pub fn apply<'a, R, C>(records: &'a [R], criteria: &C) -> Vec<&'a R>
where
    C: Criteria<R>,
{
    records.iter().filter(|r| criteria.matches(r)).collect()
}

/// Inclusive calendar-day range.
///
/// The start bound is midnight of the start day and the end bound is 23:59:59
/// of the end day, both in `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    offset: FixedOffset,
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl DateRange {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            start: None,
            end: None,
            offset,
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn set_start(&mut self, field: &str, raw: &str) -> Result<(), FilterError> {
        self.start = parse_bound(field, raw)?;
        Ok(())
    }

    pub fn set_end(&mut self, field: &str, raw: &str) -> Result<(), FilterError> {
        self.end = parse_bound(field, raw)?;
        Ok(())
    }

    pub fn start_bound(&self) -> Option<NaiveDateTime> {
        self.start.and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn end_bound(&self) -> Option<NaiveDateTime> {
        self.end.and_then(|d| d.and_hms_opt(23, 59, 59))
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        let local = ts.with_timezone(&self.offset).naive_local();
        if let Some(start) = self.start_bound() {
            if local < start {
                return false;
            }
        }
        if let Some(end) = self.end_bound() {
            if local > end {
                return false;
            }
        }
        true
    }
}

fn parse_bound(field: &str, raw: &str) -> Result<Option<NaiveDate>, FilterError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match parse_date_safe(raw) {
        Some(d) => Ok(Some(d)),
        None => {
            log::warn!("Rejected date filter {field}={raw:?}");
            Err(FilterError::InvalidDate {
                field: field.to_string(),
                value: raw.to_string(),
            })
        }
    }
}

fn text_value(raw: &str) -> Option<String> {
    let v = raw.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

fn eq_or_any(filter: &Option<String>, actual: &str) -> bool {
    filter.as_deref().map_or(true, |want| want == actual)
}

fn parse_enum<T>(
    field: &str,
    raw: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, FilterError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse(raw).map(Some).ok_or_else(|| invalid(field, raw))
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, FilterError> {
    match raw.trim().to_lowercase().as_str() {
        "" | "false" | "0" | "no" | "n" => Ok(false),
        "true" | "1" | "si" | "sí" | "s" | "yes" | "y" => Ok(true),
        _ => Err(invalid(field, raw)),
    }
}

fn invalid(field: &str, raw: &str) -> FilterError {
    log::warn!("Rejected filter value {field}={raw:?}");
    FilterError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
    }
}

fn unknown(field: &str) -> FilterError {
    log::warn!("Unknown filter field {field:?}");
    FilterError::UnknownField(field.to_string())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementFilter {
    pub direction: Option<Direction>,
    pub country: Option<String>,
    pub dates: DateRange,
    /// Only flagged movements when set.
    pub has_alert: bool,
}

impl MovementFilter {
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            dates: DateRange::new(offset),
            ..Self::default()
        }
    }
}

impl Criteria<Movement> for MovementFilter {
    const FIELDS: &'static [&'static str] =
        &["type", "country", "dateStart", "dateEnd", "hasAlert"];

    fn matches(&self, m: &Movement) -> bool {
        if self.direction.is_some_and(|d| d != m.direction) {
            return false;
        }
        if !eq_or_any(&self.country, &m.country) {
            return false;
        }
        if !self.dates.contains(&m.date_of_movement) {
            return false;
        }
        !self.has_alert || m.has_alert
    }

    fn set(&mut self, field: &str, value: &str) -> Result<(), FilterError> {
        match field {
            "type" => self.direction = parse_enum(field, value, Direction::parse)?,
            "country" => self.country = text_value(value),
            "dateStart" => self.dates.set_start(field, value)?,
            "dateEnd" => self.dates.set_end(field, value)?,
            "hasAlert" => self.has_alert = parse_flag(field, value)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::with_offset(self.dates.offset());
    }

    fn is_unconstrained(&self) -> bool {
        self.direction.is_none()
            && self.country.is_none()
            && self.dates.is_open()
            && !self.has_alert
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutbreakFilter {
    pub disease: Option<String>,
    pub status: Option<OutbreakStatus>,
    pub region: Option<String>,
    pub severity: Option<Severity>,
}

impl Criteria<Outbreak> for OutbreakFilter {
    const FIELDS: &'static [&'static str] = &["disease", "status", "region", "severity"];

    fn matches(&self, o: &Outbreak) -> bool {
        eq_or_any(&self.disease, &o.disease_type)
            && self.status.map_or(true, |s| s == o.status)
            && eq_or_any(&self.region, &o.region)
            && self.severity.map_or(true, |s| s == o.severity)
    }

    fn set(&mut self, field: &str, value: &str) -> Result<(), FilterError> {
        match field {
            "disease" => self.disease = text_value(value),
            "status" => self.status = parse_enum(field, value, OutbreakStatus::parse)?,
            "region" => self.region = text_value(value),
            "severity" => self.severity = parse_enum(field, value, Severity::parse)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VaccinationFilter {
    pub region: Option<String>,
    pub campaign: Option<String>,
    /// Vaccinator id, not name.
    pub vaccinator: Option<String>,
    pub dates: DateRange,
}

impl VaccinationFilter {
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            dates: DateRange::new(offset),
            ..Self::default()
        }
    }
}

impl Criteria<Vaccination> for VaccinationFilter {
    const FIELDS: &'static [&'static str] =
        &["region", "campaign", "vaccinator", "dateStart", "dateEnd"];

    fn matches(&self, v: &Vaccination) -> bool {
        eq_or_any(&self.region, &v.region)
            && eq_or_any(&self.campaign, &v.campaign)
            && eq_or_any(&self.vaccinator, &v.vaccinator_id)
            && self.dates.contains(&v.date_created)
    }

    fn set(&mut self, field: &str, value: &str) -> Result<(), FilterError> {
        match field {
            "region" => self.region = text_value(value),
            "campaign" => self.campaign = text_value(value),
            "vaccinator" => self.vaccinator = text_value(value),
            "dateStart" => self.dates.set_start(field, value)?,
            "dateEnd" => self.dates.set_end(field, value)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::with_offset(self.dates.offset());
    }

    fn is_unconstrained(&self) -> bool {
        self.region.is_none()
            && self.campaign.is_none()
            && self.vaccinator.is_none()
            && self.dates.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let mut range = DateRange::default();
        range.set_start("dateStart", "2025-04-15").unwrap();
        range.set_end("dateEnd", "2025-04-18").unwrap();

        assert!(range.contains(&ts(2025, 4, 15, 0, 0, 0)));
        assert!(range.contains(&ts(2025, 4, 18, 23, 59, 59)));
        assert!(!range.contains(&ts(2025, 4, 14, 23, 59, 59)));
        assert!(!range.contains(&ts(2025, 4, 19, 0, 0, 0)));
    }

    #[test]
    fn date_range_uses_configured_offset() {
        let bogota = FixedOffset::west_opt(5 * 3600).unwrap();
        let mut range = DateRange::new(bogota);
        range.set_end("dateEnd", "2025-04-14").unwrap();
        // 2025-04-15T00:00Z is still the 14th in UTC-5.
        assert!(range.contains(&ts(2025, 4, 15, 0, 0, 0)));
        assert!(!range.contains(&ts(2025, 4, 15, 5, 0, 0)));
    }

    #[test]
    fn malformed_date_is_rejected_and_keeps_previous_bound() {
        let mut f = MovementFilter::default();
        f.set("dateStart", "2025-04-20").unwrap();
        let err = f.set("dateStart", "20/04/2025").unwrap_err();
        assert!(matches!(err, FilterError::InvalidDate { .. }));
        assert_eq!(f.dates.start(), NaiveDate::from_ymd_opt(2025, 4, 20));
    }

    #[test]
    fn empty_value_clears_field() {
        let mut f = MovementFilter::default();
        f.set("country", "Brasil").unwrap();
        f.set("country", "  ").unwrap();
        assert!(f.is_unconstrained());
    }

    #[test]
    fn unknown_field_and_bad_enum_are_errors() {
        let mut f = OutbreakFilter::default();
        assert_eq!(
            f.set("colour", "red"),
            Err(FilterError::UnknownField("colour".into()))
        );
        assert!(matches!(
            f.set("severity", "extreme"),
            Err(FilterError::InvalidValue { .. })
        ));
        assert!(f.is_unconstrained());
    }

    #[test]
    fn date_filters_bound_every_match() {
        let data = fixtures::embedded().unwrap();
        let mut f = MovementFilter::default();
        f.set("dateStart", "2025-04-18").unwrap();
        f.set("dateEnd", "2025-04-28").unwrap();
        let hits = apply(&data.movements, &f);
        let ids: Vec<&str> = hits.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "4"]);
        for m in hits {
            assert!(m.date_of_movement >= ts(2025, 4, 18, 0, 0, 0));
            assert!(m.date_of_movement <= ts(2025, 4, 28, 23, 59, 59));
        }
    }

    #[test]
    fn reset_keeps_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let mut f = VaccinationFilter::with_offset(offset);
        f.set("region", "Antioquia").unwrap();
        f.set("dateStart", "2025-05-06").unwrap();
        f.reset();
        assert!(f.is_unconstrained());
        assert_eq!(f.dates.offset(), offset);
    }

    #[test]
    fn vaccinator_matches_by_id() {
        let data = fixtures::embedded().unwrap();
        let mut f = VaccinationFilter::default();
        f.set("vaccinator", "1").unwrap();
        assert_eq!(apply(&data.vaccinations, &f).len(), 3);
        f.set("vaccinator", "Juan Pérez").unwrap();
        assert!(apply(&data.vaccinations, &f).is_empty());
    }
}
