use chrono::{Datelike, Months, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

// ============================================================================
// Calendar month
// ============================================================================

/// A calendar month, written `YYYY-MM` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| CoreError::ValidationError(format!("Invalid calendar month: {}-{}", year, month)))
    }

    /// Month containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day
            .pred_opt()
            .unwrap_or(self.first_day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    pub fn next(&self) -> Self {
        Self {
            first_day: self.first_day.checked_add_months(Months::new(1)).unwrap_or(self.first_day),
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            first_day: self.first_day.checked_sub_months(Months::new(1)).unwrap_or(self.first_day),
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = *self;
        self.first_day
            .iter_days()
            .take_while(move |d| month.contains(*d))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::ValidationError(format!("Invalid month, expected YYYY-MM: {}", s));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Slots
// ============================================================================

/// One start time on one day with the seats still open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(with = "trek_shared::time")]
    pub time: NaiveTime,
    pub remaining: u32,
}

impl Slot {
    pub fn new(time: NaiveTime, remaining: u32) -> Self {
        Self { time, remaining }
    }

    pub fn is_open(&self) -> bool {
        self.remaining > 0
    }
}

/// Raw availability payload for one resource and one month, as served by the
/// scheduling service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthAvailability {
    #[serde(default)]
    pub available_slots_by_date: BTreeMap<NaiveDate, Vec<Slot>>,
    #[serde(default)]
    pub fully_booked_dates: BTreeSet<NaiveDate>,
}

impl MonthAvailability {
    pub fn slots_on(&self, date: NaiveDate) -> &[Slot] {
        self.available_slots_by_date
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Listed as fully booked, or every listed slot has zero seats left.
    pub fn is_fully_booked(&self, date: NaiveDate) -> bool {
        if self.fully_booked_dates.contains(&date) {
            return true;
        }
        let slots = self.slots_on(date);
        !slots.is_empty() && slots.iter().all(|s| !s.is_open())
    }

    /// Service-reported fully booked dates plus days with no open slot left.
    pub fn fully_booked(&self) -> BTreeSet<NaiveDate> {
        let mut dates = self.fully_booked_dates.clone();
        dates.extend(
            self.available_slots_by_date
                .keys()
                .copied()
                .filter(|d| self.is_fully_booked(*d)),
        );
        dates
    }

    pub fn open_slots(&self, date: NaiveDate) -> impl Iterator<Item = &Slot> {
        self.slots_on(date).iter().filter(|s| s.is_open())
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum AvailabilityError {
    #[error("Availability unavailable: {0}")]
    Unreachable(String),

    #[error("Availability service error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Malformed availability payload: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_year_month_parse_and_display() {
        let month: YearMonth = "2026-02".parse().unwrap();
        assert_eq!(month.to_string(), "2026-02");
        assert_eq!(month.last_day(), date(2026, 2, 28));
        assert_eq!(month.days().count(), 28);
        assert_eq!(month.next().to_string(), "2026-03");
        assert_eq!("2026-01".parse::<YearMonth>().unwrap().previous().to_string(), "2025-12");
    }

    #[test]
    fn test_year_month_rejects_invalid_months() {
        assert!("2026-13".parse::<YearMonth>().is_err());
        assert!("2026-00".parse::<YearMonth>().is_err());
        assert!("2026-1".parse::<YearMonth>().is_err());
        assert!("october".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{
            "availableSlotsByDate": {
                "2026-10-20": [{ "time": "09:00", "remaining": 4 }, { "time": "14:30", "remaining": 0 }],
                "2026-10-21": [{ "time": "09:00", "remaining": 0 }]
            },
            "fullyBookedDates": ["2026-10-22"]
        }"#;
        let month: MonthAvailability = serde_json::from_str(json).unwrap();

        assert_eq!(month.slots_on(date(2026, 10, 20)).len(), 2);
        assert_eq!(month.slots_on(date(2026, 10, 20))[1].time, time(14, 30));
        assert_eq!(month.open_slots(date(2026, 10, 20)).count(), 1);

        let booked = month.fully_booked();
        assert!(booked.contains(&date(2026, 10, 21)));
        assert!(booked.contains(&date(2026, 10, 22)));
        assert!(!booked.contains(&date(2026, 10, 20)));

        let back = serde_json::to_value(&month).unwrap();
        assert_eq!(back["availableSlotsByDate"]["2026-10-20"][0]["time"], "09:00");
        assert_eq!(back["fullyBookedDates"][0], "2026-10-22");
    }

    #[test]
    fn test_day_without_slots_is_not_fully_booked() {
        let month = MonthAvailability::default();
        assert!(!month.is_fully_booked(date(2026, 10, 20)));
        assert!(month.slots_on(date(2026, 10, 20)).is_empty());
    }
}
