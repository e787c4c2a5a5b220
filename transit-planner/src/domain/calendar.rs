//! Service calendars: which dates a service operates on.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Operating days of a service.
///
/// A service runs on a date when the date lies within `[start, end]` and
/// falls on one of `days`, unless it is listed in `removed`. Dates listed in
/// `additional` run regardless of the regular pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCalendar {
    start: NaiveDate,
    end: NaiveDate,
    days: Vec<Weekday>,
    #[serde(default)]
    additional: Vec<NaiveDate>,
    #[serde(default)]
    removed: Vec<NaiveDate>,
}

impl ServiceCalendar {
    /// Create a calendar running on `days` between `start` and `end` inclusive.
    pub fn new(start: NaiveDate, end: NaiveDate, days: Vec<Weekday>) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidCalendar(
                "end date is before start date",
            ));
        }
        Ok(Self {
            start,
            end,
            days,
            additional: Vec::new(),
            removed: Vec::new(),
        })
    }

    /// Every day of the week between `start` and `end`.
    pub fn daily(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        Self::new(
            start,
            end,
            vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
        )
    }

    /// Run on an extra date outside the regular pattern.
    pub fn with_additional(mut self, date: NaiveDate) -> Self {
        self.additional.push(date);
        self
    }

    /// Do not run on a date that the regular pattern includes.
    pub fn with_removed(mut self, date: NaiveDate) -> Self {
        self.removed.push(date);
        self
    }

    /// True if the service operates on `date`.
    pub fn operates_on(&self, date: NaiveDate) -> bool {
        if self.additional.contains(&date) {
            return true;
        }
        if self.removed.contains(&date) {
            return false;
        }
        date >= self.start && date <= self.end && self.days.contains(&date.weekday())
    }

    /// First date of the regular pattern.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the regular pattern.
    pub fn end(&self) -> NaiveDate {
        self.end
    }
}
