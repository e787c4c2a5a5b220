//! Dated station closures.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::StationId;

use super::ClosedStations;

/// A station closed between two dates inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Closure {
    pub station: StationId,
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

/// In-memory closures keyed by station.
#[derive(Debug, Clone, Default)]
pub struct ClosedStationsRepository {
    closures: HashMap<StationId, Vec<(NaiveDate, NaiveDate)>>,
}

impl ClosedStationsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close `station` from `begin` to `end` inclusive.
    pub fn close(&mut self, station: StationId, begin: NaiveDate, end: NaiveDate) {
        self.closures.entry(station).or_default().push((begin, end));
    }

    pub fn from_closures(closures: impl IntoIterator<Item = Closure>) -> Self {
        let mut repository = Self::new();
        for closure in closures {
            repository.close(closure.station, closure.begin, closure.end);
        }
        repository
    }

    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
    }
}

impl ClosedStations for ClosedStationsRepository {
    fn is_closed(&self, station: &StationId, date: NaiveDate) -> bool {
        self.closures.get(station).is_some_and(|ranges| {
            ranges
                .iter()
                .any(|(begin, end)| date >= *begin && date <= *end)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn closed_within_range_only() {
        let mut closed = ClosedStationsRepository::new();
        closed.close(StationId::new("CRN"), date(3), date(5));

        let crn = StationId::new("CRN");
        assert!(!closed.is_closed(&crn, date(2)));
        assert!(closed.is_closed(&crn, date(3)));
        assert!(closed.is_closed(&crn, date(5)));
        assert!(!closed.is_closed(&crn, date(6)));
        assert!(!closed.is_closed(&StationId::new("ALT"), date(4)));
    }

    #[test]
    fn closures_deserialize() {
        let json = r#"[{"station":"CRN","begin":"2024-06-03","end":"2024-06-04"}]"#;
        let closures: Vec<Closure> = serde_json::from_str(json).unwrap();
        let closed = ClosedStationsRepository::from_closures(closures);
        assert!(closed.is_closed(&StationId::new("CRN"), date(4)));
        assert!(!closed.is_empty());
    }
}
