//! Journey ranking for search results.
//!
//! Ranks journeys by a combination of factors to present the most useful
//! options first.

use crate::domain::Journey;

/// Rank journeys by preference.
///
/// Journeys are ranked by:
/// 1. Arrival time (earlier is better)
/// 2. Number of changes (fewer is better)
/// 3. Total duration (shorter is better)
///
/// Returns journeys sorted best-first.
pub fn rank_journeys(mut journeys: Vec<Journey>) -> Vec<Journey> {
    journeys.sort_by_key(|journey| {
        (
            journey.arrival_time(),
            journey.change_count(),
            journey.total_duration(),
        )
    });
    journeys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        RouteId, StationId, TramTime, TransportMode, TransportStage, TripId, VehicleStage,
    };
    use proptest::prelude::*;

    fn at(minutes: u32) -> TramTime {
        TramTime::from_minutes(minutes).unwrap()
    }

    fn ride(trip: &str, from: &str, to: &str, departs: u32, arrives: u32) -> TransportStage {
        TransportStage::Vehicle(
            VehicleStage::new(
                TransportMode::Tram,
                RouteId::new("R"),
                TripId::new(trip),
                StationId::new(from),
                None,
                StationId::new(to),
                at(departs),
                at(arrives),
                1,
            )
            .unwrap(),
        )
    }

    fn direct(trip: &str, departs: u32, arrives: u32) -> Journey {
        Journey::new(vec![ride(trip, "ALT", "PIC", departs, arrives)], at(departs)).unwrap()
    }

    fn with_change(departs: u32, change: u32, arrives: u32) -> Journey {
        Journey::new(
            vec![
                ride("A", "ALT", "DEA", departs, change),
                ride("B", "DEA", "PIC", change, arrives),
            ],
            at(departs),
        )
        .unwrap()
    }

    #[test]
    fn rank_by_arrival() {
        let ranked = rank_journeys(vec![direct("B", 600, 640), direct("A", 600, 630)]);
        assert_eq!(ranked[0].arrival_time(), at(630));
        assert_eq!(ranked[1].arrival_time(), at(640));
    }

    #[test]
    fn rank_by_changes_when_same_arrival() {
        let ranked = rank_journeys(vec![with_change(600, 620, 690), direct("D", 600, 690)]);
        assert_eq!(ranked[0].change_count(), 0);
        assert_eq!(ranked[1].change_count(), 1);
    }

    #[test]
    fn keeps_different_trips_with_same_times() {
        let ranked = rank_journeys(vec![direct("X", 600, 630), direct("Y", 600, 630)]);
        assert_eq!(ranked.len(), 2);
        assert_ne!(ranked[0].stages(), ranked[1].stages());
    }

    #[test]
    fn empty_input() {
        assert!(rank_journeys(vec![]).is_empty());
    }

    fn journey_strategy() -> impl Strategy<Value = Journey> {
        (0u32..4, 360u32..1200, 10u32..120, any::<bool>()).prop_map(
            |(id, departs, duration, change)| {
                if change {
                    with_change(departs, departs + duration / 2, departs + duration)
                } else {
                    direct(&format!("T{id}"), departs, departs + duration)
                }
            },
        )
    }

    proptest! {
        #[test]
        fn rank_journeys_is_sorted(journeys in prop::collection::vec(journey_strategy(), 0..15)) {
            let ranked = rank_journeys(journeys);
            for window in ranked.windows(2) {
                let a = (window[0].arrival_time(), window[0].change_count(), window[0].total_duration());
                let b = (window[1].arrival_time(), window[1].change_count(), window[1].total_duration());
                prop_assert!(a <= b);
            }
        }

        #[test]
        fn rank_journeys_preserves_elements(journeys in prop::collection::vec(journey_strategy(), 0..15)) {
            let len = journeys.len();
            prop_assert_eq!(rank_journeys(journeys).len(), len);
        }
    }
}
