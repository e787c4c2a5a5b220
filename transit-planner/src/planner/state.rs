//! Traversal state machine.
//!
//! A [`JourneyState`] says where a partial journey stands: which kind of
//! node it is at, the time there, what it is riding, and how many boardings
//! and walks it has used. [`JourneyState::next`] gives the state after
//! following a relationship, or `None` when the current state does not allow
//! that relationship at all (leaving a trip mid-hour, say). Such steps are
//! not judged by heuristics; they simply do not exist for this state.

use std::collections::HashSet;

use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::domain::{RouteId, ServiceId, TramTime, TransportMode, TripId};
use crate::graph::{GraphNode, GraphRelationship, NodeId, NodeLabel, RelationshipType};

/// Kind of node a traversal is at, and how it got there.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, IntoStaticStr,
)]
pub enum TraversalStateType {
    /// At a group node: may step to any station in the group.
    GroupedStation,
    /// At a station, not riding anything.
    Station,
    /// At a route-station about to board.
    RouteStationBoard,
    /// At a route-station while riding a trip.
    RouteStationOnTrip,
    Service,
    Hour,
    Minute,
    /// At a station reached on foot.
    Walking,
    Destination,
}

impl TraversalStateType {
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// State of one partial journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyState {
    state: TraversalStateType,
    time: TramTime,
    boardings: u32,
    walks: u32,
    neighbours: u32,
    mode: TransportMode,
    route: Option<RouteId>,
    service: Option<ServiceId>,
    trip: Option<TripId>,
    used_trips: Vec<TripId>,
}

impl JourneyState {
    /// State at the first node of a path.
    pub fn start(node: &GraphNode, time: TramTime) -> Self {
        let state = if node.has_label(NodeLabel::Grouped) {
            TraversalStateType::GroupedStation
        } else {
            TraversalStateType::Station
        };
        Self {
            state,
            time,
            boardings: 0,
            walks: 0,
            neighbours: 0,
            mode: TransportMode::NotSet,
            route: None,
            service: None,
            trip: None,
            used_trips: Vec::new(),
        }
    }

    pub fn state_type(&self) -> TraversalStateType {
        self.state
    }

    pub fn time(&self) -> TramTime {
        self.time
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    pub fn boardings(&self) -> u32 {
        self.boardings
    }

    /// Changes made so far: boardings after the first.
    pub fn changes(&self) -> u32 {
        self.boardings.saturating_sub(1)
    }

    pub fn walking_connections(&self) -> u32 {
        self.walks
    }

    pub fn neighbour_connections(&self) -> u32 {
        self.neighbours
    }

    pub fn route(&self) -> Option<&RouteId> {
        self.route.as_ref()
    }

    pub fn service(&self) -> Option<&ServiceId> {
        self.service.as_ref()
    }

    pub fn trip(&self) -> Option<&TripId> {
        self.trip.as_ref()
    }

    pub fn is_on_trip(&self) -> bool {
        self.trip.is_some()
    }

    /// Trips boarded earlier in this journey.
    pub fn used_trips(&self) -> &[TripId] {
        &self.used_trips
    }

    /// State after following `rel` to `target`, if this state allows it.
    pub fn next(
        &self,
        rel: &GraphRelationship,
        target: &GraphNode,
        destinations: &HashSet<NodeId>,
    ) -> Option<JourneyState> {
        use RelationshipType::*;
        use TraversalStateType as S;

        let mut next = self.clone();
        next.time = self.time + rel.cost;

        match (self.state, rel.kind) {
            (S::GroupedStation, GroupedToChild) => {
                next.state = S::Station;
            }

            (S::Station | S::Walking, Board | InterchangeBoard) => {
                next.state = S::RouteStationBoard;
                next.boardings += 1;
                next.mode = TransportMode::NotSet;
                next.route = target.props.route.clone();
            }
            (S::Station | S::Walking, WalksTo) => {
                next.state = S::Walking;
                next.walks += 1;
                next.mode = TransportMode::Walk;
            }
            (S::Station | S::Walking, Neighbour) => {
                next.state = S::Walking;
                next.neighbours += 1;
                next.mode = TransportMode::Walk;
            }

            (S::RouteStationBoard, ToService) => {
                next.state = S::Service;
                next.service = target.props.service.clone();
            }
            (S::RouteStationOnTrip, ToService) => {
                if target.props.service != self.service {
                    return None;
                }
                next.state = S::Service;
            }
            (S::RouteStationOnTrip, Depart | InterchangeDepart) => {
                next.state = S::Station;
                next.mode = TransportMode::NotSet;
                next.trip = None;
                next.service = None;
            }

            (S::Service, ToHour) => {
                next.state = S::Hour;
            }

            (S::Hour, ToMinute) => {
                let departs = target.props.time?;
                match &self.trip {
                    Some(trip) => {
                        if target.props.trip.as_ref() != Some(trip) {
                            return None;
                        }
                    }
                    None => {
                        let trip = target.props.trip.clone()?;
                        next.used_trips.push(trip.clone());
                        next.trip = Some(trip);
                        next.mode = target.props.mode.unwrap_or(TransportMode::Unknown);
                    }
                }
                next.state = S::Minute;
                next.time = departs;
            }

            (S::Minute, TramGoesTo | BusGoesTo | TrainGoesTo) => {
                if rel.trip != self.trip {
                    return None;
                }
                next.state = S::RouteStationOnTrip;
            }

            _ => return None,
        }

        if next.state != S::RouteStationBoard
            && target.has_label(NodeLabel::Station)
            && destinations.contains(&target.id)
        {
            next.state = S::Destination;
        }
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeLabels, NodeProperties, RelationshipId};
    use chrono::Duration;

    fn t(s: &str) -> TramTime {
        TramTime::parse_hhmm(s).unwrap()
    }

    fn node(id: u64, label: NodeLabel, props: NodeProperties) -> GraphNode {
        GraphNode {
            id: NodeId(id),
            labels: NodeLabels::of(&[label]),
            props,
        }
    }

    fn rel(kind: RelationshipType, cost: i64, trip: Option<&str>) -> GraphRelationship {
        GraphRelationship {
            id: RelationshipId(0),
            kind,
            start: NodeId(0),
            end: NodeId(0),
            cost: Duration::minutes(cost),
            trip: trip.map(TripId::new),
            platform: None,
        }
    }

    fn minute(id: u64, trip: &str, time: &str) -> GraphNode {
        node(
            id,
            NodeLabel::Minute,
            NodeProperties {
                trip: Some(TripId::new(trip)),
                time: Some(t(time)),
                mode: Some(TransportMode::Tram),
                ..NodeProperties::default()
            },
        )
    }

    fn service(id: u64, service: &str) -> GraphNode {
        node(
            id,
            NodeLabel::Service,
            NodeProperties {
                service: Some(ServiceId::new(service)),
                ..NodeProperties::default()
            },
        )
    }

    /// Station -> board -> service -> hour -> minute of `trip`.
    fn boarded(trip: &str) -> JourneyState {
        let none = HashSet::new();
        let station = node(1, NodeLabel::Station, NodeProperties::default());
        let start = JourneyState::start(&station, t("10:00"));
        let route_station = node(2, NodeLabel::RouteStation, NodeProperties::default());
        let at_rs = start
            .next(&rel(RelationshipType::Board, 0, None), &route_station, &none)
            .unwrap();
        let at_service = at_rs
            .next(&rel(RelationshipType::ToService, 0, None), &service(3, "S1"), &none)
            .unwrap();
        let hour = node(4, NodeLabel::Hour, NodeProperties::default());
        let at_hour = at_service
            .next(&rel(RelationshipType::ToHour, 0, None), &hour, &none)
            .unwrap();
        at_hour
            .next(&rel(RelationshipType::ToMinute, 0, None), &minute(5, trip, "10:04"), &none)
            .unwrap()
    }

    #[test]
    fn boarding_a_trip() {
        let state = boarded("T1");
        assert_eq!(state.state_type(), TraversalStateType::Minute);
        assert_eq!(state.time(), t("10:04"));
        assert_eq!(state.boardings(), 1);
        assert_eq!(state.changes(), 0);
        assert_eq!(state.mode(), TransportMode::Tram);
        assert_eq!(state.trip(), Some(&TripId::new("T1")));
        assert_eq!(state.used_trips(), &[TripId::new("T1")]);
    }

    #[test]
    fn riding_and_alighting() {
        let none = HashSet::new();
        let state = boarded("T1");
        let next_stop = node(6, NodeLabel::RouteStation, NodeProperties::default());

        assert!(state
            .next(&rel(RelationshipType::TramGoesTo, 3, Some("T2")), &next_stop, &none)
            .is_none());

        let on_trip = state
            .next(&rel(RelationshipType::TramGoesTo, 3, Some("T1")), &next_stop, &none)
            .unwrap();
        assert_eq!(on_trip.state_type(), TraversalStateType::RouteStationOnTrip);
        assert_eq!(on_trip.time(), t("10:07"));
        assert!(on_trip.is_on_trip());

        // Staying aboard only follows the same service.
        assert!(on_trip
            .next(&rel(RelationshipType::ToService, 0, None), &service(7, "S2"), &none)
            .is_none());
        assert!(on_trip
            .next(&rel(RelationshipType::ToService, 0, None), &service(7, "S1"), &none)
            .is_some());

        let station = node(8, NodeLabel::Station, NodeProperties::default());
        let alighted = on_trip
            .next(&rel(RelationshipType::Depart, 0, None), &station, &none)
            .unwrap();
        assert_eq!(alighted.state_type(), TraversalStateType::Station);
        assert!(!alighted.is_on_trip());
        assert_eq!(alighted.mode(), TransportMode::NotSet);
        assert_eq!(alighted.used_trips().len(), 1);
    }

    #[test]
    fn on_trip_minute_must_match_trip() {
        let none = HashSet::new();
        let mut state = boarded("T1");
        state.state = TraversalStateType::Hour;
        assert!(state
            .next(&rel(RelationshipType::ToMinute, 0, None), &minute(9, "T2", "10:10"), &none)
            .is_none());
        let same = state
            .next(&rel(RelationshipType::ToMinute, 0, None), &minute(9, "T1", "10:10"), &none)
            .unwrap();
        assert_eq!(same.used_trips().len(), 1);
    }

    #[test]
    fn walking_counts_connections() {
        let none = HashSet::new();
        let station = node(1, NodeLabel::Station, NodeProperties::default());
        let other = node(2, NodeLabel::Station, NodeProperties::default());
        let start = JourneyState::start(&station, t("10:00"));

        let walked = start
            .next(&rel(RelationshipType::WalksTo, 5, None), &other, &none)
            .unwrap();
        assert_eq!(walked.state_type(), TraversalStateType::Walking);
        assert_eq!(walked.walking_connections(), 1);
        assert_eq!(walked.time(), t("10:05"));
        assert_eq!(walked.mode(), TransportMode::Walk);

        let neighboured = walked
            .next(&rel(RelationshipType::Neighbour, 2, None), &station, &none)
            .unwrap();
        assert_eq!(neighboured.neighbour_connections(), 1);
    }

    #[test]
    fn reaching_a_destination_station() {
        let station = node(1, NodeLabel::Station, NodeProperties::default());
        let destination = node(2, NodeLabel::Station, NodeProperties::default());
        let destinations: HashSet<NodeId> = [NodeId(2)].into_iter().collect();
        let start = JourneyState::start(&station, t("10:00"));
        let arrived = start
            .next(&rel(RelationshipType::WalksTo, 5, None), &destination, &destinations)
            .unwrap();
        assert_eq!(arrived.state_type(), TraversalStateType::Destination);
        assert!(arrived
            .next(&rel(RelationshipType::WalksTo, 5, None), &station, &destinations)
            .is_none());
    }

    #[test]
    fn groups_step_to_children_only() {
        let none = HashSet::new();
        let group = node(1, NodeLabel::Grouped, NodeProperties::default());
        let start = JourneyState::start(&group, t("10:00"));
        assert_eq!(start.state_type(), TraversalStateType::GroupedStation);
        let child = node(2, NodeLabel::Station, NodeProperties::default());
        assert!(start
            .next(&rel(RelationshipType::GroupedToChild, 0, None), &child, &none)
            .is_some());
        assert!(start
            .next(&rel(RelationshipType::WalksTo, 0, None), &child, &none)
            .is_none());
    }

    #[test]
    fn station_cannot_skip_to_service() {
        let none = HashSet::new();
        let station = node(1, NodeLabel::Station, NodeProperties::default());
        let start = JourneyState::start(&station, t("10:00"));
        assert!(start
            .next(&rel(RelationshipType::ToService, 0, None), &service(2, "S1"), &none)
            .is_none());
    }
}
