//! Checks that decide whether a partial journey may continue.
//!
//! Each check returns a verdict: a valid one naming the check that passed,
//! or a negative one naming why the path ends. Checks read the repositories
//! but change nothing; recording verdicts is the evaluator's job.

use chrono::Duration;

use crate::diagnostics::{HeuristicsReason, HowIGotHere, ReasonCode};
use crate::domain::{StationId, TramTime, TripId};
use crate::graph::GraphNode;
use crate::repository::Repositories;

use super::{JourneyRequest, JourneyState, PathRequest, SearchConfig};

/// The checks, bound to one path request.
pub struct ServiceHeuristics<'r> {
    repos: &'r Repositories,
    config: &'r SearchConfig,
    request: &'r JourneyRequest,
    path_request: &'r PathRequest,
    destinations: &'r [StationId],
}

impl<'r> ServiceHeuristics<'r> {
    pub fn new(
        repos: &'r Repositories,
        config: &'r SearchConfig,
        request: &'r JourneyRequest,
        path_request: &'r PathRequest,
        destinations: &'r [StationId],
    ) -> Self {
        Self {
            repos,
            config,
            request,
            path_request,
            destinations,
        }
    }

    /// Time since the query time.
    pub fn elapsed(&self, time: TramTime) -> Duration {
        time.signed_duration_since(self.path_request.query_time)
    }

    pub fn path_length(&self, length: usize, how: HowIGotHere) -> HeuristicsReason {
        if length > self.config.max_path_length {
            HeuristicsReason::path_too_long(how)
        } else {
            HeuristicsReason::valid(ReasonCode::PathLengthOk, how)
        }
    }

    pub fn journey_duration(&self, elapsed: Duration, how: HowIGotHere) -> HeuristicsReason {
        if elapsed > self.request.max_duration {
            HeuristicsReason::took_too_long(elapsed, how)
        } else {
            HeuristicsReason::valid(ReasonCode::DurationOk, how)
        }
    }

    pub fn changes(&self, state: &JourneyState, how: HowIGotHere) -> HeuristicsReason {
        if state.changes() > self.path_request.max_changes {
            HeuristicsReason::too_many_changes(state.changes(), how)
        } else {
            HeuristicsReason::valid(ReasonCode::NumChangesOk, how)
        }
    }

    pub fn walking_connections(&self, state: &JourneyState, how: HowIGotHere) -> HeuristicsReason {
        let walks = state.walking_connections();
        if walks > self.config.max_walking_connections {
            HeuristicsReason::too_many_walking_connections(walks, how)
        } else {
            HeuristicsReason::valid(ReasonCode::NumWalkingConnectionsOk, how)
        }
    }

    pub fn neighbour_connections(
        &self,
        state: &JourneyState,
        how: HowIGotHere,
    ) -> HeuristicsReason {
        let neighbours = state.neighbour_connections();
        if neighbours > self.config.max_neighbour_connections {
            HeuristicsReason::too_many_neighbour_connections(neighbours, how)
        } else {
            HeuristicsReason::valid(ReasonCode::NeighbourConnectionsOk, how)
        }
    }

    /// Service node: does the service run on the query date?
    pub fn service_date(&self, node: &GraphNode, how: HowIGotHere) -> HeuristicsReason {
        match &node.props.service {
            Some(service)
                if !self
                    .repos
                    .data
                    .service_runs_on(service, self.path_request.date) =>
            {
                HeuristicsReason::not_on_query_date(service.clone(), how)
            }
            _ => HeuristicsReason::valid(ReasonCode::ServiceDateOk, how),
        }
    }

    /// Service node: is there a departure at or after `time`?
    pub fn service_time(
        &self,
        node: &GraphNode,
        time: TramTime,
        elapsed: Duration,
        how: HowIGotHere,
    ) -> HeuristicsReason {
        match node.props.time {
            Some(last_departure) if last_departure < time => {
                HeuristicsReason::service_not_running_at_time(elapsed, how)
            }
            _ => HeuristicsReason::valid(ReasonCode::ServiceTimeOk, how),
        }
    }

    /// Route station: does any service of the route run on the query date?
    pub fn route_date(&self, node: &GraphNode, how: HowIGotHere) -> HeuristicsReason {
        match &node.props.route {
            Some(route) if !self.repos.data.route_runs_on(route, self.path_request.date) => {
                HeuristicsReason::route_not_on_query_date(route.clone(), how)
            }
            _ => HeuristicsReason::valid(ReasonCode::RouteDateOk, how),
        }
    }

    pub fn station_open(&self, station: &StationId, how: HowIGotHere) -> HeuristicsReason {
        if self.repos.closed.is_closed(station, self.path_request.date) {
            HeuristicsReason::station_closed(station.clone(), how)
        } else {
            HeuristicsReason::valid(ReasonCode::StationOpen, how)
        }
    }

    /// Route station: is the route's mode one the request allows?
    pub fn transport_mode(&self, node: &GraphNode, how: HowIGotHere) -> HeuristicsReason {
        match (&node.props.route, node.props.mode) {
            (Some(route), Some(mode)) if !self.request.allows_mode(mode) => {
                HeuristicsReason::transport_mode_wrong(route.clone(), how)
            }
            _ => HeuristicsReason::valid(ReasonCode::TransportModeOk, how),
        }
    }

    /// Route station: can the destination still be reached within the
    /// change limit after boarding this route?
    pub fn route_reachable(
        &self,
        node: &GraphNode,
        boardings: u32,
        how: HowIGotHere,
    ) -> HeuristicsReason {
        let Some(route) = &node.props.route else {
            return HeuristicsReason::valid(ReasonCode::Reachable, how);
        };
        match self
            .repos
            .interchanges
            .min_changes_from_route(route, self.destinations)
        {
            None => HeuristicsReason::not_reachable(how),
            Some(fewest) => {
                let required = boardings.saturating_sub(1) + u32::from(fewest);
                if required > self.path_request.max_changes {
                    HeuristicsReason::too_many_route_changes_required(required, how)
                } else {
                    HeuristicsReason::valid(ReasonCode::Reachable, how)
                }
            }
        }
    }

    /// Hour node: is the hour within the wait window starting at `time`?
    pub fn hour(
        &self,
        node: &GraphNode,
        time: TramTime,
        elapsed: Duration,
        how: HowIGotHere,
    ) -> HeuristicsReason {
        let Some(hour) = node.props.hour else {
            return HeuristicsReason::valid(ReasonCode::HourOk, how);
        };
        let latest = time + self.config.max_wait();
        if hour < time.hour() || hour > latest.hour() {
            HeuristicsReason::not_at_hour(elapsed, how)
        } else {
            HeuristicsReason::valid(ReasonCode::HourOk, how)
        }
    }

    /// Minute node: has it gone, and if boarding, is the wait acceptable?
    pub fn departure_time(
        &self,
        node: &GraphNode,
        time: TramTime,
        on_trip: bool,
        elapsed: Duration,
        how: HowIGotHere,
    ) -> HeuristicsReason {
        let Some(departs) = node.props.time else {
            return HeuristicsReason::valid(ReasonCode::TimeOk, how);
        };
        if departs < time {
            HeuristicsReason::already_departed(elapsed, how)
        } else if !on_trip && departs.signed_duration_since(time) > self.config.max_wait() {
            HeuristicsReason::does_not_operate_on_time(elapsed, how)
        } else {
            HeuristicsReason::valid(ReasonCode::TimeOk, how)
        }
    }

    /// Minute node: boarding a trip this journey already rode.
    pub fn same_trip(&self, node: &GraphNode, used: &[TripId], how: HowIGotHere) -> HeuristicsReason {
        match &node.props.trip {
            Some(trip) if used.contains(trip) => HeuristicsReason::same_trip(trip.clone(), how),
            _ => HeuristicsReason::valid(ReasonCode::SameTripOk, how),
        }
    }

    /// Station node: can the destination be reached within the change limit
    /// from here?
    pub fn interchanges(
        &self,
        station: &StationId,
        boardings: u32,
        how: HowIGotHere,
    ) -> HeuristicsReason {
        match self
            .repos
            .interchanges
            .min_boardings_from_station(station, self.destinations)
        {
            None => HeuristicsReason::interchange_unreachable(how),
            Some(fewest) => {
                let required = boardings + u32::from(fewest);
                if required > self.path_request.max_changes + 1 {
                    HeuristicsReason::too_many_interchanges_required(required, how)
                } else {
                    HeuristicsReason::valid(ReasonCode::InterchangesOk, how)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RouteId, ServiceId, TransportMode};
    use crate::graph::{NodeId, NodeLabel, NodeLabels, NodeProperties};
    use crate::planner::TraversalStateType;
    use crate::repository::{ClosedStationsRepository, Closure};
    use crate::testing;

    struct Fixture {
        repos: Repositories,
        config: SearchConfig,
        request: JourneyRequest,
        path_request: PathRequest,
        destinations: Vec<StationId>,
    }

    impl Fixture {
        fn new(to: &str, max_changes: u32) -> Self {
            Self::with_repos(testing::fixture().1, to, max_changes)
        }

        fn with_repos(repos: Repositories, to: &str, max_changes: u32) -> Self {
            let request =
                JourneyRequest::new("ALT", to, testing::monday(), testing::t("08:00"), max_changes);
            let path_request = PathRequest::new(&request, testing::t("08:00"), max_changes, 0);
            Self {
                repos,
                config: SearchConfig::default(),
                request,
                path_request,
                destinations: vec![StationId::new(to)],
            }
        }

        fn heuristics(&self) -> ServiceHeuristics<'_> {
            ServiceHeuristics::new(
                &self.repos,
                &self.config,
                &self.request,
                &self.path_request,
                &self.destinations,
            )
        }
    }

    fn how() -> HowIGotHere {
        HowIGotHere::start(NodeId(1), TraversalStateType::Station)
    }

    fn node(label: NodeLabel, props: NodeProperties) -> GraphNode {
        GraphNode {
            id: NodeId(1),
            labels: NodeLabels::of(&[label]),
            props,
        }
    }

    fn route_station(route: &str, mode: TransportMode) -> GraphNode {
        node(
            NodeLabel::RouteStation,
            NodeProperties {
                route: Some(RouteId::new(route)),
                mode: Some(mode),
                ..NodeProperties::default()
            },
        )
    }

    #[test]
    fn service_dates_follow_calendars() {
        let fixture = Fixture::new("PIC", 1);
        let h = fixture.heuristics();
        let service = |id: &str| {
            node(
                NodeLabel::Service,
                NodeProperties {
                    service: Some(ServiceId::new(id)),
                    ..NodeProperties::default()
                },
            )
        };
        assert!(h.service_date(&service("WKD_ALTY"), how()).is_valid());
        assert_eq!(
            h.service_date(&service("SUN_TRAIN"), how()).code(),
            ReasonCode::NotOnQueryDate
        );
    }

    #[test]
    fn route_dates_follow_services() {
        let fixture = Fixture::new("PIC", 1);
        let h = fixture.heuristics();
        assert!(h
            .route_date(&route_station(testing::ALTY_ROUTE, TransportMode::Tram), how())
            .is_valid());
        assert_eq!(
            h.route_date(&route_station(testing::TRAIN_ROUTE, TransportMode::Train), how())
                .code(),
            ReasonCode::RouteNotOnQueryDate
        );
    }

    #[test]
    fn service_time_uses_last_departure() {
        let fixture = Fixture::new("PIC", 1);
        let h = fixture.heuristics();
        let service = node(
            NodeLabel::Service,
            NodeProperties {
                time: Some(testing::t("11:00")),
                ..NodeProperties::default()
            },
        );
        let elapsed = Duration::minutes(200);
        assert!(h.service_time(&service, testing::t("11:00"), elapsed, how()).is_valid());
        let late = h.service_time(&service, testing::t("11:01"), elapsed, how());
        assert_eq!(late.code(), ReasonCode::ServiceNotRunningAtTime);
        assert_eq!(late.elapsed(), Some(elapsed));
    }

    #[test]
    fn hour_window_spans_the_maximum_wait() {
        let fixture = Fixture::new("PIC", 1);
        let h = fixture.heuristics();
        let hour = |n: u32| {
            node(
                NodeLabel::Hour,
                NodeProperties {
                    hour: Some(n),
                    ..NodeProperties::default()
                },
            )
        };
        let zero = Duration::zero();
        assert!(h.hour(&hour(8), testing::t("08:30"), zero, how()).is_valid());
        // 08:40 plus 25 minutes is in hour 9.
        assert!(h.hour(&hour(9), testing::t("08:40"), zero, how()).is_valid());
        assert_eq!(
            h.hour(&hour(9), testing::t("08:30"), zero, how()).code(),
            ReasonCode::NotAtHour
        );
        assert_eq!(
            h.hour(&hour(7), testing::t("08:00"), zero, how()).code(),
            ReasonCode::NotAtHour
        );
    }

    #[test]
    fn departures_respect_wait_only_when_boarding() {
        let fixture = Fixture::new("PIC", 1);
        let h = fixture.heuristics();
        let minute = node(
            NodeLabel::Minute,
            NodeProperties {
                time: Some(testing::t("09:00")),
                ..NodeProperties::default()
            },
        );
        let zero = Duration::zero();
        assert_eq!(
            h.departure_time(&minute, testing::t("09:01"), false, zero, how()).code(),
            ReasonCode::AlreadyDeparted
        );
        assert_eq!(
            h.departure_time(&minute, testing::t("08:30"), false, zero, how()).code(),
            ReasonCode::DoesNotOperateOnTime
        );
        assert!(h.departure_time(&minute, testing::t("08:30"), true, zero, how()).is_valid());
        assert!(h.departure_time(&minute, testing::t("08:35"), false, zero, how()).is_valid());
    }

    #[test]
    fn same_trip_is_refused() {
        let fixture = Fixture::new("PIC", 1);
        let h = fixture.heuristics();
        let minute = node(
            NodeLabel::Minute,
            NodeProperties {
                trip: Some(TripId::new("T1")),
                ..NodeProperties::default()
            },
        );
        assert!(h.same_trip(&minute, &[TripId::new("T2")], how()).is_valid());
        assert_eq!(
            h.same_trip(&minute, &[TripId::new("T1")], how()).code(),
            ReasonCode::SameTrip
        );
    }

    #[test]
    fn modes_are_filtered_by_request() {
        let mut fixture = Fixture::new("PIC", 1);
        fixture.request = fixture.request.clone().with_modes([TransportMode::Tram]);
        let h = fixture.heuristics();
        assert!(h
            .transport_mode(&route_station(testing::ALTY_ROUTE, TransportMode::Tram), how())
            .is_valid());
        assert_eq!(
            h.transport_mode(&route_station(testing::BUS_ROUTE, TransportMode::Bus), how())
                .code(),
            ReasonCode::TransportModeWrong
        );
    }

    #[test]
    fn route_reachability_counts_changes_already_made() {
        let fixture = Fixture::new("ECC", 0);
        let h = fixture.heuristics();
        let alty = route_station(testing::ALTY_ROUTE, TransportMode::Tram);
        let bury = route_station(testing::BURY_ROUTE, TransportMode::Tram);
        assert!(h.route_reachable(&bury, 1, how()).is_valid());
        assert_eq!(
            h.route_reachable(&alty, 1, how()).code(),
            ReasonCode::TooManyRouteChangesRequired
        );
        assert_eq!(
            h.route_reachable(&route_station(testing::TRAIN_ROUTE, TransportMode::Train), 1, how())
                .code(),
            ReasonCode::NotReachable
        );
    }

    #[test]
    fn interchanges_bound_boardings() {
        let fixture = Fixture::new("ECC", 0);
        let h = fixture.heuristics();
        assert!(h.interchanges(&StationId::new("SPS"), 0, how()).is_valid());
        assert_eq!(
            h.interchanges(&StationId::new("ALT"), 0, how()).code(),
            ReasonCode::TooManyInterchangesRequired
        );
        assert_eq!(
            h.interchanges(&StationId::new("OXR"), 0, how()).code(),
            ReasonCode::InterchangeUnreachable
        );
    }

    #[test]
    fn closed_stations() {
        let closed = ClosedStationsRepository::from_closures(vec![Closure {
            station: StationId::new("CRN"),
            begin: testing::monday(),
            end: testing::monday(),
        }]);
        let fixture = Fixture::with_repos(testing::fixture_with_closures(closed).1, "PIC", 1);
        let h = fixture.heuristics();
        assert_eq!(
            h.station_open(&StationId::new("CRN"), how()).code(),
            ReasonCode::StationClosed
        );
        assert!(h.station_open(&StationId::new("DEA"), how()).is_valid());
    }

    #[test]
    fn path_shape_limits() {
        let fixture = Fixture::new("PIC", 1);
        let h = fixture.heuristics();
        assert!(h.path_length(400, how()).is_valid());
        assert_eq!(h.path_length(401, how()).code(), ReasonCode::PathTooLong);
        assert!(h.journey_duration(Duration::minutes(120), how()).is_valid());
        assert_eq!(
            h.journey_duration(Duration::minutes(121), how()).code(),
            ReasonCode::TookTooLong
        );
        assert_eq!(h.elapsed(testing::t("08:45")), Duration::minutes(45));
    }
}
