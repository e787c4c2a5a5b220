//! Minimum changes between routes, by breadth-first search.
//!
//! Two routes are adjacent when they call at a common station or at stations
//! linked by a walk. The number of changes needed from a route to a set of
//! destinations is its breadth-first distance to any route serving one of
//! them.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use tracing::debug;

use crate::domain::{RouteId, StationId};

use super::{InterchangeRepository, TransportData, WalkLinks};

/// Route adjacency for one network.
#[derive(Debug, Clone, Default)]
pub struct RouteInterchangeCosts {
    route_stations: BTreeMap<RouteId, BTreeSet<StationId>>,
    station_routes: BTreeMap<StationId, BTreeSet<RouteId>>,
    adjacent: BTreeMap<RouteId, BTreeSet<RouteId>>,
    walks: WalkLinks,
}

impl RouteInterchangeCosts {
    pub fn new(data: &dyn TransportData) -> Self {
        let mut route_stations: BTreeMap<RouteId, BTreeSet<StationId>> = BTreeMap::new();
        let mut station_routes: BTreeMap<StationId, BTreeSet<RouteId>> = BTreeMap::new();
        for trip in data.trips() {
            for call in trip.calls() {
                route_stations
                    .entry(trip.route().clone())
                    .or_default()
                    .insert(call.station.clone());
                station_routes
                    .entry(call.station.clone())
                    .or_default()
                    .insert(trip.route().clone());
            }
        }

        let walks = data.walks().clone();
        let mut adjacent: BTreeMap<RouteId, BTreeSet<RouteId>> = BTreeMap::new();
        for (station, routes) in &station_routes {
            let mut reachable: BTreeSet<RouteId> = routes.clone();
            for link in walks.walkable_from(station) {
                if let Some(linked) = station_routes.get(&link.to) {
                    reachable.extend(linked.iter().cloned());
                }
            }
            for route in routes {
                let entry = adjacent.entry(route.clone()).or_default();
                entry.extend(reachable.iter().filter(|other| *other != route).cloned());
            }
        }

        debug!(
            routes = route_stations.len(),
            stations = station_routes.len(),
            "Built route interchange table"
        );

        Self {
            route_stations,
            station_routes,
            adjacent,
            walks,
        }
    }

    /// Destinations plus every station a walk away from one.
    fn targets(&self, destinations: &[StationId]) -> HashSet<StationId> {
        let mut targets: HashSet<StationId> = destinations.iter().cloned().collect();
        for destination in destinations {
            targets.extend(
                self.walks
                    .walkable_from(destination)
                    .into_iter()
                    .map(|link| link.to),
            );
        }
        targets
    }

    fn serves_any(&self, route: &RouteId, targets: &HashSet<StationId>) -> bool {
        self.route_stations
            .get(route)
            .is_some_and(|stations| stations.iter().any(|station| targets.contains(station)))
    }

    /// Breadth-first distance from any of `starts` to a route serving a target.
    fn distance(
        &self,
        starts: impl IntoIterator<Item = RouteId>,
        targets: &HashSet<StationId>,
    ) -> Option<u8> {
        let mut seen: HashSet<RouteId> = HashSet::new();
        let mut queue: VecDeque<(RouteId, usize)> = VecDeque::new();
        for route in starts {
            if seen.insert(route.clone()) {
                queue.push_back((route, 0));
            }
        }

        while let Some((route, depth)) = queue.pop_front() {
            if self.serves_any(&route, targets) {
                return u8::try_from(depth).ok();
            }
            if let Some(next) = self.adjacent.get(&route) {
                for other in next {
                    if seen.insert(other.clone()) {
                        queue.push_back((other.clone(), depth + 1));
                    }
                }
            }
        }
        None
    }

    /// Routes calling at a station or at a station a walk away.
    fn routes_near(&self, station: &StationId) -> BTreeSet<RouteId> {
        let mut routes = self
            .station_routes
            .get(station)
            .cloned()
            .unwrap_or_default();
        for link in self.walks.walkable_from(station) {
            if let Some(linked) = self.station_routes.get(&link.to) {
                routes.extend(linked.iter().cloned());
            }
        }
        routes
    }
}

impl InterchangeRepository for RouteInterchangeCosts {
    fn min_changes_from_route(&self, route: &RouteId, destinations: &[StationId]) -> Option<u8> {
        let targets = self.targets(destinations);
        self.distance([route.clone()], &targets)
    }

    fn min_boardings_from_station(
        &self,
        station: &StationId,
        destinations: &[StationId],
    ) -> Option<u8> {
        let targets = self.targets(destinations);
        if targets.contains(station) {
            return Some(0);
        }
        self.distance(self.routes_near(station), &targets)
            .and_then(|changes| changes.checked_add(1))
    }
}
