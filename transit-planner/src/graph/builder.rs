//! Lays a timetable out as a time-expanded graph.
//!
//! ```text
//! Station -Board-> RouteStation -ToService-> Service -ToHour-> Hour
//!     ^                                                          |
//!     |                                                      ToMinute
//!   Depart                                                       v
//!     |                                                       Minute
//! RouteStation (next stop) <----------- TramGoesTo -------------'
//! ```
//!
//! Stations served by more than one route, or with walking links, are
//! interchanges: their route-stations carry the `Interchange` label and are
//! joined by `InterchangeBoard`/`InterchangeDepart` instead.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;
use tracing::info;

use crate::domain::{RouteId, ServiceId, StationId, TramTime, TransportMode};
use crate::repository::{TransportData, WalkKind};

use super::memory::GraphData;
use super::{GraphError, MemoryGraph, NodeId, NodeLabel, NodeLabels, NodeProperties, RelationshipType};

type RouteStationKey = (RouteId, StationId);
type ServiceKey = (RouteId, StationId, ServiceId);

/// Builds a [`MemoryGraph`] from transport data.
pub struct GraphBuilder<'a> {
    data: &'a dyn TransportData,
    graph: GraphData,
    route_stations: BTreeMap<RouteStationKey, NodeId>,
    services: BTreeMap<ServiceKey, NodeId>,
    hours: BTreeMap<(ServiceKey, u32), NodeId>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(data: &'a dyn TransportData) -> Self {
        Self {
            data,
            graph: GraphData::default(),
            route_stations: BTreeMap::new(),
            services: BTreeMap::new(),
            hours: BTreeMap::new(),
        }
    }

    pub fn build(mut self) -> Result<MemoryGraph, GraphError> {
        self.add_stations();
        self.add_groups()?;
        self.add_route_stations()?;
        self.add_services();
        self.add_trips()?;
        self.add_walks()?;

        let graph = MemoryGraph::new(self.graph);
        info!(
            nodes = graph.node_count()?,
            relationships = graph.relationship_count()?,
            "Built transport graph"
        );
        Ok(graph)
    }

    fn station_node(&self, station: &StationId) -> Result<NodeId, GraphError> {
        self.graph
            .station_node(station)
            .ok_or_else(|| GraphError::Build(format!("unknown station {station}")))
    }

    fn route_mode(&self, route: &RouteId) -> Result<TransportMode, GraphError> {
        self.data
            .route(route)
            .map(|route| route.mode)
            .ok_or_else(|| GraphError::Build(format!("unknown route {route}")))
    }

    fn add_stations(&mut self) {
        let data = self.data;
        for station in data.stations() {
            let mut labels = NodeLabels::of(&[NodeLabel::Station]);
            if let Some(label) = NodeLabel::for_mode(station.mode) {
                labels.insert(label);
            }
            let node = self.graph.add_node(
                labels,
                NodeProperties {
                    station: Some(station.id.clone()),
                    area: station.area.clone(),
                    mode: Some(station.mode),
                    ..NodeProperties::default()
                },
            );
            self.graph.index_station(station.id.clone(), node);
        }
    }

    fn add_groups(&mut self) -> Result<(), GraphError> {
        let data = self.data;
        for group in data.groups() {
            let node = self.graph.add_node(
                NodeLabels::of(&[NodeLabel::Grouped]),
                NodeProperties {
                    area: Some(group.id.clone()),
                    ..NodeProperties::default()
                },
            );
            self.graph.index_group(group.id.clone(), node);
            for station in &group.stations {
                let child = self.station_node(station)?;
                self.link(node, child, RelationshipType::GroupedToChild);
                self.link(child, node, RelationshipType::GroupedToParent);
            }
        }
        Ok(())
    }

    fn add_route_stations(&mut self) -> Result<(), GraphError> {
        let mut platforms: BTreeMap<RouteStationKey, Option<String>> = BTreeMap::new();
        let mut routes_at: BTreeMap<StationId, BTreeSet<RouteId>> = BTreeMap::new();
        let data = self.data;
        for trip in data.trips() {
            for call in trip.calls() {
                let platform = platforms
                    .entry((trip.route().clone(), call.station.clone()))
                    .or_default();
                if platform.is_none() {
                    platform.clone_from(&call.platform);
                }
                routes_at
                    .entry(call.station.clone())
                    .or_default()
                    .insert(trip.route().clone());
            }
        }

        for ((route, station), platform) in platforms {
            let mode = self.route_mode(&route)?;
            let interchange = routes_at.get(&station).is_some_and(|routes| routes.len() > 1)
                || !data.walks().walkable_from(&station).is_empty();

            let mut labels = NodeLabels::of(&[NodeLabel::RouteStation]);
            if let Some(label) = NodeLabel::for_mode(mode) {
                labels.insert(label);
            }
            if interchange {
                labels.insert(NodeLabel::Interchange);
            }
            let node = self.graph.add_node(
                labels,
                NodeProperties {
                    station: Some(station.clone()),
                    route: Some(route.clone()),
                    mode: Some(mode),
                    ..NodeProperties::default()
                },
            );

            let (board, depart) = if interchange {
                (RelationshipType::InterchangeBoard, RelationshipType::InterchangeDepart)
            } else {
                (RelationshipType::Board, RelationshipType::Depart)
            };
            let station_node = self.station_node(&station)?;
            self.graph
                .add_relationship(station_node, node, board, Duration::zero(), None, platform);
            self.link(node, station_node, depart);
            self.route_stations.insert((route, station), node);
        }
        Ok(())
    }

    fn add_services(&mut self) {
        let mut last_departures: BTreeMap<ServiceKey, TramTime> = BTreeMap::new();
        let data = self.data;
        for trip in data.trips() {
            let calls = trip.calls();
            // Safe: trips have at least two calls
            for call in &calls[..calls.len() - 1] {
                let key = (trip.route().clone(), call.station.clone(), trip.service().clone());
                let last = last_departures.entry(key).or_insert(call.departure);
                *last = (*last).max(call.departure);
            }
        }

        for (key, last_departure) in last_departures {
            let (route, station, service) = &key;
            let node = self.graph.add_node(
                NodeLabels::of(&[NodeLabel::Service]),
                NodeProperties {
                    station: Some(station.clone()),
                    route: Some(route.clone()),
                    service: Some(service.clone()),
                    time: Some(last_departure),
                    ..NodeProperties::default()
                },
            );
            if let Some(route_station) = self.route_stations.get(&(route.clone(), station.clone())) {
                let route_station = *route_station;
                self.link(route_station, node, RelationshipType::ToService);
            }
            self.services.insert(key, node);
        }
    }

    fn hour_node(&mut self, key: &ServiceKey, hour: u32) -> Result<NodeId, GraphError> {
        if let Some(node) = self.hours.get(&(key.clone(), hour)) {
            return Ok(*node);
        }
        let service = *self
            .services
            .get(key)
            .ok_or_else(|| GraphError::Build(format!("no service node for {}", key.2)))?;
        let (route, station, service_id) = key;
        let node = self.graph.add_node(
            NodeLabels::of(&[NodeLabel::Hour]),
            NodeProperties {
                station: Some(station.clone()),
                route: Some(route.clone()),
                service: Some(service_id.clone()),
                hour: Some(hour),
                ..NodeProperties::default()
            },
        );
        self.link(service, node, RelationshipType::ToHour);
        self.hours.insert((key.clone(), hour), node);
        Ok(node)
    }

    fn add_trips(&mut self) -> Result<(), GraphError> {
        let data = self.data;
        for trip in data.trips() {
            let mode = self.route_mode(trip.route())?;
            let goes_to = RelationshipType::goes_to(mode).ok_or_else(|| {
                GraphError::Build(format!("route {} has no vehicle mode", trip.route()))
            })?;
            let mut labels = NodeLabels::of(&[NodeLabel::Minute]);
            if let Some(label) = NodeLabel::for_mode(mode) {
                labels.insert(label);
            }

            for pair in trip.calls().windows(2) {
                let (call, next) = (&pair[0], &pair[1]);
                let key = (trip.route().clone(), call.station.clone(), trip.service().clone());
                let hour = self.hour_node(&key, call.departure.hour())?;
                let minute = self.graph.add_node(
                    labels,
                    NodeProperties {
                        station: Some(call.station.clone()),
                        route: Some(trip.route().clone()),
                        service: Some(trip.service().clone()),
                        trip: Some(trip.id().clone()),
                        mode: Some(mode),
                        time: Some(call.departure),
                        hour: Some(call.departure.hour()),
                        ..NodeProperties::default()
                    },
                );
                self.link(hour, minute, RelationshipType::ToMinute);

                let next_stop = *self
                    .route_stations
                    .get(&(trip.route().clone(), next.station.clone()))
                    .ok_or_else(|| {
                        GraphError::Build(format!("no route station for {}", next.station))
                    })?;
                self.graph.add_relationship(
                    minute,
                    next_stop,
                    goes_to,
                    next.arrival.signed_duration_since(call.departure),
                    Some(trip.id().clone()),
                    None,
                );
            }
        }
        Ok(())
    }

    fn add_walks(&mut self) -> Result<(), GraphError> {
        let data = self.data;
        for (from, link) in data.walks().iter() {
            let start = self.station_node(from)?;
            let end = self.station_node(&link.to)?;
            let kind = match link.kind {
                WalkKind::Walk => RelationshipType::WalksTo,
                WalkKind::Neighbour => RelationshipType::Neighbour,
            };
            self.graph
                .add_relationship(start, end, kind, link.duration, None, None);
        }
        Ok(())
    }

    fn link(&mut self, start: NodeId, end: NodeId, kind: RelationshipType) {
        self.graph
            .add_relationship(start, end, kind, Duration::zero(), None, None);
    }
}
