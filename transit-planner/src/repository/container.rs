//! In-memory transport data loaded from a JSON network file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::domain::{
    AreaId, Route, RouteId, Service, ServiceId, Station, StationGroup, StationId, Trip, TripId,
};

use super::{Closure, DataError, TransportData, WalkKind, WalkLinks};

/// A walking link as written in a network file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WalkEntry {
    pub from: StationId,
    pub to: StationId,
    pub minutes: i64,
}

/// Contents of a network file, before cross-references are checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkFile {
    pub stations: Vec<Station>,
    pub groups: Vec<StationGroup>,
    pub routes: Vec<Route>,
    pub services: Vec<Service>,
    pub trips: Vec<Trip>,
    pub walks: Vec<WalkEntry>,
    pub closures: Vec<Closure>,
}

impl NetworkFile {
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let json = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Validated transport data held in memory.
///
/// Maps are ordered by id so anything built from them (the graph in
/// particular) is laid out the same way on every run.
#[derive(Debug, Clone, Default)]
pub struct TransportDataContainer {
    stations: BTreeMap<StationId, Station>,
    groups: BTreeMap<AreaId, StationGroup>,
    routes: BTreeMap<RouteId, Route>,
    services: BTreeMap<ServiceId, Service>,
    trips: BTreeMap<TripId, Trip>,
    walks: WalkLinks,
}

impl TransportDataContainer {
    /// Check cross-references and index a network.
    ///
    /// Closures in the file are ignored here; they belong to the
    /// closed-stations repository.
    pub fn new(network: NetworkFile) -> Result<Self, DataError> {
        let stations: BTreeMap<StationId, Station> = network
            .stations
            .into_iter()
            .map(|station| (station.id.clone(), station))
            .collect();

        let station_known = |station: &StationId, referenced_by: String| {
            if stations.contains_key(station) {
                Ok(())
            } else {
                Err(DataError::UnknownStation {
                    referenced_by,
                    station: station.clone(),
                })
            }
        };

        let mut groups: BTreeMap<AreaId, StationGroup> = BTreeMap::new();
        for group in network.groups {
            for station in &group.stations {
                station_known(station, format!("group {}", group.id))?;
            }
            groups.insert(group.id.clone(), group);
        }
        for station in stations.values() {
            if let Some(area) = &station.area {
                let group = groups.entry(area.clone()).or_insert_with(|| StationGroup {
                    id: area.clone(),
                    name: area.to_string(),
                    stations: Vec::new(),
                });
                if !group.stations.contains(&station.id) {
                    group.stations.push(station.id.clone());
                }
            }
        }

        let routes: BTreeMap<RouteId, Route> = network
            .routes
            .into_iter()
            .map(|route| (route.id.clone(), route))
            .collect();

        let mut services = BTreeMap::new();
        for service in network.services {
            if !routes.contains_key(&service.route) {
                return Err(DataError::UnknownRoute {
                    referenced_by: format!("service {}", service.id),
                    route: service.route.clone(),
                });
            }
            services.insert(service.id.clone(), service);
        }

        let mut trips = BTreeMap::new();
        for trip in network.trips {
            if !services.contains_key(trip.service()) {
                return Err(DataError::UnknownService {
                    trip: trip.id().clone(),
                    service: trip.service().clone(),
                });
            }
            if !routes.contains_key(trip.route()) {
                return Err(DataError::UnknownRoute {
                    referenced_by: format!("trip {}", trip.id()),
                    route: trip.route().clone(),
                });
            }
            for call in trip.calls() {
                station_known(&call.station, format!("trip {}", trip.id()))?;
            }
            trips.insert(trip.id().clone(), trip);
        }

        let mut walks = WalkLinks::new();
        for entry in network.walks {
            station_known(&entry.from, format!("walk from {}", entry.from))?;
            station_known(&entry.to, format!("walk to {}", entry.to))?;
            let kind = match (stations.get(&entry.from), stations.get(&entry.to)) {
                (Some(from), Some(to)) if from.mode != to.mode => WalkKind::Neighbour,
                _ => WalkKind::Walk,
            };
            walks.add(entry.from, entry.to, entry.minutes, kind);
        }

        info!(
            stations = stations.len(),
            routes = routes.len(),
            services = services.len(),
            trips = trips.len(),
            walks = walks.len(),
            "Loaded transport data"
        );

        Ok(Self {
            stations,
            groups,
            routes,
            services,
            trips,
            walks,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, DataError> {
        Self::new(NetworkFile::from_json(json)?)
    }
}

impl TransportData for TransportDataContainer {
    fn station(&self, id: &StationId) -> Option<&Station> {
        self.stations.get(id)
    }

    fn route(&self, id: &RouteId) -> Option<&Route> {
        self.routes.get(id)
    }

    fn service(&self, id: &ServiceId) -> Option<&Service> {
        self.services.get(id)
    }

    fn trip(&self, id: &TripId) -> Option<&Trip> {
        self.trips.get(id)
    }

    fn group(&self, id: &AreaId) -> Option<&StationGroup> {
        self.groups.get(id)
    }

    fn stations(&self) -> Box<dyn Iterator<Item = &Station> + '_> {
        Box::new(self.stations.values())
    }

    fn routes(&self) -> Box<dyn Iterator<Item = &Route> + '_> {
        Box::new(self.routes.values())
    }

    fn services(&self) -> Box<dyn Iterator<Item = &Service> + '_> {
        Box::new(self.services.values())
    }

    fn trips(&self) -> Box<dyn Iterator<Item = &Trip> + '_> {
        Box::new(self.trips.values())
    }

    fn groups(&self) -> Box<dyn Iterator<Item = &StationGroup> + '_> {
        Box::new(self.groups.values())
    }

    fn walks(&self) -> &WalkLinks {
        &self.walks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const NETWORK: &str = r#"{
        "stations": [
            {"id": "A", "name": "Alpha", "mode": "Tram", "area": "CENTRE"},
            {"id": "B", "name": "Beta", "mode": "Tram"},
            {"id": "C", "name": "Gamma", "mode": "Bus", "area": "CENTRE"}
        ],
        "routes": [{"id": "R1", "name": "Red", "mode": "Tram"}],
        "services": [{"id": "S1", "route": "R1", "calendar": {
            "start": "2024-06-01", "end": "2024-06-30", "days": ["Mon", "Tue"]}}],
        "trips": [{"id": "T1", "service": "S1", "route": "R1", "calls": [
            {"station": "A", "arrival": "10:00", "departure": "10:00"},
            {"station": "B", "arrival": "10:05", "departure": "10:05"}]}],
        "walks": [{"from": "B", "to": "C", "minutes": 4}],
        "closures": [{"station": "B", "begin": "2024-06-04", "end": "2024-06-04"}]
    }"#;

    #[test]
    fn loads_and_indexes_network() {
        let data = TransportDataContainer::from_json(NETWORK).unwrap();

        assert_eq!(data.stations().count(), 3);
        assert_eq!(data.station_name(&StationId::new("A")), "Alpha");
        assert_eq!(data.station_name(&StationId::new("Z")), "Z");
        assert!(data.trip(&TripId::new("T1")).is_some());

        let centre = data.group(&AreaId::new("CENTRE")).unwrap();
        assert_eq!(centre.stations.len(), 2);

        assert_eq!(data.walks().len(), 1);
        assert_eq!(
            data.walks().walkable_from(&StationId::new("B"))[0].kind,
            WalkKind::Neighbour
        );
    }

    #[test]
    fn calendars_answer_date_queries() {
        let data = TransportDataContainer::from_json(NETWORK).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();

        assert!(data.service_runs_on(&ServiceId::new("S1"), monday));
        assert!(!data.service_runs_on(&ServiceId::new("S1"), sunday));
        assert!(!data.service_runs_on(&ServiceId::new("NOPE"), monday));
        assert!(data.route_runs_on(&RouteId::new("R1"), monday));
        assert!(!data.route_runs_on(&RouteId::new("R1"), sunday));
    }

    #[test]
    fn closures_are_left_in_the_file() {
        let network = NetworkFile::from_json(NETWORK).unwrap();
        assert_eq!(network.closures.len(), 1);
    }

    #[test]
    fn unknown_station_in_trip_is_rejected() {
        let json = r#"{
            "stations": [{"id": "A", "name": "Alpha", "mode": "Tram"}],
            "routes": [{"id": "R1", "name": "Red", "mode": "Tram"}],
            "services": [{"id": "S1", "route": "R1", "calendar": {
                "start": "2024-06-01", "end": "2024-06-30", "days": ["Mon"]}}],
            "trips": [{"id": "T1", "service": "S1", "route": "R1", "calls": [
                {"station": "A", "arrival": "10:00", "departure": "10:00"},
                {"station": "Q", "arrival": "10:05", "departure": "10:05"}]}]
        }"#;
        let err = TransportDataContainer::from_json(json).unwrap_err();
        assert!(matches!(err, DataError::UnknownStation { .. }));
        assert_eq!(err.to_string(), "trip T1 refers to unknown station Q");
    }

    #[test]
    fn unknown_service_is_rejected() {
        let json = r#"{
            "stations": [{"id": "A", "name": "Alpha", "mode": "Tram"},
                         {"id": "B", "name": "Beta", "mode": "Tram"}],
            "routes": [{"id": "R1", "name": "Red", "mode": "Tram"}],
            "trips": [{"id": "T1", "service": "S9", "route": "R1", "calls": [
                {"station": "A", "arrival": "10:00", "departure": "10:00"},
                {"station": "B", "arrival": "10:05", "departure": "10:05"}]}]
        }"#;
        assert!(matches!(
            TransportDataContainer::from_json(json),
            Err(DataError::UnknownService { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            TransportDataContainer::from_json("{not json"),
            Err(DataError::Parse(_))
        ));
    }
}
