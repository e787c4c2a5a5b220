//! Repositories the planner consults while searching.
//!
//! Each collaborator is a trait so the search engine never depends on how
//! timetable data is stored. Reference in-memory implementations live in the
//! submodules.

mod clock;
mod closed;
mod container;
mod interchanges;
mod walking;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{
    AreaId, DomainError, Route, RouteId, Service, ServiceId, Station, StationGroup, StationId,
    Trip, TripId,
};

pub use clock::{FixedNow, ProvidesLocalNow};
pub use closed::{ClosedStationsRepository, Closure};
pub use container::{NetworkFile, TransportDataContainer, WalkEntry};
pub use interchanges::RouteInterchangeCosts;
pub use walking::{WalkKind, WalkLink, WalkLinks};

/// Errors loading transport data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse network: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{referenced_by} refers to unknown station {station}")]
    UnknownStation {
        referenced_by: String,
        station: StationId,
    },

    #[error("{referenced_by} refers to unknown route {route}")]
    UnknownRoute {
        referenced_by: String,
        route: RouteId,
    },

    #[error("trip {trip} refers to unknown service {service}")]
    UnknownService { trip: TripId, service: ServiceId },
}

/// Stations, routes, services, trips and groups of one network.
pub trait TransportData: Send + Sync {
    fn station(&self, id: &StationId) -> Option<&Station>;

    fn route(&self, id: &RouteId) -> Option<&Route>;

    fn service(&self, id: &ServiceId) -> Option<&Service>;

    fn trip(&self, id: &TripId) -> Option<&Trip>;

    fn group(&self, id: &AreaId) -> Option<&StationGroup>;

    fn stations(&self) -> Box<dyn Iterator<Item = &Station> + '_>;

    fn routes(&self) -> Box<dyn Iterator<Item = &Route> + '_>;

    fn services(&self) -> Box<dyn Iterator<Item = &Service> + '_>;

    fn trips(&self) -> Box<dyn Iterator<Item = &Trip> + '_>;

    fn groups(&self) -> Box<dyn Iterator<Item = &StationGroup> + '_>;

    fn walks(&self) -> &WalkLinks;

    /// True if the service's calendar includes `date`.
    fn service_runs_on(&self, id: &ServiceId, date: NaiveDate) -> bool {
        self.service(id)
            .is_some_and(|service| service.calendar.operates_on(date))
    }

    /// True if any service of the route runs on `date`.
    fn route_runs_on(&self, id: &RouteId, date: NaiveDate) -> bool {
        self.services()
            .any(|service| &service.route == id && service.calendar.operates_on(date))
    }

    /// Display name for a station, falling back to its id.
    fn station_name(&self, id: &StationId) -> String {
        self.station(id)
            .map_or_else(|| id.to_string(), |station| station.name.clone())
    }
}

/// Stations closed on particular dates.
pub trait ClosedStations: Send + Sync {
    fn is_closed(&self, station: &StationId, date: NaiveDate) -> bool;
}

/// Lower bounds on changes needed to reach a destination.
pub trait InterchangeRepository: Send + Sync {
    /// Fewest changes needed after boarding `route` to reach one of
    /// `destinations`, or `None` if no sequence of routes gets there.
    fn min_changes_from_route(&self, route: &RouteId, destinations: &[StationId]) -> Option<u8>;

    /// Fewest vehicles to board from `station` to reach one of
    /// `destinations`. Zero when the station is a destination or a walk away
    /// from one.
    fn min_boardings_from_station(
        &self,
        station: &StationId,
        destinations: &[StationId],
    ) -> Option<u8>;
}

/// Source of the current local date and time.
pub trait ProvidesNow: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The collaborators a search needs, shared between journey requests.
#[derive(Clone)]
pub struct Repositories {
    pub data: Arc<dyn TransportData>,
    pub closed: Arc<dyn ClosedStations>,
    pub interchanges: Arc<dyn InterchangeRepository>,
    pub clock: Arc<dyn ProvidesNow>,
}

impl Repositories {
    /// Wire up the reference implementations over one network.
    pub fn new(data: TransportDataContainer, closed: ClosedStationsRepository) -> Self {
        let interchanges = RouteInterchangeCosts::new(&data);
        Self {
            data: Arc::new(data),
            closed: Arc::new(closed),
            interchanges: Arc::new(interchanges),
            clock: Arc::new(ProvidesLocalNow),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: impl ProvidesNow + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}
