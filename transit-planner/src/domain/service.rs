//! Timetable entities: routes, services and trips.
//!
//! A `Route` is a line served by one mode. A `Service` attaches a calendar to
//! a route. A `Trip` is one vehicle run of a service, calling at stations in
//! order.

use serde::{Deserialize, Serialize};

use super::{DomainError, RouteId, ServiceCalendar, ServiceId, StationId, TramTime, TransportMode, TripId};

/// A line served by a single transport mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub mode: TransportMode,
}

impl Route {
    pub fn new(id: impl Into<RouteId>, name: impl Into<String>, mode: TransportMode) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mode,
        }
    }
}

/// A set of trips sharing an operating calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub route: RouteId,
    pub calendar: ServiceCalendar,
}

/// One stop of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopCall {
    pub station: StationId,
    #[serde(default)]
    pub platform: Option<String>,
    pub arrival: TramTime,
    pub departure: TramTime,
}

impl StopCall {
    /// A stop where arrival and departure coincide.
    pub fn at(station: impl Into<StationId>, time: TramTime) -> Self {
        Self {
            station: station.into(),
            platform: None,
            arrival: time,
            departure: time,
        }
    }

    /// Set the platform used at this stop.
    pub fn on_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

/// A single vehicle run.
///
/// # Invariants
///
/// - At least two stops
/// - Each stop departs no earlier than it arrives
/// - Each stop arrives no earlier than the previous stop departs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTrip")]
pub struct Trip {
    id: TripId,
    service: ServiceId,
    route: RouteId,
    calls: Vec<StopCall>,
}

impl Trip {
    /// Construct a trip, validating the calling pattern.
    pub fn new(
        id: impl Into<TripId>,
        service: impl Into<ServiceId>,
        route: impl Into<RouteId>,
        calls: Vec<StopCall>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        let invalid = |reason| DomainError::InvalidTrip {
            trip: id.to_string(),
            reason,
        };

        if calls.len() < 2 {
            return Err(invalid("fewer than two stops"));
        }
        for call in &calls {
            if call.departure < call.arrival {
                return Err(invalid("departs before it arrives"));
            }
        }
        for pair in calls.windows(2) {
            if pair[1].arrival < pair[0].departure {
                return Err(invalid("arrives before previous departure"));
            }
        }

        Ok(Self {
            id,
            service: service.into(),
            route: route.into(),
            calls,
        })
    }

    pub fn id(&self) -> &TripId {
        &self.id
    }

    pub fn service(&self) -> &ServiceId {
        &self.service
    }

    pub fn route(&self) -> &RouteId {
        &self.route
    }

    /// Stops in calling order.
    pub fn calls(&self) -> &[StopCall] {
        &self.calls
    }

    /// Departure time from the first stop.
    pub fn departs(&self) -> TramTime {
        // Safe: at least two calls, validated at construction
        self.calls[0].departure
    }
}

/// Unvalidated trip as it appears in a network file.
#[derive(Deserialize)]
struct RawTrip {
    id: TripId,
    service: ServiceId,
    route: RouteId,
    calls: Vec<StopCall>,
}

impl TryFrom<RawTrip> for Trip {
    type Error = DomainError;

    fn try_from(raw: RawTrip) -> Result<Self, Self::Error> {
        Trip::new(raw.id, raw.service, raw.route, raw.calls)
    }
}
