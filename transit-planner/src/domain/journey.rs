//! Journey types.
//!
//! A `Journey` represents a complete trip from origin to destination,
//! made of vehicle stages (tram, bus, train) and walks between stations.

use chrono::Duration;

use super::{DomainError, RouteId, StationId, TramTime, TransportMode, TripId};

/// A ride on one vehicle from boarding to alighting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VehicleStage {
    mode: TransportMode,
    route: RouteId,
    trip: TripId,
    board_station: StationId,
    board_platform: Option<String>,
    alight_station: StationId,
    departure: TramTime,
    arrival: TramTime,
    passed_stops: usize,
}

impl VehicleStage {
    /// Construct a stage, validating that it travels forward in time.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the arrival is before the departure or the mode is
    /// not a vehicle.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mode: TransportMode,
        route: RouteId,
        trip: TripId,
        board_station: StationId,
        board_platform: Option<String>,
        alight_station: StationId,
        departure: TramTime,
        arrival: TramTime,
        passed_stops: usize,
    ) -> Result<Self, DomainError> {
        if arrival < departure {
            return Err(DomainError::InvalidStage("arrival before departure"));
        }
        if !mode.is_vehicle() {
            return Err(DomainError::InvalidStage("vehicle stage needs a vehicle mode"));
        }
        Ok(Self {
            mode,
            route,
            trip,
            board_station,
            board_platform,
            alight_station,
            departure,
            arrival,
            passed_stops,
        })
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    pub fn route(&self) -> &RouteId {
        &self.route
    }

    pub fn trip(&self) -> &TripId {
        &self.trip
    }

    pub fn board_station(&self) -> &StationId {
        &self.board_station
    }

    /// Platform boarded from, if the timetable names one.
    pub fn board_platform(&self) -> Option<&str> {
        self.board_platform.as_deref()
    }

    pub fn alight_station(&self) -> &StationId {
        &self.alight_station
    }

    pub fn departure_time(&self) -> TramTime {
        self.departure
    }

    pub fn arrival_time(&self) -> TramTime {
        self.arrival
    }

    /// Number of stops travelled, counting the alighting stop.
    pub fn passed_stops(&self) -> usize {
        self.passed_stops
    }
}

/// A walk between nearby stations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalkingStage {
    pub from: StationId,
    pub to: StationId,
    pub departure: TramTime,
    pub duration: Duration,
}

impl WalkingStage {
    pub fn new(from: StationId, to: StationId, departure: TramTime, duration: Duration) -> Self {
        Self {
            from,
            to,
            departure,
            duration,
        }
    }

    pub fn arrival_time(&self) -> TramTime {
        self.departure + self.duration
    }
}

/// A stage of a journey: either a vehicle ride or a walk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransportStage {
    Vehicle(VehicleStage),
    Walk(WalkingStage),
}

impl TransportStage {
    /// Returns the origin station of this stage.
    pub fn origin(&self) -> &StationId {
        match self {
            TransportStage::Vehicle(stage) => stage.board_station(),
            TransportStage::Walk(walk) => &walk.from,
        }
    }

    /// Returns the destination station of this stage.
    pub fn destination(&self) -> &StationId {
        match self {
            TransportStage::Vehicle(stage) => stage.alight_station(),
            TransportStage::Walk(walk) => &walk.to,
        }
    }

    pub fn departure_time(&self) -> TramTime {
        match self {
            TransportStage::Vehicle(stage) => stage.departure_time(),
            TransportStage::Walk(walk) => walk.departure,
        }
    }

    pub fn arrival_time(&self) -> TramTime {
        match self {
            TransportStage::Vehicle(stage) => stage.arrival_time(),
            TransportStage::Walk(walk) => walk.arrival_time(),
        }
    }

    pub fn mode(&self) -> TransportMode {
        match self {
            TransportStage::Vehicle(stage) => stage.mode(),
            TransportStage::Walk(_) => TransportMode::Walk,
        }
    }

    /// Returns the vehicle stage if this is one.
    pub fn as_vehicle(&self) -> Option<&VehicleStage> {
        match self {
            TransportStage::Vehicle(stage) => Some(stage),
            TransportStage::Walk(_) => None,
        }
    }

    /// Returns the walk if this is a walking stage.
    pub fn as_walk(&self) -> Option<&WalkingStage> {
        match self {
            TransportStage::Vehicle(_) => None,
            TransportStage::Walk(walk) => Some(walk),
        }
    }
}

/// A complete journey from origin to destination.
///
/// # Invariants
///
/// - At least one stage
/// - Consecutive stages connect (destination of one = origin of next)
#[derive(Debug, Clone)]
pub struct Journey {
    stages: Vec<TransportStage>,
    query_time: TramTime,
}

impl Journey {
    /// Constructs a journey from stages, for a search made at `query_time`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the stage list is empty or stages don't connect.
    pub fn new(stages: Vec<TransportStage>, query_time: TramTime) -> Result<Self, DomainError> {
        if stages.is_empty() {
            return Err(DomainError::EmptyJourney);
        }

        for window in stages.windows(2) {
            let prev_dest = window[0].destination();
            let next_origin = window[1].origin();
            if prev_dest != next_origin {
                return Err(DomainError::StationsNotConnected(
                    prev_dest.clone(),
                    next_origin.clone(),
                ));
            }
        }

        Ok(Journey { stages, query_time })
    }

    /// Returns all stages in order.
    pub fn stages(&self) -> &[TransportStage] {
        &self.stages
    }

    /// Query time of the path request that found this journey.
    pub fn query_time(&self) -> TramTime {
        self.query_time
    }

    /// Returns all vehicle stages in order.
    pub fn vehicle_stages(&self) -> impl Iterator<Item = &VehicleStage> {
        self.stages.iter().filter_map(|s| s.as_vehicle())
    }

    /// Returns all walks in order.
    pub fn walks(&self) -> impl Iterator<Item = &WalkingStage> {
        self.stages.iter().filter_map(|s| s.as_walk())
    }

    /// Returns the number of changes (vehicles boarded - 1, or 0 for direct).
    pub fn change_count(&self) -> usize {
        self.vehicle_stages().count().saturating_sub(1)
    }

    pub fn is_direct(&self) -> bool {
        self.vehicle_stages().count() == 1
    }

    /// Returns the origin station.
    pub fn origin(&self) -> &StationId {
        // Safe: validated non-empty at construction
        self.stages[0].origin()
    }

    /// Returns the destination station.
    pub fn destination(&self) -> &StationId {
        // Safe: validated non-empty at construction
        self.stages[self.stages.len() - 1].destination()
    }

    pub fn departure_time(&self) -> TramTime {
        self.stages[0].departure_time()
    }

    pub fn arrival_time(&self) -> TramTime {
        self.stages[self.stages.len() - 1].arrival_time()
    }

    /// Time from first departure to final arrival.
    pub fn total_duration(&self) -> Duration {
        self.arrival_time()
            .signed_duration_since(self.departure_time())
    }

    /// Distinct modes used, in the order first used.
    pub fn transport_modes(&self) -> Vec<TransportMode> {
        let mut modes = Vec::new();
        for stage in &self.stages {
            let mode = stage.mode();
            if !modes.contains(&mode) {
                modes.push(mode);
            }
        }
        modes
    }

    /// Stations and platforms where a vehicle was boarded from a named platform.
    pub fn call_at_platforms(&self) -> Vec<(&StationId, &str)> {
        self.vehicle_stages()
            .filter_map(|stage| {
                stage
                    .board_platform()
                    .map(|platform| (stage.board_station(), platform))
            })
            .collect()
    }
}
