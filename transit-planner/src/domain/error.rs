//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from graph and search errors.

use super::StationId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// A calendar whose date range is empty or inverted
    #[error("invalid calendar: {0}")]
    InvalidCalendar(&'static str),

    /// A trip that cannot be used as a timetable entry
    #[error("invalid trip {trip}: {reason}")]
    InvalidTrip { trip: String, reason: &'static str },

    /// Invalid stage construction (e.g., arrival before departure)
    #[error("invalid stage: {0}")]
    InvalidStage(&'static str),

    /// Consecutive stages don't meet at the same station
    #[error("stations {0} and {1} are not connected")]
    StationsNotConnected(StationId, StationId),

    /// Journey has no stages
    #[error("journey must have at least one stage")]
    EmptyJourney,
}
