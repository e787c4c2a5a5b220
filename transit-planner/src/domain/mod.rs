//! Domain types for the journey planner.
//!
//! This module contains the core domain model types that represent
//! validated timetable data. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod calendar;
mod error;
mod ids;
mod journey;
mod mode;
mod service;
mod station;
mod time;

pub use calendar::ServiceCalendar;
pub use error::DomainError;
pub use ids::{AreaId, RouteId, ServiceId, StationId, TripId};
pub use journey::{Journey, TransportStage, VehicleStage, WalkingStage};
pub use mode::TransportMode;
pub use service::{Route, Service, StopCall, Trip};
pub use station::{Location, Station, StationGroup};
pub use time::{TimeError, TramTime};
