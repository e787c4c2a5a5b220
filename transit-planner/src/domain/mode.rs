//! Transport modes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// How a passenger is moving during one part of a journey.
///
/// `NotSet` is the mode before anything has been boarded. `Unknown` marks a
/// vehicle whose mode could not be determined from the graph; it must never
/// reach the statistics step of a search.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum TransportMode {
    Tram,
    Bus,
    Train,
    Walk,
    NotSet,
    Unknown,
}

impl TransportMode {
    /// True for modes that run to a timetable.
    pub fn is_vehicle(&self) -> bool {
        matches!(self, Self::Tram | Self::Bus | Self::Train)
    }
}
