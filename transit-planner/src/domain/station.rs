//! Stations, station groups and query locations.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AreaId, StationId, TransportMode};

/// A place where vehicles call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub mode: TransportMode,
    /// Area this station belongs to, if grouped.
    #[serde(default)]
    pub area: Option<AreaId>,
}

impl Station {
    pub fn new(id: impl Into<StationId>, name: impl Into<String>, mode: TransportMode) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mode,
            area: None,
        }
    }

    /// Place this station in an area.
    pub fn in_area(mut self, area: impl Into<AreaId>) -> Self {
        self.area = Some(area.into());
        self
    }
}

/// A named set of nearby stations that can be used as one origin or destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationGroup {
    pub id: AreaId,
    pub name: String,
    pub stations: Vec<StationId>,
}

/// Origin or destination of a journey request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Station(StationId),
    Group(AreaId),
}

impl Location {
    /// Parse a command-line location: `group:<id>` or a plain station id.
    ///
    /// ```
    /// use transit_planner::domain::Location;
    ///
    /// assert!(matches!(Location::parse("ALT"), Location::Station(_)));
    /// assert!(matches!(Location::parse("group:PIC"), Location::Group(_)));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix("group:") {
            Some(area) => Location::Group(AreaId::new(area)),
            None => Location::Station(StationId::new(s)),
        }
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Location::parse(value)
    }
}

impl From<StationId> for Location {
    fn from(value: StationId) -> Self {
        Location::Station(value)
    }
}

impl From<AreaId> for Location {
    fn from(value: AreaId) -> Self {
        Location::Group(value)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Station(id) => write!(f, "{id}"),
            Location::Group(id) => write!(f, "group:{id}"),
        }
    }
}
