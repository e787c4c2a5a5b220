//! Transport graph interfaces.
//!
//! The planner searches a time-expanded graph: stations connect to
//! route-stations, which connect through service, hour and minute nodes to
//! the next route-station of a trip. The store itself is a collaborator; this
//! module defines what the planner needs from it and provides an in-memory
//! implementation plus a builder that lays a timetable out as such a graph.

mod builder;
mod memory;

use std::fmt;

use chrono::Duration;
use strum::{Display, EnumIter, IntoStaticStr};

use crate::domain::{AreaId, RouteId, ServiceId, StationId, TramTime, TransportMode, TripId};

pub use builder::GraphBuilder;
pub use memory::{GraphData, MemoryGraph, MemoryTransaction};

/// Identifies a node within one graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a relationship within one graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipId(pub u64);

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Labels attached to graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum NodeLabel {
    Station,
    RouteStation,
    Interchange,
    Service,
    Hour,
    Minute,
    Grouped,
    Tram,
    Bus,
    Train,
}

impl NodeLabel {
    /// Label carried by stations and route-stations of the given mode.
    pub fn for_mode(mode: TransportMode) -> Option<NodeLabel> {
        match mode {
            TransportMode::Tram => Some(NodeLabel::Tram),
            TransportMode::Bus => Some(NodeLabel::Bus),
            TransportMode::Train => Some(NodeLabel::Train),
            _ => None,
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Set of labels on one node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeLabels(u16);

impl NodeLabels {
    pub fn of(labels: &[NodeLabel]) -> Self {
        let mut set = Self::default();
        for label in labels {
            set.insert(*label);
        }
        set
    }

    pub fn insert(&mut self, label: NodeLabel) {
        self.0 |= label.bit();
    }

    pub fn contains(&self, label: NodeLabel) -> bool {
        self.0 & label.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeLabel> + '_ {
        use strum::IntoEnumIterator;
        NodeLabel::iter().filter(|label| self.contains(*label))
    }
}

impl fmt::Debug for NodeLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Types of relationship between graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum RelationshipType {
    Board,
    InterchangeBoard,
    Depart,
    InterchangeDepart,
    ToService,
    ToHour,
    ToMinute,
    TramGoesTo,
    BusGoesTo,
    TrainGoesTo,
    WalksTo,
    Neighbour,
    GroupedToChild,
    GroupedToParent,
}

impl RelationshipType {
    /// The vehicle relationship for a mode.
    pub fn goes_to(mode: TransportMode) -> Option<RelationshipType> {
        match mode {
            TransportMode::Tram => Some(RelationshipType::TramGoesTo),
            TransportMode::Bus => Some(RelationshipType::BusGoesTo),
            TransportMode::Train => Some(RelationshipType::TrainGoesTo),
            _ => None,
        }
    }

    /// Mode travelled along this relationship, if it moves a passenger.
    pub fn mode(&self) -> Option<TransportMode> {
        match self {
            RelationshipType::TramGoesTo => Some(TransportMode::Tram),
            RelationshipType::BusGoesTo => Some(TransportMode::Bus),
            RelationshipType::TrainGoesTo => Some(TransportMode::Train),
            RelationshipType::WalksTo | RelationshipType::Neighbour => Some(TransportMode::Walk),
            _ => None,
        }
    }

    pub fn is_goes_to(&self) -> bool {
        matches!(
            self,
            RelationshipType::TramGoesTo | RelationshipType::BusGoesTo | RelationshipType::TrainGoesTo
        )
    }

    pub fn is_boarding(&self) -> bool {
        matches!(self, RelationshipType::Board | RelationshipType::InterchangeBoard)
    }

    pub fn is_departing(&self) -> bool {
        matches!(self, RelationshipType::Depart | RelationshipType::InterchangeDepart)
    }

    pub fn is_walk(&self) -> bool {
        matches!(self, RelationshipType::WalksTo | RelationshipType::Neighbour)
    }
}

/// Typed properties a node may carry. Which are present depends on labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeProperties {
    pub station: Option<StationId>,
    pub route: Option<RouteId>,
    pub service: Option<ServiceId>,
    pub trip: Option<TripId>,
    pub area: Option<AreaId>,
    pub mode: Option<TransportMode>,
    /// Departure time on minute nodes, last departure on service nodes.
    pub time: Option<TramTime>,
    pub hour: Option<u32>,
}

/// A node as read within a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: NodeId,
    pub labels: NodeLabels,
    pub props: NodeProperties,
}

impl GraphNode {
    pub fn has_label(&self, label: NodeLabel) -> bool {
        self.labels.contains(label)
    }
}

/// A relationship as read within a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRelationship {
    pub id: RelationshipId,
    pub kind: RelationshipType,
    pub start: NodeId,
    pub end: NodeId,
    pub cost: Duration,
    pub trip: Option<TripId>,
    pub platform: Option<String>,
}

/// Direction of relationships relative to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Errors from a graph store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("relationship {0} not found")]
    RelationshipNotFound(RelationshipId),

    #[error("graph store lock poisoned")]
    Poisoned,

    #[error("graph construction failed: {0}")]
    Build(String),
}

/// A read transaction on the graph.
///
/// Dropping the transaction releases it; `commit` makes the release explicit.
pub trait GraphTransaction {
    fn node(&self, id: NodeId) -> Result<GraphNode, GraphError>;

    fn relationship(&self, id: RelationshipId) -> Result<GraphRelationship, GraphError>;

    fn relationships(
        &self,
        node: NodeId,
        direction: Direction,
    ) -> Result<Vec<GraphRelationship>, GraphError>;

    /// Station node for a station id, if the station is in the graph.
    fn find_station(&self, station: &StationId) -> Result<Option<NodeId>, GraphError>;

    /// Group node for an area id, if the area is in the graph.
    fn find_group(&self, area: &AreaId) -> Result<Option<NodeId>, GraphError>;

    fn commit(self) -> Result<(), GraphError>
    where
        Self: Sized;
}

/// A graph store that hands out read transactions.
pub trait GraphDatabase: Send + Sync {
    type Transaction<'a>: GraphTransaction
    where
        Self: 'a;

    fn begin_read(&self) -> Result<Self::Transaction<'_>, GraphError>;
}
