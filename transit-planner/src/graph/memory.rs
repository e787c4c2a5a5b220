//! In-memory graph store backed by `petgraph`.
//!
//! Read transactions hold a shared lock for their lifetime, so every read
//! within one transaction sees the same graph. Open transactions are counted
//! so callers can check that searches release what they acquire.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard};

use chrono::Duration;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::domain::{AreaId, StationId, TripId};

use super::{
    Direction, GraphDatabase, GraphError, GraphNode, GraphRelationship, GraphTransaction,
    NodeId, NodeLabels, NodeProperties, RelationshipId, RelationshipType,
};

#[derive(Debug, Clone)]
struct NodeData {
    labels: NodeLabels,
    props: NodeProperties,
}

#[derive(Debug, Clone)]
struct EdgeData {
    kind: RelationshipType,
    cost: Duration,
    trip: Option<TripId>,
    platform: Option<String>,
}

/// Graph contents, mutable only while being built.
#[derive(Debug, Default)]
pub struct GraphData {
    graph: DiGraph<NodeData, EdgeData>,
    stations: HashMap<StationId, NodeIndex>,
    groups: HashMap<AreaId, NodeIndex>,
}

impl GraphData {
    pub fn add_node(&mut self, labels: NodeLabels, props: NodeProperties) -> NodeId {
        let index = self.graph.add_node(NodeData { labels, props });
        NodeId(index.index() as u64)
    }

    pub fn add_relationship(
        &mut self,
        start: NodeId,
        end: NodeId,
        kind: RelationshipType,
        cost: Duration,
        trip: Option<TripId>,
        platform: Option<String>,
    ) -> RelationshipId {
        let edge = self.graph.add_edge(
            node_index(start),
            node_index(end),
            EdgeData {
                kind,
                cost,
                trip,
                platform,
            },
        );
        RelationshipId(edge.index() as u64)
    }

    pub fn index_station(&mut self, station: StationId, node: NodeId) {
        self.stations.insert(station, node_index(node));
    }

    pub fn index_group(&mut self, area: AreaId, node: NodeId) {
        self.groups.insert(area, node_index(node));
    }

    pub fn station_node(&self, station: &StationId) -> Option<NodeId> {
        self.stations
            .get(station)
            .map(|index| NodeId(index.index() as u64))
    }

    fn read_node(&self, id: NodeId) -> Result<GraphNode, GraphError> {
        let data = self
            .graph
            .node_weight(node_index(id))
            .ok_or(GraphError::NodeNotFound(id))?;
        Ok(GraphNode {
            id,
            labels: data.labels,
            props: data.props.clone(),
        })
    }

    fn read_relationship(&self, id: RelationshipId) -> Result<GraphRelationship, GraphError> {
        let edge = EdgeIndex::new(id.0 as usize);
        let (start, end) = self
            .graph
            .edge_endpoints(edge)
            .ok_or(GraphError::RelationshipNotFound(id))?;
        let data = self
            .graph
            .edge_weight(edge)
            .ok_or(GraphError::RelationshipNotFound(id))?;
        Ok(to_relationship(id, start, end, data))
    }
}

fn node_index(id: NodeId) -> NodeIndex {
    NodeIndex::new(id.0 as usize)
}

fn to_relationship(
    id: RelationshipId,
    start: NodeIndex,
    end: NodeIndex,
    data: &EdgeData,
) -> GraphRelationship {
    GraphRelationship {
        id,
        kind: data.kind,
        start: NodeId(start.index() as u64),
        end: NodeId(end.index() as u64),
        cost: data.cost,
        trip: data.trip.clone(),
        platform: data.platform.clone(),
    }
}

/// A read-mostly graph store held in memory.
#[derive(Debug)]
pub struct MemoryGraph {
    data: RwLock<GraphData>,
    open: AtomicUsize,
}

impl MemoryGraph {
    pub fn new(data: GraphData) -> Self {
        Self {
            data: RwLock::new(data),
            open: AtomicUsize::new(0),
        }
    }

    /// Number of transactions currently open.
    pub fn open_transactions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn node_count(&self) -> Result<usize, GraphError> {
        Ok(self.data.read().map_err(|_| GraphError::Poisoned)?.graph.node_count())
    }

    pub fn relationship_count(&self) -> Result<usize, GraphError> {
        Ok(self.data.read().map_err(|_| GraphError::Poisoned)?.graph.edge_count())
    }
}

impl GraphDatabase for MemoryGraph {
    type Transaction<'a> = MemoryTransaction<'a>;

    fn begin_read(&self) -> Result<MemoryTransaction<'_>, GraphError> {
        let data = self.data.read().map_err(|_| GraphError::Poisoned)?;
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryTransaction {
            data,
            open: &self.open,
        })
    }
}

/// Read transaction on a [`MemoryGraph`].
pub struct MemoryTransaction<'a> {
    data: RwLockReadGuard<'a, GraphData>,
    open: &'a AtomicUsize,
}

impl GraphTransaction for MemoryTransaction<'_> {
    fn node(&self, id: NodeId) -> Result<GraphNode, GraphError> {
        self.data.read_node(id)
    }

    fn relationship(&self, id: RelationshipId) -> Result<GraphRelationship, GraphError> {
        self.data.read_relationship(id)
    }

    fn relationships(
        &self,
        node: NodeId,
        direction: Direction,
    ) -> Result<Vec<GraphRelationship>, GraphError> {
        let index = node_index(node);
        if self.data.graph.node_weight(index).is_none() {
            return Err(GraphError::NodeNotFound(node));
        }
        let direction = match direction {
            Direction::Outgoing => petgraph::Direction::Outgoing,
            Direction::Incoming => petgraph::Direction::Incoming,
        };
        Ok(self
            .data
            .graph
            .edges_directed(index, direction)
            .map(|edge| {
                to_relationship(
                    RelationshipId(edge.id().index() as u64),
                    edge.source(),
                    edge.target(),
                    edge.weight(),
                )
            })
            .collect())
    }

    fn find_station(&self, station: &StationId) -> Result<Option<NodeId>, GraphError> {
        Ok(self.data.station_node(station))
    }

    fn find_group(&self, area: &AreaId) -> Result<Option<NodeId>, GraphError> {
        Ok(self
            .data
            .groups
            .get(area)
            .map(|index| NodeId(index.index() as u64)))
    }

    fn commit(self) -> Result<(), GraphError> {
        Ok(())
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}
