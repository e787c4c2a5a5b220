//! Partial paths through the graph.
//!
//! Paths share their prefixes: each step holds an `Arc` to the step before
//! it, so branching the search costs one allocation per new step.

use std::sync::Arc;

use crate::diagnostics::HowIGotHere;
use crate::domain::{
    DomainError, Journey, RouteId, StationId, TramTime, TransportMode, TransportStage, TripId,
    VehicleStage, WalkingStage,
};
use crate::graph::{GraphNode, GraphRelationship, NodeId, RelationshipType};

use super::JourneyState;

/// One step of a path and everything before it.
#[derive(Debug)]
pub struct TraversalPath {
    node: GraphNode,
    via: Option<GraphRelationship>,
    state: JourneyState,
    parent: Option<Arc<TraversalPath>>,
    start: NodeId,
    length: usize,
    revisit: bool,
}

impl TraversalPath {
    pub fn start(node: GraphNode, state: JourneyState) -> Arc<Self> {
        Arc::new(Self {
            start: node.id,
            node,
            via: None,
            state,
            parent: None,
            length: 0,
            revisit: false,
        })
    }

    /// Extend `parent` by following `via` to `node`.
    pub fn extend(
        parent: &Arc<TraversalPath>,
        via: GraphRelationship,
        node: GraphNode,
        state: JourneyState,
    ) -> Arc<Self> {
        let revisit = parent.steps_back().any(|step| step.node.id == node.id);
        Arc::new(Self {
            start: parent.start,
            node,
            via: Some(via),
            state,
            parent: Some(Arc::clone(parent)),
            length: parent.length + 1,
            revisit,
        })
    }

    pub fn node(&self) -> &GraphNode {
        &self.node
    }

    pub fn state(&self) -> &JourneyState {
        &self.state
    }

    /// State at the previous step, or at this one for the first step.
    pub fn previous_state(&self) -> &JourneyState {
        self.parent.as_ref().map_or(&self.state, |parent| &parent.state)
    }

    pub fn start_node(&self) -> NodeId {
        self.start
    }

    /// Number of relationships followed.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn provenance(&self) -> HowIGotHere {
        match (&self.via, &self.parent) {
            (Some(rel), Some(parent)) => HowIGotHere::new(
                self.node.id,
                rel.id,
                parent.node.id,
                self.state.state_type(),
                self.revisit,
            ),
            _ => HowIGotHere::start(self.node.id, self.state.state_type()),
        }
    }

    /// This step, then each earlier one back to the start.
    fn steps_back(&self) -> impl Iterator<Item = &TraversalPath> {
        std::iter::successors(Some(self), |step| step.parent.as_deref())
    }

    /// Steps from the start to this one.
    pub fn steps(&self) -> Vec<&TraversalPath> {
        let mut steps: Vec<&TraversalPath> = self.steps_back().collect();
        steps.reverse();
        steps
    }

    /// Turn a finished path into a journey.
    ///
    /// Returns `None` for a path with no stages, such as one that only
    /// steps between a group and its stations.
    pub fn to_journey(&self, query_time: TramTime) -> Result<Option<Journey>, DomainError> {
        let mut stages = Vec::new();
        let mut station: Option<StationId> = None;
        let mut platform: Option<String> = None;
        let mut ride: Option<Ride> = None;
        let mut time = query_time;

        for step in self.steps() {
            let props = &step.node.props;
            let Some(rel) = step.via.as_ref() else {
                station = props.station.clone();
                continue;
            };
            match rel.kind {
                RelationshipType::Board | RelationshipType::InterchangeBoard => {
                    platform = rel.platform.clone();
                }
                RelationshipType::ToMinute if ride.is_none() => {
                    let board = station
                        .clone()
                        .ok_or(DomainError::InvalidStage("boarding away from a station"))?;
                    ride = Some(Ride {
                        mode: props.mode.unwrap_or(TransportMode::Unknown),
                        route: step.state.route().cloned().ok_or(MISSING)?,
                        trip: props.trip.clone().ok_or(MISSING)?,
                        board,
                        platform: platform.take(),
                        departure: props.time.ok_or(MISSING)?,
                        passed: 0,
                    });
                }
                kind if kind.is_goes_to() => {
                    if let Some(ride) = ride.as_mut() {
                        ride.passed += 1;
                    }
                }
                kind if kind.is_departing() => {
                    let ride = ride.take().ok_or(MISSING)?;
                    let alight = props.station.clone().ok_or(MISSING)?;
                    stages.push(TransportStage::Vehicle(VehicleStage::new(
                        ride.mode,
                        ride.route,
                        ride.trip,
                        ride.board,
                        ride.platform,
                        alight.clone(),
                        ride.departure,
                        step.state.time(),
                        ride.passed,
                    )?));
                    station = Some(alight);
                }
                kind if kind.is_walk() => {
                    let from = station.clone().ok_or(MISSING)?;
                    let to = props.station.clone().ok_or(MISSING)?;
                    stages.push(TransportStage::Walk(WalkingStage::new(
                        from,
                        to.clone(),
                        time,
                        rel.cost,
                    )));
                    station = Some(to);
                }
                RelationshipType::GroupedToChild => {
                    station = props.station.clone();
                }
                _ => {}
            }
            time = step.state.time();
        }

        if stages.is_empty() {
            return Ok(None);
        }
        Journey::new(stages, query_time).map(Some)
    }
}

const MISSING: DomainError = DomainError::InvalidStage("path is missing timetable details");

/// A vehicle stage being assembled.
struct Ride {
    mode: TransportMode,
    route: RouteId,
    trip: TripId,
    board: StationId,
    platform: Option<String>,
    departure: TramTime,
    passed: usize,
}
