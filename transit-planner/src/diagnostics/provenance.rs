//! Where a verdict was reached.

use crate::graph::{NodeId, RelationshipId};
use crate::planner::TraversalStateType;

/// The last step of a traversal path.
///
/// Recorded with every verdict so diagnostics can place it in the graph.
/// Whether the path revisits its end node is worked out once, when the value
/// is taken from the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HowIGotHere {
    end_node: NodeId,
    relationship: Option<RelationshipId>,
    previous_node: Option<NodeId>,
    state: TraversalStateType,
    revisit: bool,
}

impl HowIGotHere {
    pub fn new(
        end_node: NodeId,
        relationship: RelationshipId,
        previous_node: NodeId,
        state: TraversalStateType,
        revisit: bool,
    ) -> Self {
        Self {
            end_node,
            relationship: Some(relationship),
            previous_node: Some(previous_node),
            state,
            revisit,
        }
    }

    /// The first node of a path.
    pub fn start(node: NodeId, state: TraversalStateType) -> Self {
        Self {
            end_node: node,
            relationship: None,
            previous_node: None,
            state,
            revisit: false,
        }
    }

    pub fn end_node(&self) -> NodeId {
        self.end_node
    }

    pub fn relationship(&self) -> Option<RelationshipId> {
        self.relationship
    }

    pub fn previous_node(&self) -> Option<NodeId> {
        self.previous_node
    }

    pub fn state(&self) -> TraversalStateType {
        self.state
    }

    pub fn is_at_start(&self) -> bool {
        self.relationship.is_none()
    }

    /// True if the end node already appears earlier in the path.
    pub fn revisits_node(&self) -> bool {
        self.revisit
    }

    pub fn state_name(&self) -> &'static str {
        self.state.into()
    }
}
