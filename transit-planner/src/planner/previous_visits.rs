//! Negative verdicts remembered within one path request.

use std::collections::HashMap;

use crate::diagnostics::{HeuristicsReason, ReasonCode};
use crate::domain::TramTime;
use crate::graph::NodeId;

/// What a node-intrinsic verdict depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisitKey {
    pub node: NodeId,
    pub time: TramTime,
    pub boardings: u32,
    pub on_trip: bool,
}

/// Verdicts that repeat for any path arriving with the same [`VisitKey`].
///
/// Only codes with a cached counterpart are kept; anything else depends on
/// more than the key and must be worked out afresh.
#[derive(Debug, Default)]
pub struct PreviousVisits {
    verdicts: HashMap<VisitKey, ReasonCode>,
    hits: u64,
}

impl PreviousVisits {
    pub fn new() -> Self {
        Self::default()
    }

    /// The remembered code for `key`, counting the hit.
    pub fn get(&mut self, key: &VisitKey) -> Option<ReasonCode> {
        let code = self.verdicts.get(key).copied();
        if code.is_some() {
            self.hits += 1;
        }
        code
    }

    /// Remember `reason` if it is a negative verdict that can be cached.
    pub fn record(&mut self, key: VisitKey, reason: &HeuristicsReason) {
        let code = reason.code();
        if code.cached_counterpart().is_some() {
            self.verdicts.insert(key, code);
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }
}
