//! Walking links between nearby stations.
//!
//! Two stations close enough to walk between are linked in both directions.
//! A link between stations of the same mode is a plain walk; a link between
//! stations of different modes (a tram stop beside a bus stop) is a
//! neighbour link, counted separately during search.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::StationId;

/// Kind of walking link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalkKind {
    Walk,
    Neighbour,
}

/// A one-directional view of a walking link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkLink {
    pub to: StationId,
    pub duration: Duration,
    pub kind: WalkKind,
}

/// Symmetric walking links between stations.
#[derive(Debug, Clone, Default)]
pub struct WalkLinks {
    /// Map from (from, to) to duration in minutes and kind.
    /// Stored in both directions.
    links: BTreeMap<(StationId, StationId), (i64, WalkKind)>,
}

impl WalkLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a link, stored in both directions.
    pub fn add(&mut self, from: StationId, to: StationId, minutes: i64, kind: WalkKind) {
        self.links.insert((from.clone(), to.clone()), (minutes, kind));
        self.links.insert((to, from), (minutes, kind));
    }

    /// Walk duration between two stations, if linked.
    pub fn get(&self, from: &StationId, to: &StationId) -> Option<Duration> {
        self.links
            .get(&(from.clone(), to.clone()))
            .map(|(mins, _)| Duration::minutes(*mins))
    }

    pub fn is_walkable(&self, from: &StationId, to: &StationId) -> bool {
        self.links.contains_key(&(from.clone(), to.clone()))
    }

    /// All links leaving a station.
    pub fn walkable_from(&self, from: &StationId) -> Vec<WalkLink> {
        self.links
            .iter()
            .filter(|((f, _), _)| f == from)
            .map(|((_, to), (mins, kind))| WalkLink {
                to: to.clone(),
                duration: Duration::minutes(*mins),
                kind: *kind,
            })
            .collect()
    }

    /// Every directed link as `(from, link)`.
    pub fn iter(&self) -> impl Iterator<Item = (&StationId, WalkLink)> + '_ {
        self.links.iter().map(|((from, to), (mins, kind))| {
            (
                from,
                WalkLink {
                    to: to.clone(),
                    duration: Duration::minutes(*mins),
                    kind: *kind,
                },
            )
        })
    }

    /// Number of linked pairs (A-B and B-A count as one).
    pub fn len(&self) -> usize {
        self.links.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
