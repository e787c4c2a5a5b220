//! Best-first journey search over the time-expanded graph.
//!
//! A journey request becomes a series of path requests (one per query time
//! and change limit). Each path request is a best-first traversal from the
//! origin node, ordered by time, with every step judged by the
//! [`RouteEvaluator`](super::evaluator::RouteEvaluator).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::diagnostics::{DiagnosticsError, ReasonsToGraphViz, ServiceReasons};
use crate::domain::{DomainError, Journey, Location, StationId, TramTime};
use crate::graph::{Direction, GraphDatabase, GraphError, GraphTransaction, NodeId};
use crate::repository::Repositories;

use super::evaluator::{Evaluation, RouteEvaluator};
use super::heuristics::ServiceHeuristics;
use super::journeys::Journeys;
use super::path::TraversalPath;
use super::rank::rank_journeys;
use super::{CancellationToken, JourneyRequest, JourneyState, PathRequest, SearchConfig};

/// Error from journey search.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("graph store failed: {0}")]
    Graph(#[from] GraphError),

    #[error("diagnostics failed: {0}")]
    Diagnostics(#[from] DiagnosticsError),

    /// Origin or destination not present in the graph
    #[error("unknown location {0}")]
    UnknownLocation(Location),

    /// A found path could not be turned into a journey
    #[error("invalid journey: {0}")]
    Domain(#[from] DomainError),
}

/// Answers journey requests against one graph.
pub struct RouteCalculator<'a, G: GraphDatabase> {
    graph: &'a G,
    repos: Repositories,
    config: SearchConfig,
}

impl<'a, G: GraphDatabase> RouteCalculator<'a, G> {
    pub fn new(graph: &'a G, repos: Repositories, config: SearchConfig) -> Self {
        Self {
            graph,
            repos,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Start answering `request`.
    ///
    /// Journeys are found lazily as the returned stream is read. The stream
    /// holds one read transaction until it is exhausted or dropped.
    pub fn calculate_route(
        &self,
        request: &JourneyRequest,
        cancel: CancellationToken,
    ) -> Result<Journeys<G::Transaction<'a>>, SearchError> {
        let reasons = ServiceReasons::new(request.diagnostics, self.config.diagnostics_dir.clone());
        let renderer =
            ReasonsToGraphViz::new(Arc::clone(&self.repos.data), self.config.render_all_reasons);

        if request.origin == request.destination {
            info!(request = %request, "Origin is the destination, nothing to search");
            return Ok(Journeys::empty(reasons, renderer, cancel));
        }

        let graph: &'a G = self.graph;
        let txn = graph.begin_read()?;
        let start = self.find_start(&txn, &request.origin)?;
        let (destinations, destination_stations) =
            self.find_destinations(&txn, &request.destination)?;

        let path_requests = request.path_requests(&self.config);
        info!(
            request = %request,
            path_requests = path_requests.len(),
            "Calculating route"
        );

        let context = SearchContext {
            repos: self.repos.clone(),
            config: self.config.clone(),
            request: request.clone(),
            start,
            destinations,
            destination_stations,
        };
        Ok(Journeys::new(txn, context, path_requests, reasons, renderer, cancel))
    }

    /// Find every journey for `request`, best first.
    ///
    /// Journeys are already distinct by stage sequence as the stream yields
    /// them.
    pub fn plan(
        &self,
        request: &JourneyRequest,
        cancel: CancellationToken,
    ) -> Result<Vec<Journey>, SearchError> {
        let journeys = self
            .calculate_route(request, cancel)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rank_journeys(journeys))
    }

    fn find_start<T: GraphTransaction>(
        &self,
        txn: &T,
        location: &Location,
    ) -> Result<NodeId, SearchError> {
        let node = match location {
            Location::Station(station) => txn.find_station(station)?,
            Location::Group(area) => txn.find_group(area)?,
        };
        node.ok_or_else(|| SearchError::UnknownLocation(location.clone()))
    }

    fn find_destinations<T: GraphTransaction>(
        &self,
        txn: &T,
        location: &Location,
    ) -> Result<(HashSet<NodeId>, Vec<StationId>), SearchError> {
        let unknown = || SearchError::UnknownLocation(location.clone());
        let stations = match location {
            Location::Station(station) => vec![station.clone()],
            Location::Group(area) => self
                .repos
                .data
                .group(area)
                .ok_or_else(unknown)?
                .stations
                .clone(),
        };

        let mut nodes = HashSet::new();
        for station in &stations {
            nodes.insert(txn.find_station(station)?.ok_or_else(unknown)?);
        }
        Ok((nodes, stations))
    }
}

/// Everything a path request needs besides the transaction.
pub(crate) struct SearchContext {
    repos: Repositories,
    config: SearchConfig,
    request: JourneyRequest,
    start: NodeId,
    destinations: HashSet<NodeId>,
    destination_stations: Vec<StationId>,
}

impl SearchContext {
    pub(crate) fn max_journeys(&self) -> usize {
        self.config.max_journeys
    }

    /// Run one path request, returning the paths that reached a destination.
    pub(crate) fn find_paths<T: GraphTransaction>(
        &self,
        txn: &T,
        path_request: &PathRequest,
        reasons: &mut ServiceReasons,
    ) -> Result<Vec<Arc<TraversalPath>>, SearchError> {
        let heuristics = ServiceHeuristics::new(
            &self.repos,
            &self.config,
            &self.request,
            path_request,
            &self.destination_stations,
        );
        let deadline = Instant::now() + self.config.search_timeout();
        let mut evaluator = RouteEvaluator::new(heuristics, self.config.use_visit_cache, deadline);

        let start = txn.node(self.start)?;
        let state = JourneyState::start(&start, path_request.query_time);
        let mut queue = BinaryHeap::new();
        let mut sequence = 0u64;
        queue.push(Queued::new(TraversalPath::start(start, state), &mut sequence));

        let mut found = Vec::new();
        while let Some(Queued { path, .. }) = queue.pop() {
            match evaluator.evaluate(&path, reasons)? {
                Evaluation::IncludeAndPrune => {
                    trace!(arrival = %path.state().time(), "Reached destination");
                    found.push(path);
                }
                Evaluation::ExcludeAndPrune => {}
                Evaluation::ExcludeAndContinue => {
                    for rel in txn.relationships(path.node().id, Direction::Outgoing)? {
                        let target = txn.node(rel.end)?;
                        if let Some(next) = path.state().next(&rel, &target, &self.destinations) {
                            let step = TraversalPath::extend(&path, rel, target, next);
                            queue.push(Queued::new(step, &mut sequence));
                        }
                    }
                }
                Evaluation::Abort => {
                    debug!(request = %path_request, "Path request ran out of time");
                    break;
                }
            }
        }

        debug!(
            request = %path_request,
            found = found.len(),
            queued = sequence,
            cache_hits = evaluator.cache_hits(),
            best_minutes = ?evaluator.best_arrival().map(|best| best.num_minutes()),
            "Path request searched"
        );
        Ok(found)
    }
}

/// A path waiting in the queue, earliest time first, then first queued.
struct Queued {
    time: TramTime,
    sequence: u64,
    path: Arc<TraversalPath>,
}

impl Queued {
    fn new(path: Arc<TraversalPath>, sequence: &mut u64) -> Self {
        *sequence += 1;
        Self {
            time: path.state().time(),
            sequence: *sequence,
            path,
        }
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence == other.sequence
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // Reversed: BinaryHeap pops the greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
