//! Judges each step of a traversal.

use std::time::Instant;

use chrono::Duration;

use crate::diagnostics::{EntityId, HeuristicsReason, HowIGotHere, ReasonCode, ServiceReasons};
use crate::graph::NodeLabel;

use super::heuristics::ServiceHeuristics;
use super::path::TraversalPath;
use super::previous_visits::{PreviousVisits, VisitKey};
use super::{SearchError, TraversalStateType};

/// What the traversal does with a path after it has been judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// The path reached a destination: keep it, do not extend it.
    IncludeAndPrune,
    ExcludeAndPrune,
    ExcludeAndContinue,
    /// Stop the whole path request.
    Abort,
}

/// Applies the checks in order, records every verdict, and tracks the best
/// arrival found so far in one path request.
pub struct RouteEvaluator<'r> {
    heuristics: ServiceHeuristics<'r>,
    visits: Option<PreviousVisits>,
    deadline: Instant,
    best_arrival: Option<Duration>,
}

impl<'r> RouteEvaluator<'r> {
    pub fn new(heuristics: ServiceHeuristics<'r>, use_visit_cache: bool, deadline: Instant) -> Self {
        Self {
            heuristics,
            visits: use_visit_cache.then(PreviousVisits::new),
            deadline,
            best_arrival: None,
        }
    }

    /// Elapsed time of the earliest arrival so far.
    pub fn best_arrival(&self) -> Option<Duration> {
        self.best_arrival
    }

    pub fn cache_hits(&self) -> u64 {
        self.visits.as_ref().map_or(0, PreviousVisits::hits)
    }

    pub fn evaluate(
        &mut self,
        path: &TraversalPath,
        reasons: &mut ServiceReasons,
    ) -> Result<Evaluation, SearchError> {
        reasons.increment_total_checked();
        let state = path.state();
        reasons.record_stat(state)?;

        let how = path.provenance();
        let elapsed = self.heuristics.elapsed(path.previous_state().time());
        let next_elapsed = self.heuristics.elapsed(state.time());

        if Instant::now() >= self.deadline {
            reasons.record_reason(HeuristicsReason::timed_out(how));
            return Ok(Evaluation::Abort);
        }

        if state.state_type() == TraversalStateType::Destination {
            if self.slower_than_best(next_elapsed) {
                reasons.record_reason(HeuristicsReason::higher_cost(how));
                return Ok(Evaluation::ExcludeAndPrune);
            }
            if !self.shape_allows(path, next_elapsed, how, reasons) {
                return Ok(Evaluation::ExcludeAndPrune);
            }
            if let Some(station) = &path.node().props.station {
                let open = self.heuristics.station_open(station, how);
                if !reasons.record_reason(open).is_valid() {
                    return Ok(Evaluation::ExcludeAndPrune);
                }
            }
            self.best_arrival = Some(
                self.best_arrival
                    .map_or(next_elapsed, |best| best.min(next_elapsed)),
            );
            reasons.record_success();
            return Ok(Evaluation::IncludeAndPrune);
        }

        if self.slower_than_best(next_elapsed) {
            reasons.record_reason(HeuristicsReason::higher_cost(how));
            return Ok(Evaluation::ExcludeAndPrune);
        }

        if let Some(reason) = self.cycle(path, how) {
            reasons.record_reason(reason);
            return Ok(Evaluation::ExcludeAndPrune);
        }

        if !self.shape_allows(path, next_elapsed, how, reasons) {
            return Ok(Evaluation::ExcludeAndPrune);
        }

        if !self.node_verdicts(path, elapsed, how, reasons) {
            return Ok(Evaluation::ExcludeAndPrune);
        }

        reasons.record_reason(HeuristicsReason::valid(ReasonCode::Continue, how));
        Ok(Evaluation::ExcludeAndContinue)
    }

    fn slower_than_best(&self, elapsed: Duration) -> bool {
        self.best_arrival.is_some_and(|best| elapsed > best)
    }

    /// Checks on the shape of the whole path, recorded up to the first
    /// negative. Never cached.
    fn shape_allows(
        &self,
        path: &TraversalPath,
        next_elapsed: Duration,
        how: HowIGotHere,
        reasons: &mut ServiceReasons,
    ) -> bool {
        let h = &self.heuristics;
        let state = path.state();
        let checks: [&dyn Fn() -> HeuristicsReason; 5] = [
            &|| h.path_length(path.length(), how),
            &|| h.journey_duration(next_elapsed, how),
            &|| h.changes(state, how),
            &|| h.walking_connections(state, how),
            &|| h.neighbour_connections(state, how),
        ];
        checks
            .iter()
            .all(|check| reasons.record_reason(check()).is_valid())
    }

    fn cycle(&self, path: &TraversalPath, how: HowIGotHere) -> Option<HeuristicsReason> {
        if how.is_at_start() {
            return None;
        }
        let node = path.node();
        if node.id == path.start_node() {
            return Some(HeuristicsReason::returned_to_start(node.id, how));
        }
        if how.revisits_node() {
            let entity = node
                .props
                .station
                .clone()
                .map_or(EntityId::Node(node.id), EntityId::Station);
            return Some(HeuristicsReason::already_seen_station(entity, how));
        }
        None
    }

    /// Node checks through the visit cache. False if the path must end.
    fn node_verdicts(
        &mut self,
        path: &TraversalPath,
        elapsed: Duration,
        how: HowIGotHere,
        reasons: &mut ServiceReasons,
    ) -> bool {
        let previous = path.previous_state();
        let key = VisitKey {
            node: path.node().id,
            time: previous.time(),
            boardings: path.state().boardings(),
            on_trip: previous.is_on_trip(),
        };

        if let Some(visits) = self.visits.as_mut() {
            if let Some(code) = visits.get(&key) {
                reasons.record_reason(HeuristicsReason::cached(code, elapsed, how));
                return false;
            }
            reasons.record_reason(HeuristicsReason::cache_miss(how));
        }

        for verdict in self.node_checks(path, elapsed, how) {
            let verdict = reasons.record_reason(verdict);
            if !verdict.is_valid() {
                if let Some(visits) = self.visits.as_mut() {
                    visits.record(key, &verdict);
                }
                return false;
            }
        }
        true
    }

    /// Checks that depend only on the node, the time, boardings and whether
    /// the path is on a trip. Stops after the first negative verdict.
    fn node_checks(
        &self,
        path: &TraversalPath,
        elapsed: Duration,
        how: HowIGotHere,
    ) -> Vec<HeuristicsReason> {
        let h = &self.heuristics;
        let node = path.node();
        let state = path.state();
        let previous = path.previous_state();
        let time = previous.time();

        let mut verdicts = Vec::new();
        let mut check = |verdict: HeuristicsReason| {
            let valid = verdict.is_valid();
            verdicts.push(verdict);
            valid
        };
        match state.state_type() {
            TraversalStateType::Service => {
                if check(h.service_date(node, how)) {
                    check(h.service_time(node, time, elapsed, how));
                }
            }
            TraversalStateType::RouteStationBoard => {
                let station_open = node
                    .props
                    .station
                    .as_ref()
                    .map(|station| h.station_open(station, how));
                if check(h.route_date(node, how))
                    && station_open.is_none_or(|verdict| check(verdict))
                    && check(h.transport_mode(node, how))
                {
                    check(h.route_reachable(node, state.boardings(), how));
                }
            }
            TraversalStateType::Hour => {
                check(h.hour(node, time, elapsed, how));
            }
            TraversalStateType::Minute => {
                let on_trip = previous.is_on_trip();
                if check(h.departure_time(node, time, on_trip, elapsed, how)) && !on_trip {
                    check(h.same_trip(node, previous.used_trips(), how));
                }
            }
            TraversalStateType::Station | TraversalStateType::Walking
                if !how.is_at_start() && node.has_label(NodeLabel::Station) =>
            {
                if let Some(station) = &node.props.station {
                    if check(h.station_open(station, how)) {
                        check(h.interchanges(station, state.boardings(), how));
                    }
                }
            }
            _ => {}
        }
        verdicts
    }
}
