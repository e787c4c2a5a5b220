//! Verdict tallies for one journey request.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use strum::{EnumCount, IntoEnumIterator};
use tracing::{info, warn};

use crate::graph::{GraphTransaction, NodeId};
use crate::planner::{JourneyState, PathRequest, TraversalStateType};

use super::{DiagnosticsError, HeuristicsReason, ReasonCode, ReasonsToGraphViz};

/// Number of most-revisited nodes listed in a report.
const TOP_REVISITS: usize = 10;

/// What one path request did, as reported when it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonsReport {
    pub success: bool,
    pub total_checked: u64,
    /// Non-zero code counts, smallest first.
    pub counts: Vec<(ReasonCode, u64)>,
    /// Non-zero traversal-state counts.
    pub state_counts: Vec<(TraversalStateType, u64)>,
    /// Diagram written for this path request, if any.
    pub diagram: Option<PathBuf>,
}

impl ReasonsReport {
    pub fn count(&self, code: ReasonCode) -> u64 {
        self.counts
            .iter()
            .find(|(c, _)| *c == code)
            .map_or(0, |(_, n)| *n)
    }
}

/// Collects verdicts and statistics while path requests run.
///
/// Owned by one journey request and reset after every path request.
#[derive(Debug)]
pub struct ServiceReasons {
    diagnostics: bool,
    diagnostics_dir: PathBuf,
    reasons: Vec<HeuristicsReason>,
    counts: [u64; ReasonCode::COUNT],
    state_counts: [u64; TraversalStateType::COUNT],
    node_visits: HashMap<NodeId, u64>,
    total_checked: u64,
    success: bool,
}

impl ServiceReasons {
    pub fn new(diagnostics: bool, diagnostics_dir: impl Into<PathBuf>) -> Self {
        Self {
            diagnostics,
            diagnostics_dir: diagnostics_dir.into(),
            reasons: Vec::new(),
            counts: [0; ReasonCode::COUNT],
            state_counts: [0; TraversalStateType::COUNT],
            node_visits: HashMap::new(),
            total_checked: 0,
            success: false,
        }
    }

    /// Tally a verdict and hand it back.
    ///
    /// With diagnostics on, every verdict is kept and counts as a visit to
    /// its node. Otherwise only negative verdicts count as visits.
    pub fn record_reason(&mut self, reason: HeuristicsReason) -> HeuristicsReason {
        let node = reason.how().end_node();
        if self.diagnostics {
            self.reasons.push(reason.clone());
            *self.node_visits.entry(node).or_default() += 1;
        } else if !reason.is_valid() {
            *self.node_visits.entry(node).or_default() += 1;
        }
        self.counts[reason.code().index()] += 1;
        reason
    }

    pub fn increment_total_checked(&mut self) {
        self.total_checked += 1;
    }

    pub fn record_success(&mut self) {
        self.success = true;
        self.counts[ReasonCode::Arrived.index()] += 1;
    }

    /// Count a step by the mode being travelled and the state reached.
    pub fn record_stat(&mut self, state: &JourneyState) -> Result<(), DiagnosticsError> {
        let code = ReasonCode::for_mode(state.mode())?;
        self.counts[code.index()] += 1;
        self.state_counts[state.state_type().index()] += 1;
        Ok(())
    }

    pub fn count(&self, code: ReasonCode) -> u64 {
        self.counts[code.index()]
    }

    pub fn state_count(&self, state: TraversalStateType) -> u64 {
        self.state_counts[state.index()]
    }

    pub fn total_checked(&self) -> u64 {
        self.total_checked
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn visits(&self, node: NodeId) -> u64 {
        self.node_visits.get(&node).copied().unwrap_or(0)
    }

    /// Verdicts kept so far (diagnostics only).
    pub fn reasons(&self) -> &[HeuristicsReason] {
        &self.reasons
    }

    /// Log what the finished path request did, write its diagram, and reset.
    pub fn report_reasons<T: GraphTransaction>(
        &mut self,
        txn: &T,
        request: &PathRequest,
        renderer: &ReasonsToGraphViz,
    ) -> ReasonsReport {
        let diagram = if self.diagnostics && !self.reasons.is_empty() {
            self.write_diagram(txn, request, renderer)
        } else {
            None
        };

        if !self.success && request.warn_if_no_results {
            warn!(request = %request, "No journeys found");
        }

        let counts = self.non_zero_counts();
        let state_counts: Vec<(TraversalStateType, u64)> = TraversalStateType::iter()
            .map(|state| (state, self.state_counts[state.index()]))
            .filter(|(_, n)| *n > 0)
            .collect();

        info!(
            request = %request,
            success = self.success,
            total_checked = self.total_checked,
            "Path request finished"
        );
        info!(counts = %format_table(&counts), "Reason codes");
        info!(states = %format_table(&state_counts), "Traversal states");
        if self.diagnostics {
            info!(nodes = %self.top_revisits(), "Most revisited nodes");
        }

        let report = ReasonsReport {
            success: self.success,
            total_checked: self.total_checked,
            counts,
            state_counts,
            diagram,
        };
        self.reset();
        report
    }

    fn write_diagram<T: GraphTransaction>(
        &self,
        txn: &T,
        request: &PathRequest,
        renderer: &ReasonsToGraphViz,
    ) -> Option<PathBuf> {
        let mut dot = String::from("digraph G {\n");
        if let Err(err) = renderer.append_to(&mut dot, &self.reasons, txn) {
            warn!(error = %err, "Could not render diagnostics diagram");
            return None;
        }
        dot.push_str("}\n");

        let prefix = if self.success { "found" } else { "notfound" };
        let name = format!(
            "{prefix}_{}_at_{}_changes{}_{}.dot",
            request.query_time, request.date, request.max_changes, request.uid
        )
        .replace(':', "");
        let path = self.diagnostics_dir.join(name);

        let written = fs::create_dir_all(&self.diagnostics_dir).and_then(|()| fs::write(&path, dot));
        match written {
            Ok(()) => {
                info!(path = %path.display(), "Wrote diagnostics diagram");
                Some(path)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Could not write diagnostics diagram");
                None
            }
        }
    }

    fn non_zero_counts(&self) -> Vec<(ReasonCode, u64)> {
        let mut counts: Vec<(ReasonCode, u64)> = ReasonCode::iter()
            .map(|code| (code, self.counts[code.index()]))
            .filter(|(_, n)| *n > 0)
            .collect();
        counts.sort_by_key(|(code, n)| (*n, *code));
        counts
    }

    /// Most revisited nodes with a negative verdict, and what those were.
    fn top_revisits(&self) -> String {
        let mut negatives: HashMap<NodeId, HashMap<ReasonCode, u64>> = HashMap::new();
        for reason in self.reasons.iter().filter(|reason| !reason.is_valid()) {
            *negatives
                .entry(reason.how().end_node())
                .or_default()
                .entry(reason.code())
                .or_default() += 1;
        }

        let mut nodes: Vec<(NodeId, u64)> = self
            .node_visits
            .iter()
            .filter(|(node, _)| negatives.contains_key(node))
            .map(|(node, visits)| (*node, *visits))
            .collect();
        nodes.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut out = String::new();
        for (node, visits) in nodes.into_iter().take(TOP_REVISITS) {
            let mut codes: Vec<(ReasonCode, u64)> = negatives
                .get(&node)
                .map(|codes| codes.iter().map(|(c, n)| (*c, *n)).collect())
                .unwrap_or_default();
            codes.sort();
            let _ = write!(out, "[node {node} x{visits}: {}] ", format_table(&codes));
        }
        out.trim_end().to_string()
    }

    /// Zero all tallies without giving up their storage.
    pub fn reset(&mut self) {
        self.reasons.clear();
        self.counts.fill(0);
        self.state_counts.fill(0);
        self.node_visits.clear();
        self.total_checked = 0;
        self.success = false;
    }
}

fn format_table<K: std::fmt::Display>(rows: &[(K, u64)]) -> String {
    rows.iter()
        .map(|(key, n)| format!("{key}={n}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::HowIGotHere;
    use crate::graph::{GraphDatabase, RelationshipId};
    use crate::planner::{JourneyRequest, PathRequest};
    use crate::testing;
    use chrono::Duration;
    use std::sync::Arc;

    fn how(node: u64) -> HowIGotHere {
        HowIGotHere::new(
            NodeId(node),
            RelationshipId(node),
            NodeId(node + 1000),
            TraversalStateType::Hour,
            false,
        )
    }

    fn path_request() -> PathRequest {
        let request = JourneyRequest::new("ALT", "PIC", testing::monday(), testing::t("08:00"), 1);
        PathRequest::new(&request, testing::t("08:00"), 1, 0)
    }

    #[test]
    fn record_reason_counts_and_returns() {
        let mut reasons = ServiceReasons::new(false, "unused");
        let verdict = reasons.record_reason(HeuristicsReason::not_at_hour(Duration::minutes(4), how(1)));
        assert_eq!(verdict.code(), ReasonCode::NotAtHour);
        assert_eq!(reasons.count(ReasonCode::NotAtHour), 1);
        reasons.record_reason(HeuristicsReason::not_at_hour(Duration::minutes(9), how(1)));
        assert_eq!(reasons.count(ReasonCode::NotAtHour), 2);
    }

    #[test]
    fn visits_without_diagnostics_count_negatives_only() {
        let mut reasons = ServiceReasons::new(false, "unused");
        reasons.record_reason(HeuristicsReason::valid(ReasonCode::HourOk, how(1)));
        reasons.record_reason(HeuristicsReason::not_reachable(how(1)));
        assert_eq!(reasons.visits(NodeId(1)), 1);
        assert!(reasons.reasons().is_empty());
    }

    #[test]
    fn visits_with_diagnostics_count_everything() {
        let mut reasons = ServiceReasons::new(true, "unused");
        reasons.record_reason(HeuristicsReason::valid(ReasonCode::HourOk, how(1)));
        reasons.record_reason(HeuristicsReason::not_reachable(how(1)));
        assert_eq!(reasons.visits(NodeId(1)), 2);
        assert_eq!(reasons.reasons().len(), 2);
    }

    #[test]
    fn success_bumps_arrived() {
        let mut reasons = ServiceReasons::new(false, "unused");
        assert!(!reasons.success());
        reasons.record_success();
        assert!(reasons.success());
        assert_eq!(reasons.count(ReasonCode::Arrived), 1);
    }

    #[test]
    fn report_resets_tallies() {
        let (graph, repos) = testing::fixture();
        let txn = graph.begin_read().unwrap();
        let renderer = ReasonsToGraphViz::new(Arc::clone(&repos.data), false);
        let request = path_request();

        let mut reasons = ServiceReasons::new(false, "unused");
        reasons.increment_total_checked();
        reasons.increment_total_checked();
        reasons.record_reason(HeuristicsReason::took_too_long(Duration::minutes(99), how(3)));

        let first = reasons.report_reasons(&txn, &request, &renderer);
        assert_eq!(first.total_checked, 2);
        assert_eq!(first.count(ReasonCode::TookTooLong), 1);
        assert!(!first.success);
        assert!(first.diagram.is_none());

        let second = reasons.report_reasons(&txn, &request, &renderer);
        assert_eq!(second.total_checked, 0);
        assert!(second.counts.is_empty());
        assert_eq!(reasons.visits(NodeId(3)), 0);
    }

    #[test]
    fn report_orders_counts_ascending() {
        let (graph, repos) = testing::fixture();
        let txn = graph.begin_read().unwrap();
        let renderer = ReasonsToGraphViz::new(Arc::clone(&repos.data), false);

        let mut reasons = ServiceReasons::new(false, "unused");
        for _ in 0..3 {
            reasons.record_reason(HeuristicsReason::not_reachable(how(1)));
        }
        reasons.record_reason(HeuristicsReason::path_too_long(how(1)));

        let report = reasons.report_reasons(&txn, &path_request(), &renderer);
        assert_eq!(
            report.counts,
            vec![(ReasonCode::PathTooLong, 1), (ReasonCode::NotReachable, 3)]
        );
    }

    #[test]
    fn diagram_written_when_diagnostics_on() {
        let (graph, repos) = testing::fixture();
        let txn = graph.begin_read().unwrap();
        let renderer = ReasonsToGraphViz::new(Arc::clone(&repos.data), true);
        let dir = tempfile::tempdir().unwrap();
        let request = path_request();

        let alt = txn
            .find_station(&crate::domain::StationId::new("ALT"))
            .unwrap()
            .unwrap();
        let mut reasons = ServiceReasons::new(true, dir.path());
        reasons.record_reason(HeuristicsReason::valid(
            ReasonCode::Continue,
            HowIGotHere::start(alt, TraversalStateType::Station),
        ));

        let report = reasons.report_reasons(&txn, &request, &renderer);
        let path = report.diagram.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(
            name,
            format!("notfound_0800_at_2024-06-03_changes1_{}.dot", request.uid)
        );
        let dot = std::fs::read_to_string(&path).unwrap();
        assert!(dot.starts_with("digraph G {"));
        assert!(dot.contains("Altrincham"));
    }

    #[test]
    fn unwritable_directory_is_not_an_error() {
        let (graph, repos) = testing::fixture();
        let txn = graph.begin_read().unwrap();
        let renderer = ReasonsToGraphViz::new(Arc::clone(&repos.data), true);
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let alt = txn
            .find_station(&crate::domain::StationId::new("ALT"))
            .unwrap()
            .unwrap();
        let mut reasons = ServiceReasons::new(true, blocker.join("nested"));
        reasons.record_reason(HeuristicsReason::valid(
            ReasonCode::Continue,
            HowIGotHere::start(alt, TraversalStateType::Station),
        ));
        let report = reasons.report_reasons(&txn, &path_request(), &renderer);
        assert!(report.diagram.is_none());
    }
}
