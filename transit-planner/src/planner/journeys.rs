//! The lazy stream of journeys answering one journey request.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, warn};

use crate::diagnostics::{ReasonsReport, ReasonsToGraphViz, ServiceReasons};
use crate::domain::{Journey, TransportStage};
use crate::graph::GraphTransaction;

use super::search::SearchContext;
use super::{CancellationToken, PathRequest, SearchError};

/// Journeys found for a journey request, produced as they are read.
///
/// Each call to `next` runs path requests until one yields a new journey.
/// Journeys with the same stages as an earlier one are skipped, and the
/// stream ends after the configured maximum. The read transaction is
/// released when the stream ends, fails, or is dropped.
pub struct Journeys<T: GraphTransaction> {
    txn: Option<T>,
    context: Option<SearchContext>,
    pending: VecDeque<PathRequest>,
    ready: VecDeque<Journey>,
    seen: HashSet<Vec<TransportStage>>,
    emitted: usize,
    reasons: ServiceReasons,
    renderer: ReasonsToGraphViz,
    reports: Vec<ReasonsReport>,
    cancel: CancellationToken,
}

impl<T: GraphTransaction> Journeys<T> {
    pub(crate) fn new(
        txn: T,
        context: SearchContext,
        path_requests: Vec<PathRequest>,
        reasons: ServiceReasons,
        renderer: ReasonsToGraphViz,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            txn: Some(txn),
            context: Some(context),
            pending: path_requests.into(),
            ready: VecDeque::new(),
            seen: HashSet::new(),
            emitted: 0,
            reasons,
            renderer,
            reports: Vec::new(),
            cancel,
        }
    }

    /// A stream with nothing to search.
    pub(crate) fn empty(
        reasons: ServiceReasons,
        renderer: ReasonsToGraphViz,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            txn: None,
            context: None,
            pending: VecDeque::new(),
            ready: VecDeque::new(),
            seen: HashSet::new(),
            emitted: 0,
            reasons,
            renderer,
            reports: Vec::new(),
            cancel,
        }
    }

    /// Reports of the path requests run so far, in order.
    pub fn reports(&self) -> &[ReasonsReport] {
        &self.reports
    }

    /// True while the stream still holds its read transaction.
    pub fn is_open(&self) -> bool {
        self.txn.is_some()
    }

    fn run(&mut self, path_request: &PathRequest) -> Result<(), SearchError> {
        let (Some(txn), Some(context)) = (self.txn.as_ref(), self.context.as_ref()) else {
            return Ok(());
        };

        let found = context.find_paths(txn, path_request, &mut self.reasons);
        let report = self
            .reasons
            .report_reasons(txn, path_request, &self.renderer);
        self.reports.push(report);

        for path in found? {
            let Some(journey) = path.to_journey(path_request.query_time)? else {
                continue;
            };
            if self.seen.insert(journey.stages().to_vec()) {
                self.ready.push_back(journey);
            }
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.pending.clear();
        self.ready.clear();
        if let Some(txn) = self.txn.take() {
            if let Err(err) = txn.commit() {
                warn!(error = %err, "Could not release read transaction");
            }
            debug!(journeys = self.emitted, "Journey stream finished");
        }
    }
}

impl<T: GraphTransaction> Iterator for Journeys<T> {
    type Item = Result<Journey, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let limit = self.context.as_ref().map_or(0, SearchContext::max_journeys);
        loop {
            if self.emitted >= limit {
                self.finish();
                return None;
            }
            if let Some(journey) = self.ready.pop_front() {
                self.emitted += 1;
                return Some(Ok(journey));
            }
            let Some(path_request) = self.pending.pop_front() else {
                self.finish();
                return None;
            };
            if self.cancel.is_cancelled() {
                info!(request = %path_request, "Journey request cancelled");
                self.finish();
                return None;
            }
            if let Err(err) = self.run(&path_request) {
                self.finish();
                return Some(Err(err));
            }
        }
    }
}
