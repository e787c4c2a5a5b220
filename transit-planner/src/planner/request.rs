//! Journey requests and the path requests they expand into.

use std::fmt;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::domain::{Location, TramTime, TransportMode};

use super::SearchConfig;

/// Longest journey considered unless the request says otherwise.
const DEFAULT_MAX_DURATION_MINS: i64 = 120;

/// A question asked of the planner: get from here to there, on this date,
/// leaving at or after this time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyRequest {
    pub origin: Location,
    pub destination: Location,
    pub date: NaiveDate,
    pub time: TramTime,
    pub max_changes: u32,
    pub max_duration: Duration,
    /// Overrides the configured number of query times.
    pub num_query_times: Option<usize>,
    /// Modes allowed for vehicle stages. Empty means any.
    pub modes: Vec<TransportMode>,
    pub diagnostics: bool,
    pub warn_if_no_results: bool,
    /// Search with 0, 1, .. `max_changes` changes instead of only the maximum.
    pub progressive_changes: bool,
    pub uid: Uuid,
}

impl JourneyRequest {
    pub fn new(
        origin: impl Into<Location>,
        destination: impl Into<Location>,
        date: NaiveDate,
        time: TramTime,
        max_changes: u32,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            date,
            time,
            max_changes,
            max_duration: Duration::minutes(DEFAULT_MAX_DURATION_MINS),
            num_query_times: None,
            modes: Vec::new(),
            diagnostics: false,
            warn_if_no_results: true,
            progressive_changes: false,
            uid: Uuid::new_v4(),
        }
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub fn with_num_query_times(mut self, n: usize) -> Self {
        self.num_query_times = Some(n);
        self
    }

    pub fn with_modes(mut self, modes: impl IntoIterator<Item = TransportMode>) -> Self {
        self.modes = modes.into_iter().collect();
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn with_warn_if_no_results(mut self, warn: bool) -> Self {
        self.warn_if_no_results = warn;
        self
    }

    pub fn with_progressive_changes(mut self, progressive: bool) -> Self {
        self.progressive_changes = progressive;
        self
    }

    /// True if vehicles of `mode` may be used.
    pub fn allows_mode(&self, mode: TransportMode) -> bool {
        self.modes.is_empty() || self.modes.contains(&mode)
    }

    /// Path requests to run, in order.
    ///
    /// Query times start at the requested time and step by the configured
    /// interval. Times past the end of the following day are dropped.
    pub fn path_requests(&self, config: &SearchConfig) -> Vec<PathRequest> {
        let count = self.num_query_times.unwrap_or(config.num_query_times);
        let changes: Vec<u32> = if self.progressive_changes {
            (0..=self.max_changes).collect()
        } else {
            vec![self.max_changes]
        };

        let mut requests = Vec::new();
        for step in 0..count {
            let offset = config.query_interval() * i32::try_from(step).unwrap_or(i32::MAX);
            let Some(query_time) = self.time.checked_add(offset) else {
                break;
            };
            for &max_changes in &changes {
                let index = requests.len();
                requests.push(PathRequest::new(self, query_time, max_changes, index));
            }
        }
        requests
    }
}

impl fmt::Display for JourneyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} on {} at {} (changes<={}, {})",
            self.origin, self.destination, self.date, self.time, self.max_changes, self.uid
        )
    }
}

/// One search run: a journey request at a single query time and change limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRequest {
    pub query_time: TramTime,
    pub date: NaiveDate,
    pub max_changes: u32,
    /// Position among the path requests of its journey request.
    pub index: usize,
    pub uid: Uuid,
    pub warn_if_no_results: bool,
}

impl PathRequest {
    pub fn new(
        request: &JourneyRequest,
        query_time: TramTime,
        max_changes: u32,
        index: usize,
    ) -> Self {
        Self {
            query_time,
            date: request.date,
            max_changes,
            index,
            uid: request.uid,
            warn_if_no_results: request.warn_if_no_results,
        }
    }
}

impl fmt::Display for PathRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {} changes<={} ({})",
            self.index, self.date, self.query_time, self.max_changes, self.uid
        )
    }
}
