//! Search configuration for the journey planner.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;

/// Errors reading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration parameters for journey search.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Gap between successive query times of one journey request (minutes).
    pub query_interval_mins: i64,

    /// Number of query times tried per journey request.
    pub num_query_times: usize,

    /// Longest wait for a departure at a stop (minutes).
    pub max_wait_mins: i64,

    /// Maximum number of relationships in one path.
    pub max_path_length: usize,

    /// Maximum walks between stations of the same mode.
    pub max_walking_connections: u32,

    /// Maximum walks between stations of different modes.
    pub max_neighbour_connections: u32,

    /// Maximum number of journeys returned per journey request.
    pub max_journeys: usize,

    /// Wall-clock budget for one path request (milliseconds).
    pub search_timeout_ms: u64,

    /// Remember negative verdicts per node within a path request.
    pub use_visit_cache: bool,

    /// Draw valid verdicts as well as invalid ones in diagnostics.
    pub render_all_reasons: bool,

    /// Where diagnostics diagrams are written.
    pub diagnostics_dir: PathBuf,
}

impl SearchConfig {
    /// Create a new configuration with the given search limits.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        query_interval_mins: i64,
        num_query_times: usize,
        max_wait_mins: i64,
        max_path_length: usize,
        max_walking_connections: u32,
        max_neighbour_connections: u32,
        max_journeys: usize,
        search_timeout_ms: u64,
    ) -> Self {
        Self {
            query_interval_mins,
            num_query_times,
            max_wait_mins,
            max_path_length,
            max_walking_connections,
            max_neighbour_connections,
            max_journeys,
            search_timeout_ms,
            ..Self::default()
        }
    }

    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn with_visit_cache(mut self, enabled: bool) -> Self {
        self.use_visit_cache = enabled;
        self
    }

    pub fn with_diagnostics_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diagnostics_dir = dir.into();
        self
    }

    /// Returns the query interval as a Duration.
    pub fn query_interval(&self) -> Duration {
        Duration::minutes(self.query_interval_mins)
    }

    /// Returns the maximum wait as a Duration.
    pub fn max_wait(&self) -> Duration {
        Duration::minutes(self.max_wait_mins)
    }

    /// Returns the per-path-request budget.
    pub fn search_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search_timeout_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query_interval_mins: 12,
            num_query_times: 3,
            max_wait_mins: 25,
            max_path_length: 400,
            max_walking_connections: 2,
            max_neighbour_connections: 2,
            max_journeys: 5,
            search_timeout_ms: 4000,
            use_visit_cache: true,
            render_all_reasons: false,
            diagnostics_dir: PathBuf::from("diagnostics"),
        }
    }
}
