//! Journey planner over a time-expanded transport graph.
//!
//! A [`RouteCalculator`] turns a [`JourneyRequest`] into path requests and
//! runs a best-first traversal for each. Every step is judged by heuristics
//! whose verdicts are tallied in [`ServiceReasons`](crate::diagnostics::ServiceReasons),
//! and negative verdicts that depend only on the node are remembered for the
//! rest of the path request.

mod cancel;
mod config;
mod evaluator;
mod heuristics;
mod journeys;
mod path;
mod previous_visits;
mod rank;
mod request;
mod search;
mod state;


pub use cancel::CancellationToken;
pub use config::{ConfigError, SearchConfig};
pub use journeys::Journeys;
pub use rank::rank_journeys;
pub use request::{JourneyRequest, PathRequest};
pub use search::{RouteCalculator, SearchError};
pub use state::{JourneyState, TraversalStateType};
