//! Search diagnostics.
//!
//! Every decision the search makes about a partial path is a verdict
//! ([`HeuristicsReason`]) carrying a [`ReasonCode`] and the step it was made
//! at ([`HowIGotHere`]). [`ServiceReasons`] tallies verdicts for one journey
//! request and reports after each path request; [`ReasonsToGraphViz`]
//! renders the explored subgraph as a GraphViz `.dot` file.

mod graphviz;
mod provenance;
mod reason;
mod reason_code;
mod service_reasons;

pub use graphviz::ReasonsToGraphViz;
pub use provenance::HowIGotHere;
pub use reason::{EntityId, HeuristicsReason};
pub use reason_code::{ReasonCode, ReasonGroup};
pub use service_reasons::{ReasonsReport, ServiceReasons};

/// Errors raised while collecting diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticsError {
    #[error("transport mode of a traversal step could not be determined")]
    UnknownTransportMode,
}
