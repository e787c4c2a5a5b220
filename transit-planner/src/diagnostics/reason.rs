//! Heuristic verdicts.
//!
//! A verdict is pure data: a code, where it was reached, and whatever detail
//! the code needs. Verdicts are built through the constructors below, one per
//! kind, so each code always travels with the right payload.

use std::fmt;

use chrono::Duration;

use crate::domain::{RouteId, ServiceId, StationId, TripId};
use crate::graph::NodeId;

use super::{HowIGotHere, ReasonCode};

/// Identifier carried by an identified verdict.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityId {
    Service(ServiceId),
    Route(RouteId),
    Station(StationId),
    Trip(TripId),
    Node(NodeId),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Service(id) => write!(f, "service {id}"),
            EntityId::Route(id) => write!(f, "route {id}"),
            EntityId::Station(id) => write!(f, "station {id}"),
            EntityId::Trip(id) => write!(f, "trip {id}"),
            EntityId::Node(id) => write!(f, "node {id}"),
        }
    }
}

/// Why a path may continue, must stop, or has arrived.
///
/// There is deliberately no `PartialEq`: [`HeuristicsReason::equivalent`]
/// is the comparison diagnostics use, and it is not symmetric.
#[derive(Debug, Clone)]
pub enum HeuristicsReason {
    Valid {
        code: ReasonCode,
        how: HowIGotHere,
    },
    Unreachable {
        code: ReasonCode,
        how: HowIGotHere,
    },
    TimeBound {
        code: ReasonCode,
        elapsed: Duration,
        how: HowIGotHere,
    },
    Identified {
        code: ReasonCode,
        entity: EntityId,
        how: HowIGotHere,
    },
    Counted {
        code: ReasonCode,
        count: u32,
        how: HowIGotHere,
    },
    Cached {
        code: ReasonCode,
        elapsed: Duration,
        how: HowIGotHere,
    },
}

impl HeuristicsReason {
    pub fn valid(code: ReasonCode, how: HowIGotHere) -> Self {
        Self::Valid { code, how }
    }

    pub fn arrived(how: HowIGotHere) -> Self {
        Self::valid(ReasonCode::Arrived, how)
    }

    pub fn cache_miss(how: HowIGotHere) -> Self {
        Self::valid(ReasonCode::PreviousCacheMiss, how)
    }

    /// A memoized negative verdict standing in for `code`.
    ///
    /// Codes without a cached counterpart become `CachedUnknown`.
    pub fn cached(code: ReasonCode, elapsed: Duration, how: HowIGotHere) -> Self {
        Self::Cached {
            code: code.cached_counterpart().unwrap_or(ReasonCode::CachedUnknown),
            elapsed,
            how,
        }
    }

    fn unreachable(code: ReasonCode, how: HowIGotHere) -> Self {
        Self::Unreachable { code, how }
    }

    pub fn not_reachable(how: HowIGotHere) -> Self {
        Self::unreachable(ReasonCode::NotReachable, how)
    }

    pub fn interchange_unreachable(how: HowIGotHere) -> Self {
        Self::unreachable(ReasonCode::InterchangeUnreachable, how)
    }

    pub fn path_too_long(how: HowIGotHere) -> Self {
        Self::unreachable(ReasonCode::PathTooLong, how)
    }

    pub fn higher_cost(how: HowIGotHere) -> Self {
        Self::unreachable(ReasonCode::HigherCost, how)
    }

    pub fn timed_out(how: HowIGotHere) -> Self {
        Self::unreachable(ReasonCode::TimedOut, how)
    }

    fn time_bound(code: ReasonCode, elapsed: Duration, how: HowIGotHere) -> Self {
        Self::TimeBound { code, elapsed, how }
    }

    pub fn not_at_hour(elapsed: Duration, how: HowIGotHere) -> Self {
        Self::time_bound(ReasonCode::NotAtHour, elapsed, how)
    }

    pub fn took_too_long(elapsed: Duration, how: HowIGotHere) -> Self {
        Self::time_bound(ReasonCode::TookTooLong, elapsed, how)
    }

    pub fn already_departed(elapsed: Duration, how: HowIGotHere) -> Self {
        Self::time_bound(ReasonCode::AlreadyDeparted, elapsed, how)
    }

    pub fn does_not_operate_on_time(elapsed: Duration, how: HowIGotHere) -> Self {
        Self::time_bound(ReasonCode::DoesNotOperateOnTime, elapsed, how)
    }

    pub fn service_not_running_at_time(elapsed: Duration, how: HowIGotHere) -> Self {
        Self::time_bound(ReasonCode::ServiceNotRunningAtTime, elapsed, how)
    }

    fn identified(code: ReasonCode, entity: EntityId, how: HowIGotHere) -> Self {
        Self::Identified { code, entity, how }
    }

    pub fn not_on_query_date(service: ServiceId, how: HowIGotHere) -> Self {
        Self::identified(ReasonCode::NotOnQueryDate, EntityId::Service(service), how)
    }

    pub fn route_not_on_query_date(route: RouteId, how: HowIGotHere) -> Self {
        Self::identified(ReasonCode::RouteNotOnQueryDate, EntityId::Route(route), how)
    }

    pub fn already_seen_station(entity: EntityId, how: HowIGotHere) -> Self {
        Self::identified(ReasonCode::AlreadySeenStation, entity, how)
    }

    pub fn returned_to_start(node: NodeId, how: HowIGotHere) -> Self {
        Self::identified(ReasonCode::ReturnedToStart, EntityId::Node(node), how)
    }

    pub fn same_trip(trip: TripId, how: HowIGotHere) -> Self {
        Self::identified(ReasonCode::SameTrip, EntityId::Trip(trip), how)
    }

    pub fn station_closed(station: StationId, how: HowIGotHere) -> Self {
        Self::identified(ReasonCode::StationClosed, EntityId::Station(station), how)
    }

    pub fn transport_mode_wrong(route: RouteId, how: HowIGotHere) -> Self {
        Self::identified(ReasonCode::TransportModeWrong, EntityId::Route(route), how)
    }

    fn counted(code: ReasonCode, count: u32, how: HowIGotHere) -> Self {
        Self::Counted { code, count, how }
    }

    pub fn too_many_changes(count: u32, how: HowIGotHere) -> Self {
        Self::counted(ReasonCode::TooManyChanges, count, how)
    }

    pub fn too_many_walking_connections(count: u32, how: HowIGotHere) -> Self {
        Self::counted(ReasonCode::TooManyWalkingConnections, count, how)
    }

    pub fn too_many_neighbour_connections(count: u32, how: HowIGotHere) -> Self {
        Self::counted(ReasonCode::TooManyNeighbourConnections, count, how)
    }

    pub fn too_many_route_changes_required(count: u32, how: HowIGotHere) -> Self {
        Self::counted(ReasonCode::TooManyRouteChangesRequired, count, how)
    }

    pub fn too_many_interchanges_required(count: u32, how: HowIGotHere) -> Self {
        Self::counted(ReasonCode::TooManyInterchangesRequired, count, how)
    }

    pub fn code(&self) -> ReasonCode {
        match self {
            Self::Valid { code, .. }
            | Self::Unreachable { code, .. }
            | Self::TimeBound { code, .. }
            | Self::Identified { code, .. }
            | Self::Counted { code, .. }
            | Self::Cached { code, .. } => *code,
        }
    }

    pub fn how(&self) -> &HowIGotHere {
        match self {
            Self::Valid { how, .. }
            | Self::Unreachable { how, .. }
            | Self::TimeBound { how, .. }
            | Self::Identified { how, .. }
            | Self::Counted { how, .. }
            | Self::Cached { how, .. } => how,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Elapsed journey time carried by time-bound and cached verdicts.
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            Self::TimeBound { elapsed, .. } | Self::Cached { elapsed, .. } => Some(*elapsed),
            _ => None,
        }
    }

    /// Whether two verdicts say the same thing, for de-duplicating diagrams.
    ///
    /// - two time-bound verdicts match on elapsed time alone;
    /// - `ReturnedToStart` matches any verdict coded `NotOnQueryDate`;
    /// - two identified verdicts match on code and identifier;
    /// - a counted verdict matches any verdict coded `TooManyChanges`;
    /// - anything else matches on code and provenance.
    ///
    /// The second and fourth rules look only at `other`'s code, so the
    /// relation is not symmetric.
    pub fn equivalent(&self, other: &HeuristicsReason) -> bool {
        match (self, other) {
            (Self::TimeBound { elapsed: a, .. }, Self::TimeBound { elapsed: b, .. }) => a == b,
            (
                Self::Identified {
                    code: ReasonCode::ReturnedToStart,
                    ..
                },
                _,
            ) => other.code() == ReasonCode::NotOnQueryDate,
            (
                Self::Identified {
                    code: a, entity: x, ..
                },
                Self::Identified {
                    code: b, entity: y, ..
                },
            ) => a == b && x == y,
            (Self::Counted { .. }, _) => other.code() == ReasonCode::TooManyChanges,
            _ => self.code() == other.code() && self.how() == other.how(),
        }
    }

    /// Label used for this verdict in a rendered diagram.
    pub fn text_for_graph(&self) -> String {
        match self {
            Self::Valid { code, .. } | Self::Unreachable { code, .. } => code.to_string(),
            Self::TimeBound { code, elapsed, .. } | Self::Cached { code, elapsed, .. } => {
                format!("{code} {}m", elapsed.num_minutes())
            }
            Self::Identified { code, entity, .. } => format!("{code} {entity}"),
            Self::Counted { code, count, .. } => format!("{code} {count}"),
        }
    }
}

impl fmt::Display for HeuristicsReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at node {}", self.text_for_graph(), self.how().end_node())
    }
}
