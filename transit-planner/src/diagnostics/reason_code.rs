//! Verdict codes.
//!
//! Codes fall into four groups. Continue codes let a path carry on.
//! Terminal codes end a path. Cached codes end a path on the strength of an
//! earlier terminal verdict at the same node. Outcome codes count what the
//! search did rather than judging a path.

use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::domain::TransportMode;

use super::DiagnosticsError;

/// Group a [`ReasonCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ReasonGroup {
    Continue,
    TerminalNegative,
    CachedNegative,
    Outcome,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumCount, EnumIter, IntoStaticStr,
)]
pub enum ReasonCode {
    // Continue
    ServiceDateOk,
    ServiceTimeOk,
    RouteDateOk,
    NumChangesOk,
    TimeOk,
    HourOk,
    Reachable,
    DurationOk,
    WalkOk,
    StationOpen,
    Continue,
    NumWalkingConnectionsOk,
    NeighbourConnectionsOk,
    TransportModeOk,
    InterchangesOk,
    PathLengthOk,
    SameTripOk,
    PreviousCacheMiss,

    // Terminal
    ReturnedToStart,
    PathTooLong,
    TooManyChanges,
    TooManyWalkingConnections,
    TooManyNeighbourConnections,
    NotOnQueryDate,
    RouteNotOnQueryDate,
    NotAtHour,
    DoesNotOperateOnTime,
    AlreadyDeparted,
    ServiceNotRunningAtTime,
    TookTooLong,
    StationClosed,
    TooManyRouteChangesRequired,
    TooManyInterchangesRequired,
    AlreadySeenStation,
    TransportModeWrong,
    SameTrip,
    NotReachable,
    InterchangeUnreachable,
    HigherCost,
    TimedOut,

    // Cached
    CachedUnknown,
    CachedNotAtHour,
    CachedDoesNotOperateOnTime,
    CachedTooManyRouteChangesRequired,
    CachedRouteNotOnQueryDate,
    CachedNotOnQueryDate,
    CachedTooManyInterchangesRequired,

    // Outcome
    Arrived,
    OnTram,
    OnBus,
    OnTrain,
    OnWalk,
    NotOnVehicle,
}

impl ReasonCode {
    pub fn group(&self) -> ReasonGroup {
        use ReasonCode::*;
        match self {
            ServiceDateOk | ServiceTimeOk | RouteDateOk | NumChangesOk | TimeOk | HourOk
            | Reachable | DurationOk | WalkOk | StationOpen | Continue
            | NumWalkingConnectionsOk | NeighbourConnectionsOk | TransportModeOk
            | InterchangesOk | PathLengthOk | SameTripOk | PreviousCacheMiss => {
                ReasonGroup::Continue
            }

            ReturnedToStart | PathTooLong | TooManyChanges | TooManyWalkingConnections
            | TooManyNeighbourConnections | NotOnQueryDate | RouteNotOnQueryDate | NotAtHour
            | DoesNotOperateOnTime | AlreadyDeparted | ServiceNotRunningAtTime | TookTooLong
            | StationClosed | TooManyRouteChangesRequired | TooManyInterchangesRequired
            | AlreadySeenStation | TransportModeWrong | SameTrip | NotReachable
            | InterchangeUnreachable | HigherCost | TimedOut => ReasonGroup::TerminalNegative,

            CachedUnknown | CachedNotAtHour | CachedDoesNotOperateOnTime
            | CachedTooManyRouteChangesRequired | CachedRouteNotOnQueryDate
            | CachedNotOnQueryDate | CachedTooManyInterchangesRequired => {
                ReasonGroup::CachedNegative
            }

            Arrived | OnTram | OnBus | OnTrain | OnWalk | NotOnVehicle => ReasonGroup::Outcome,
        }
    }

    /// True for codes that end a path.
    pub fn is_negative(&self) -> bool {
        matches!(
            self.group(),
            ReasonGroup::TerminalNegative | ReasonGroup::CachedNegative
        )
    }

    /// The cached code that stands in for this one on a repeat visit.
    ///
    /// Only verdicts that depend on nothing but the node, the time, the
    /// boardings so far and whether the path is on a trip have one.
    pub fn cached_counterpart(&self) -> Option<ReasonCode> {
        use ReasonCode::*;
        match self {
            NotAtHour => Some(CachedNotAtHour),
            DoesNotOperateOnTime => Some(CachedDoesNotOperateOnTime),
            TooManyRouteChangesRequired => Some(CachedTooManyRouteChangesRequired),
            RouteNotOnQueryDate => Some(CachedRouteNotOnQueryDate),
            NotOnQueryDate => Some(CachedNotOnQueryDate),
            TooManyInterchangesRequired => Some(CachedTooManyInterchangesRequired),
            _ => None,
        }
    }

    /// The terminal code a cached code stands in for.
    pub fn shadows(&self) -> Option<ReasonCode> {
        use ReasonCode::*;
        match self {
            CachedNotAtHour => Some(NotAtHour),
            CachedDoesNotOperateOnTime => Some(DoesNotOperateOnTime),
            CachedTooManyRouteChangesRequired => Some(TooManyRouteChangesRequired),
            CachedRouteNotOnQueryDate => Some(RouteNotOnQueryDate),
            CachedNotOnQueryDate => Some(NotOnQueryDate),
            CachedTooManyInterchangesRequired => Some(TooManyInterchangesRequired),
            _ => None,
        }
    }

    /// Outcome code counting a step made in `mode`.
    pub fn for_mode(mode: TransportMode) -> Result<ReasonCode, DiagnosticsError> {
        match mode {
            TransportMode::Tram => Ok(ReasonCode::OnTram),
            TransportMode::Bus => Ok(ReasonCode::OnBus),
            TransportMode::Train => Ok(ReasonCode::OnTrain),
            TransportMode::Walk => Ok(ReasonCode::OnWalk),
            TransportMode::NotSet => Ok(ReasonCode::NotOnVehicle),
            TransportMode::Unknown => Err(DiagnosticsError::UnknownTransportMode),
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn groups_partition_codes() {
        let count = |group| ReasonCode::iter().filter(|code| code.group() == group).count();
        assert_eq!(count(ReasonGroup::Continue), 18);
        assert_eq!(count(ReasonGroup::TerminalNegative), 22);
        assert_eq!(count(ReasonGroup::CachedNegative), 7);
        assert_eq!(count(ReasonGroup::Outcome), 6);
        assert_eq!(ReasonCode::COUNT, 53);
    }

    #[test]
    fn every_cached_code_but_unknown_shadows_one_terminal_code() {
        for code in ReasonCode::iter().filter(|c| c.group() == ReasonGroup::CachedNegative) {
            match code.shadows() {
                None => assert_eq!(code, ReasonCode::CachedUnknown),
                Some(original) => {
                    assert_eq!(original.group(), ReasonGroup::TerminalNegative);
                    assert_eq!(original.cached_counterpart(), Some(code));
                }
            }
        }
    }

    #[test]
    fn closures_and_walk_limits_are_never_cached() {
        for code in [
            ReasonCode::StationClosed,
            ReasonCode::TooManyWalkingConnections,
            ReasonCode::TooManyNeighbourConnections,
            ReasonCode::HigherCost,
            ReasonCode::TimedOut,
        ] {
            assert_eq!(code.cached_counterpart(), None);
        }
    }

    #[test]
    fn counterparts_exist_only_for_terminal_codes() {
        for code in ReasonCode::iter() {
            if code.cached_counterpart().is_some() {
                assert_eq!(code.group(), ReasonGroup::TerminalNegative);
            }
        }
    }

    #[test]
    fn negative_codes() {
        assert!(ReasonCode::CachedUnknown.is_negative());
        assert!(ReasonCode::TimedOut.is_negative());
        assert!(!ReasonCode::Arrived.is_negative());
        assert!(!ReasonCode::PreviousCacheMiss.is_negative());
    }

    #[test]
    fn mode_outcomes() {
        assert_eq!(
            ReasonCode::for_mode(TransportMode::Bus).unwrap(),
            ReasonCode::OnBus
        );
        assert_eq!(
            ReasonCode::for_mode(TransportMode::NotSet).unwrap(),
            ReasonCode::NotOnVehicle
        );
        assert!(matches!(
            ReasonCode::for_mode(TransportMode::Unknown),
            Err(DiagnosticsError::UnknownTransportMode)
        ));
    }

    #[test]
    fn indices_are_dense() {
        for (position, code) in ReasonCode::iter().enumerate() {
            assert_eq!(code.index(), position);
        }
    }
}
