//! Identifier types for transport entities.
//!
//! Identifiers come from timetable feeds as opaque strings. Each entity kind
//! gets its own newtype so a route id can never be passed where a station id
//! is expected. The string is shared (`Arc<str>`), so cloning an id during
//! search is a reference-count bump.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<Arc<str>>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Identifies a station (tram stop, bus stop or rail station).
    StationId
);
string_id!(
    /// Identifies a route: an ordered line served by one transport mode.
    RouteId
);
string_id!(
    /// Identifies a service: a calendar of operating days shared by trips.
    ServiceId
);
string_id!(
    /// Identifies a single timetabled vehicle run.
    TripId
);
string_id!(
    /// Identifies a named group of nearby stations.
    AreaId
);
