//! Clock providers.

use chrono::{Local, NaiveDateTime};

use super::ProvidesNow;

/// The system clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvidesLocalNow;

impl ProvidesNow for ProvidesLocalNow {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedNow(pub NaiveDateTime);

impl ProvidesNow for FixedNow {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
