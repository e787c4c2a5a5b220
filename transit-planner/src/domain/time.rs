//! Time-of-day handling for timetabled services.
//!
//! Timetables describe departures as "HH:MM" within a service day. Services
//! that run past midnight carry on into the following day, so a `TramTime`
//! covers two consecutive days: "00:15" of the next day is written
//! "00:15+24" and sorts after "23:59".

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Minutes in one service day.
const MINUTES_PER_DAY: u16 = 24 * 60;

/// Suffix marking a time on the following day.
const NEXT_DAY_SUFFIX: &str = "+24";

/// Error returned when parsing or building an invalid time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day within a two-day service window.
///
/// Ordering and arithmetic treat next-day times as later than every
/// same-day time.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::TramTime;
///
/// let late = TramTime::parse_hhmm("23:50").unwrap();
/// let after_midnight = TramTime::parse_hhmm("00:10+24").unwrap();
/// assert!(after_midnight > late);
/// assert_eq!(after_midnight.to_string(), "00:10+24");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TramTime {
    minutes: u16,
}

impl TramTime {
    /// Earliest representable time (midnight at the start of the service day).
    pub const MIDNIGHT: TramTime = TramTime { minutes: 0 };

    /// Create a same-day time.
    pub fn of(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        Ok(Self {
            minutes: (hour * 60 + minute) as u16,
        })
    }

    /// Create a time on the following day.
    pub fn next_day(hour: u32, minute: u32) -> Result<Self, TimeError> {
        let same_day = Self::of(hour, minute)?;
        Ok(Self {
            minutes: same_day.minutes + MINUTES_PER_DAY,
        })
    }

    /// Create a time from minutes since midnight of the service day.
    pub fn from_minutes(minutes: u32) -> Result<Self, TimeError> {
        if minutes >= u32::from(MINUTES_PER_DAY) * 2 {
            return Err(TimeError::new("beyond the end of the following day"));
        }
        Ok(Self {
            minutes: minutes as u16,
        })
    }

    /// Parse "HH:MM", or "HH:MM+24" for the following day.
    ///
    /// ```
    /// use transit_planner::domain::TramTime;
    ///
    /// assert!(TramTime::parse_hhmm("00:00").is_ok());
    /// assert!(TramTime::parse_hhmm("23:59").is_ok());
    /// assert!(TramTime::parse_hhmm("01:30+24").is_ok());
    ///
    /// assert!(TramTime::parse_hhmm("1430").is_err());
    /// assert!(TramTime::parse_hhmm("14:3").is_err());
    /// assert!(TramTime::parse_hhmm("25:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let (clock, next_day) = match s.strip_suffix(NEXT_DAY_SUFFIX) {
            Some(clock) => (clock, true),
            None => (s, false),
        };

        if clock.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = clock.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;

        if next_day {
            Self::next_day(hour, minute)
        } else {
            Self::of(hour, minute)
        }
    }

    /// Hour counted from midnight of the service day (24-47 on the next day).
    pub fn hour(&self) -> u32 {
        u32::from(self.minutes / 60)
    }

    /// Minute within the hour (0-59).
    pub fn minute(&self) -> u32 {
        u32::from(self.minutes % 60)
    }

    /// Minutes since midnight of the service day.
    pub fn minutes_of_day(&self) -> u32 {
        u32::from(self.minutes)
    }

    /// True when the time falls on the day after the service day.
    pub fn is_next_day(&self) -> bool {
        self.minutes >= MINUTES_PER_DAY
    }

    /// Wall-clock time, discarding the day offset.
    pub fn to_naive_time(&self) -> NaiveTime {
        let of_day = u32::from(self.minutes % MINUTES_PER_DAY);
        NaiveTime::from_hms_opt(of_day / 60, of_day % 60, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Add a duration, returning `None` if the result leaves the window.
    ///
    /// Seconds are truncated; timetables have minute resolution.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        let total = i64::from(self.minutes) + duration.num_minutes();
        if total < 0 {
            return None;
        }
        Self::from_minutes(u32::try_from(total).ok()?).ok()
    }

    /// Subtract a duration, returning `None` if the result leaves the window.
    pub fn checked_sub(&self, duration: Duration) -> Option<Self> {
        self.checked_add(-duration)
    }

    /// Returns the duration between two times.
    ///
    /// Returns a negative duration if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        Duration::minutes(i64::from(self.minutes) - i64::from(other.minutes))
    }

    /// True when `self` lies in the inclusive range `[start, end]`.
    pub fn between(&self, start: TramTime, end: TramTime) -> bool {
        *self >= start && *self <= end
    }
}

impl Add<Duration> for TramTime {
    type Output = Self;

    /// Saturates at the end of the following day.
    fn add(self, rhs: Duration) -> Self::Output {
        self.checked_add(rhs).unwrap_or(TramTime {
            minutes: MINUTES_PER_DAY * 2 - 1,
        })
    }
}

impl fmt::Debug for TramTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TramTime({self})")
    }
}

impl fmt::Display for TramTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let of_day = self.minutes % MINUTES_PER_DAY;
        write!(f, "{:02}:{:02}", of_day / 60, of_day % 60)?;
        if self.is_next_day() {
            f.write_str(NEXT_DAY_SUFFIX)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for TramTime {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hhmm(&value)
    }
}

impl From<TramTime> for String {
    fn from(value: TramTime) -> Self {
        value.to_string()
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
