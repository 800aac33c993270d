//! Wall-clock departure times.
//!
//! Trip sheets give departure times as "HH:MM" strings. Spreadsheet
//! software frequently drops the leading zero, so "8:00" is accepted too.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;

/// Error returned when parsing an invalid clock string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("heure de départ invalide '{input}': {reason}")]
pub struct ClockError {
    input: String,
    reason: &'static str,
}

impl ClockError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }

    /// The rejected input, as given.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A time of day with minute precision.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    /// Create a clock time, validating the ranges.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Parse "HH:MM" (or "H:MM"), ignoring surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use travel_times::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse_hhmm("08:00").is_ok());
    /// assert!(ClockTime::parse_hhmm(" 8:00 ").is_ok());
    /// assert!(ClockTime::parse_hhmm("23:59").is_ok());
    ///
    /// assert!(ClockTime::parse_hhmm("0800").is_err());
    /// assert!(ClockTime::parse_hhmm("24:00").is_err());
    /// assert!(ClockTime::parse_hhmm("12:60").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, ClockError> {
        let trimmed = s.trim();

        let (hours, minutes) = trimmed
            .split_once(':')
            .ok_or_else(|| ClockError::new(s, "expected HH:MM format"))?;

        if hours.is_empty() || hours.len() > 2 {
            return Err(ClockError::new(s, "expected one or two hour digits"));
        }
        if minutes.len() != 2 {
            return Err(ClockError::new(s, "expected two minute digits"));
        }

        let hour = parse_digits(hours).ok_or_else(|| ClockError::new(s, "invalid hour digits"))?;
        if hour > 23 {
            return Err(ClockError::new(s, "hour must be 0-23"));
        }

        let minute =
            parse_digits(minutes).ok_or_else(|| ClockError::new(s, "invalid minute digits"))?;
        if minute > 59 {
            return Err(ClockError::new(s, "minute must be 0-59"));
        }

        Ok(Self { hour, minute })
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Converts to a `NaiveTime` with zero seconds.
    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

/// Parse ASCII digits only, rejecting signs and whitespace that
/// `str::parse` would otherwise let through.
fn parse_digits(s: &str) -> Option<u32> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for ClockTime {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hhmm(s)
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour, self.minute)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
