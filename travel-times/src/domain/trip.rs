//! Trip requests and the queries derived from them.

use chrono::{DateTime, TimeZone, Utc};

use super::departure::{DepartureError, resolve_departure};
use super::mode::TravelMode;

/// One row of trip data, as typed by the user.
///
/// `origin` and `destination` are guaranteed non-empty by the loader.
/// The optional fields are `None` when their column is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub mode_label: String,
    pub departure_clock: Option<String>,
    pub departure_weekday: Option<String>,
}

impl TripRequest {
    /// Create a request with no departure time.
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        mode_label: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            mode_label: mode_label.into(),
            departure_clock: None,
            departure_weekday: None,
        }
    }

    /// Set the departure clock time ("HH:MM").
    pub fn with_clock(mut self, clock: impl Into<String>) -> Self {
        self.departure_clock = Some(clock.into());
        self
    }

    /// Set the departure weekday name.
    pub fn with_weekday(mut self, weekday: impl Into<String>) -> Self {
        self.departure_weekday = Some(weekday.into());
        self
    }

    /// The weekday, if present and not blank.
    pub fn weekday(&self) -> Option<&str> {
        self.departure_weekday
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}

/// A routing query ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub origin: String,
    pub destination: String,
    pub mode: TravelMode,
    /// Absent when the trip had no departure clock time.
    pub departure: Option<DateTime<Utc>>,
    /// True only for driving with a departure instant.
    pub use_traffic_model: bool,
}

impl ResolvedQuery {
    /// Resolve a request against the current time.
    ///
    /// Fails only when the departure clock value is malformed (or names a
    /// local time that does not exist); unknown modes and weekdays fall
    /// back silently.
    pub fn resolve<Tz: TimeZone>(
        request: &TripRequest,
        now: &DateTime<Tz>,
    ) -> Result<Self, DepartureError> {
        let mode = TravelMode::from_label(&request.mode_label);
        let departure = resolve_departure(
            now,
            request.departure_weekday.as_deref(),
            request.departure_clock.as_deref(),
        )?
        .map(|dt| dt.with_timezone(&Utc));

        Ok(Self {
            origin: request.origin.clone(),
            destination: request.destination.clone(),
            mode,
            use_traffic_model: mode.supports_traffic() && departure.is_some(),
            departure,
        })
    }
}
