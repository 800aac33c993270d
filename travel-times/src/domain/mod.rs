//! Domain types for batch travel-time estimation.
//!
//! This module holds the pure logic of a trip: how a free-text transport
//! mode becomes a canonical one, how a weekday plus clock time becomes a
//! departure instant, and what a routing outcome looks like. Nothing here
//! performs I/O.

mod clock;
mod departure;
mod mode;
mod outcome;
mod trip;
mod weekday;

pub use clock::{ClockError, ClockTime};
pub use departure::{DepartureError, days_until, resolve_departure, target_date};
pub use mode::TravelMode;
pub use outcome::{ERROR_DISTANCE, ERROR_DURATION, SUCCESS_MARKER, TripOutcome, TripStatus};
pub use trip::{ResolvedQuery, TripRequest};
pub use weekday::parse_weekday;
