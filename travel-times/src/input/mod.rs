//! Trip file loading.
//!
//! Trip files are spreadsheet exports: a header row followed by one trip
//! per row. Only the origin, destination and transport mode columns are
//! required; departure time and weekday are optional. All columns,
//! including unknown ones, are kept verbatim so results can be written
//! back next to the original data.

mod error;
mod loader;

pub use error::LoadError;
pub use loader::{
    COL_DEPARTURE, COL_DEPARTURE_LEGACY, COL_DESTINATION, COL_MODE, COL_ORIGIN, COL_WEEKDAY,
    REQUIRED_COLUMNS, TripRow, TripTable,
};
