//! Web front end for batch travel-time runs.
//!
//! Upload a trip file, watch the table fill in as trips are routed, cancel
//! if needed, and download the results as CSV.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Job, JobSnapshot, RouterSource};
pub use templates::*;
