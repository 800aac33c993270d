//! Routing service access (Google Distance Matrix).
//!
//! This module provides the [`TripRouter`] seam the batch runs against,
//! an HTTP implementation backed by the Distance Matrix API, and a mock
//! implementation serving canned responses.
//!
//! Key characteristics of the Distance Matrix API:
//! - Failures come in two layers: a top-level `status` for the request
//!   and a per-element `status` for each origin/destination pair
//! - HTTP status is 200 even for rejected requests (bad key, quota)
//! - `duration_in_traffic` is only returned for driving queries that carry
//!   a `departure_time`

mod client;
mod convert;
mod error;
mod mock;
mod types;

use std::future::Future;

use crate::domain::{ResolvedQuery, TripOutcome};

pub use client::{MapsClient, MapsConfig};
pub use convert::classify_response;
pub use error::MapsError;
pub use mock::{MockMapsClient, MockReply};
pub use types::{DistanceMatrixResponse, MatrixElement, MatrixRow, TextValue};

/// Something that can route one trip.
///
/// Implementations must never fail: every error is folded into the
/// returned outcome so a batch always completes.
pub trait TripRouter {
    /// Route a single query. Issues at most one upstream request.
    fn route(&self, query: &ResolvedQuery) -> impl Future<Output = TripOutcome> + Send;
}
