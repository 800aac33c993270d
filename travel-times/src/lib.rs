//! Batch travel-time calculator.
//!
//! Reads a CSV of trips (origin, destination, transport mode, optional
//! departure time and weekday), asks the Google Distance Matrix API for the
//! travel time and distance of each one, and writes the results back as a
//! CSV. Trips are routed one at a time with a pause in between; a failed
//! trip is recorded and the batch carries on.

pub mod batch;
pub mod domain;
pub mod input;
pub mod maps;
pub mod results;
pub mod web;
