//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the logical flight shape shared by training and serving (`FlightRecord`)
//! - the serving-time query (`QueryInput`)
//! - resolved run configuration (`TrainConfig`)

pub mod types;

pub use types::*;
