//! Input/output helpers.
//!
//! - training CSV ingest + validation (`ingest`)
//! - persisted model/encoder artifacts (`artifacts`)

pub mod artifacts;
pub mod ingest;

pub use artifacts::*;
pub use ingest::*;
