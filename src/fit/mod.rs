//! Training support.
//!
//! Responsibilities:
//!
//! - seeded train/test partitioning
//! - held-out error metrics (MAE, RMSE)

pub mod metrics;
pub mod split;

pub use metrics::*;
pub use split::*;
