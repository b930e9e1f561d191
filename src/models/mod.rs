//! Price model.
//!
//! The regressor is consumed through the small [`Regressor`] trait so the
//! serving context can run against a stub in tests.

pub mod model;

pub use model::*;
