//! `airfare` library crate.
//!
//! Predicts airline ticket prices (CAD) from flight attributes with a
//! gradient-boosted tree model. The binary (`fare`) is a thin wrapper so that
//! training and serving stay testable without spawning processes.

pub mod app;
pub mod cli;
pub mod codec;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod models;
pub mod report;
pub mod serve;
