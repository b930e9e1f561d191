//! Formatted terminal output for training runs, predictions and vocabularies.
//!
//! Formatting is kept out of the pipeline so the library never prints.

pub mod format;

pub use format::*;
