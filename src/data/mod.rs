//! Dataset sources beyond the scraped CSV.

pub mod synth;

pub use synth::{SynthConfig, SyntheticFlight, generate_flights, write_flights_csv};
