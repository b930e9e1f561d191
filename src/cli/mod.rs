//! Command-line parsing for the `fare` price predictor.
//!
//! Parsing and dispatch live apart from the codec and model code; `app` turns
//! these structs into library calls.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};

use crate::codec::{CategoricalColumn, parse_clock_12h};
use crate::domain::MAX_DAYS_LEFT;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fare", version, about = "Airline ticket price predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit encoders and the price model on a flight CSV and write the artifacts.
    Train(TrainArgs),
    /// Predict the price of one flight from saved artifacts.
    Predict(PredictArgs),
    /// List the known values of the categorical inputs.
    Vocab(VocabArgs),
    /// Write a synthetic flight-price CSV.
    Synth(SynthArgs),
}

/// Where artifacts are read from or written to.
#[derive(Debug, Args, Clone)]
pub struct ArtifactArgs {
    #[arg(long = "artifacts", env = "FARE_ARTIFACT_DIR", default_value = "model", value_name = "DIR")]
    pub dir: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    /// Training CSV (scraped flight-price layout).
    #[arg(long, value_name = "CSV")]
    pub data: PathBuf,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Seed for the train/test split.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Held-out fraction for the MAE report.
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Number of boosting rounds.
    #[arg(long, default_value_t = 100)]
    pub estimators: usize,

    #[arg(long, default_value_t = 6)]
    pub max_depth: u32,

    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[arg(long)]
    pub airline: String,

    /// Origin airport.
    #[arg(long)]
    pub source: String,

    #[arg(long)]
    pub destination: String,

    /// Stop category exactly as in the training data (e.g. "non-stop", "1-stop").
    #[arg(long)]
    pub stops: String,

    /// Cabin class (e.g. "Economy", "Business").
    #[arg(long)]
    pub class: String,

    /// Departure time, `HH:MM` (24h) or `h:MM AM/PM`.
    #[arg(long, value_parser = parse_clock_arg)]
    pub departure: NaiveTime,

    /// Arrival time, `HH:MM` (24h) or `h:MM AM/PM`.
    #[arg(long, value_parser = parse_clock_arg)]
    pub arrival: NaiveTime,

    /// Flight date, `YYYY-MM-DD`.
    #[arg(long, value_parser = parse_date_arg)]
    pub date: NaiveDate,

    /// Total stopover time, e.g. "3h 25m" or "45m".
    #[arg(long, default_value = "0")]
    pub stopover: String,

    /// Days between booking and departure.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(i64).range(0..=MAX_DAYS_LEFT))]
    pub days_left: i64,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

#[derive(Debug, Args, Clone)]
pub struct VocabArgs {
    /// Only list this column.
    #[arg(long, value_enum)]
    pub column: Option<CategoricalColumn>,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    #[arg(long, default_value_t = 1000)]
    pub rows: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

fn parse_clock_arg(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .or_else(|_| parse_clock_12h(s))
        .map_err(|_| format!("expected HH:MM or h:MM AM/PM, got '{s}'"))
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD ({e})"))
}
