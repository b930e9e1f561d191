//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - dispatches to training, prediction, vocabulary listing or data synthesis
//! - prints reports

use std::fs::File;
use std::io::BufWriter;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, PredictArgs, SynthArgs, TrainArgs, VocabArgs};
use crate::codec::CategoricalColumn;
use crate::data::{SynthConfig, generate_flights, write_flights_csv};
use crate::domain::{ModelParams, QueryInput, TrainConfig};
use crate::error::AppError;
use crate::serve::ServingContext;

pub mod pipeline;

/// Entry point for the `fare` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Train(args) => handle_train(&args),
        Command::Predict(args) => handle_predict(args),
        Command::Vocab(args) => handle_vocab(&args),
        Command::Synth(args) => handle_synth(&args),
    }
}

/// Logs go to stderr so stdout carries only results. `RUST_LOG` overrides the
/// default `info` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_train(args: &TrainArgs) -> Result<(), AppError> {
    let config = train_config_from_args(args);
    let run = pipeline::run_training(&config)?;
    println!("{}", crate::report::format_training_summary(&run, &config));
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let ctx = ServingContext::load(&args.artifacts.dir)?;
    let query = QueryInput {
        airline: args.airline,
        source: args.source,
        destination: args.destination,
        number_of_stops: args.stops,
        class: args.class,
        departure: args.departure,
        arrival: args.arrival,
        flight_date: args.date,
        total_stopover: args.stopover,
        days_left: args.days_left,
    };
    let price = ctx.predict(&query)?;
    println!("{}", crate::report::format_prediction(price));
    println!("{}", crate::report::format_model_accuracy(ctx.evaluation()));
    Ok(())
}

fn handle_vocab(args: &VocabArgs) -> Result<(), AppError> {
    let codec = crate::io::artifacts::load_codec(&args.artifacts.dir)?;
    let columns: Vec<CategoricalColumn> = match args.column {
        Some(column) => vec![column],
        None => CategoricalColumn::ALL.to_vec(),
    };
    let text = crate::report::format_vocabulary(
        columns
            .into_iter()
            .map(|column| (column, codec.encoder(column).vocabulary())),
    );
    print!("{text}");
    Ok(())
}

fn handle_synth(args: &SynthArgs) -> Result<(), AppError> {
    let flights = generate_flights(&SynthConfig::new(args.rows, args.seed))?;
    let file = File::create(&args.out)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", args.out.display())))?;
    write_flights_csv(BufWriter::new(file), &flights)?;
    info!(rows = flights.len(), path = %args.out.display(), "wrote synthetic dataset");
    Ok(())
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        data_path: args.data.clone(),
        artifact_dir: args.artifacts.dir.clone(),
        test_size: args.test_size,
        params: ModelParams {
            n_estimators: args.estimators,
            max_depth: args.max_depth,
            learning_rate: args.learning_rate,
            seed: args.seed,
            ..ModelParams::default()
        },
    }
}
