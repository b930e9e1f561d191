//! Shared training pipeline used by the `fare train` command and by tests.
//!
//! ingest -> fit encoders -> assemble features -> split -> fit model -> evaluate -> persist

use std::path::PathBuf;

use tracing::{info, warn};

use crate::codec::FeatureCodec;
use crate::domain::{MAX_DAYS_LEFT, TrainConfig};
use crate::error::AppError;
use crate::fit::{Evaluation, evaluate, take_rows, train_test_split};
use crate::io::artifacts::write_artifacts;
use crate::io::ingest::{IngestedData, load_training_rows};
use crate::models::{PriceModel, Regressor};

/// All computed outputs of a single training run.
#[derive(Debug)]
pub struct TrainOutput {
    pub ingest: IngestedData,
    pub codec: FeatureCodec,
    pub model: PriceModel,
    pub n_train: usize,
    pub n_test: usize,
    /// `None` when the held-out split is empty.
    pub evaluation: Option<Evaluation>,
    /// Files written to the artifact directory.
    pub written: Vec<PathBuf>,
}

/// Read the CSV, train, evaluate and write every artifact.
pub fn run_training(config: &TrainConfig) -> Result<TrainOutput, AppError> {
    let ingest = load_training_rows(&config.data_path)?;
    let mut output = train_on(ingest, config)?;

    output.written = write_artifacts(
        &config.artifact_dir,
        &output.codec,
        &output.model,
        output.evaluation.as_ref(),
    )?;

    Ok(output)
}

/// Train on already-ingested rows without touching the filesystem.
pub fn train_on(ingest: IngestedData, config: &TrainConfig) -> Result<TrainOutput, AppError> {
    if !(0.0..1.0).contains(&config.test_size) {
        return Err(AppError::new(
            2,
            format!("Test size must be in [0, 1), got {}.", config.test_size),
        ));
    }

    let stats = &ingest.stats;
    if stats.days_left_min < 0 || stats.days_left_max > MAX_DAYS_LEFT {
        warn!(
            min = stats.days_left_min,
            max = stats.days_left_max,
            "training days_left extends past the range queries are clamped to"
        );
    }

    // Encoders see every row, so the held-out rows never hit an unknown category.
    let records = ingest.records();
    let codec = FeatureCodec::fit(&records)?;
    for encoder in codec.encoders() {
        info!(column = encoder.column().header(), classes = encoder.len(), "fitted encoder");
    }

    let x = codec.assemble_batch(&records)?;
    let y = ingest.prices();

    let split = train_test_split(x.len(), config.test_size, config.params.seed);
    let (x_train, y_train) = (take_rows(&x, &split.train), take_rows(&y, &split.train));
    let (x_test, y_test) = (take_rows(&x, &split.test), take_rows(&y, &split.test));
    info!(train = x_train.len(), test = x_test.len(), "split dataset");

    let model = PriceModel::fit(&x_train, &y_train, &config.params)?;

    let evaluation = evaluate(&y_test, &model.predict_batch(&x_test));
    match &evaluation {
        Some(e) => info!(mae = e.mae, rmse = e.rmse, n = e.n, "held-out evaluation"),
        None => warn!("no held-out rows; skipping evaluation"),
    }

    Ok(TrainOutput {
        ingest,
        codec,
        model,
        n_train: x_train.len(),
        n_test: x_test.len(),
        evaluation,
        written: Vec::new(),
    })
}
