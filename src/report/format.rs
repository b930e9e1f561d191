//! Plain-text formatting helpers.

use crate::app::pipeline::TrainOutput;
use crate::codec::{CategoricalColumn, FEATURE_COUNT};
use crate::domain::TrainConfig;
use crate::fit::Evaluation;

/// How many skipped rows are listed before the rest are summarized.
const MAX_ROW_ERRORS_SHOWN: usize = 5;

/// Summary printed after `fare train`.
pub fn format_training_summary(run: &TrainOutput, config: &TrainConfig) -> String {
    let mut out = String::new();
    let stats = &run.ingest.stats;

    out.push_str("=== fare - airline price model ===\n");
    out.push_str(&format!("Data: {}\n", config.data_path.display()));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        run.ingest.rows_read,
        run.ingest.rows_used,
        run.ingest.row_errors.len()
    ));
    for e in run.ingest.row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if run.ingest.row_errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!(
            "  ... and {} more\n",
            run.ingest.row_errors.len() - MAX_ROW_ERRORS_SHOWN
        ));
    }
    out.push_str(&format!(
        "Price: min={:.2} max={:.2} mean={:.2} CAD\n",
        stats.price_min, stats.price_max, stats.price_mean
    ));
    out.push_str(&format!(
        "Days left: [{}, {}]\n",
        stats.days_left_min, stats.days_left_max
    ));
    let legs: Vec<String> = run
        .ingest
        .stopover_leg_counts()
        .iter()
        .enumerate()
        .map(|(n, count)| format!("{n}={count}"))
        .collect();
    out.push_str(&format!("Stopover legs: {}\n", legs.join(" ")));
    out.push_str(&format!(
        "Operated by partner: {} of {} rows\n",
        run.ingest.operated_by_partner(),
        run.ingest.rows_used
    ));

    out.push_str("\nVocabularies:\n");
    for encoder in run.codec.encoders() {
        out.push_str(&format!("- {:<16} {}\n", encoder.column().header(), encoder.len()));
    }

    let params = run.model.params();
    out.push_str("\nModel:\n");
    out.push_str(&format!(
        "- gradient boosted trees: estimators={} max_depth={} learning_rate={}\n",
        params.n_estimators, params.max_depth, params.learning_rate
    ));
    out.push_str(&format!(
        "- features={} train={} test={} (seed {})\n",
        FEATURE_COUNT, run.n_train, run.n_test, params.seed
    ));
    match &run.evaluation {
        Some(e) => out.push_str(&format!("Mean Absolute Error: {:.2} (RMSE {:.2})\n", e.mae, e.rmse)),
        None => out.push_str("Mean Absolute Error: n/a (no held-out rows)\n"),
    }

    if !run.written.is_empty() {
        out.push_str(&format!("\nArtifacts ({}):\n", config.artifact_dir.display()));
        for path in &run.written {
            out.push_str(&format!("- {}\n", path.display()));
        }
    }

    out
}

pub fn format_prediction(price: f64) -> String {
    format!("Predicted Price: CAD {price:.2}")
}

/// Held-out accuracy recorded with the model, shown next to a prediction.
pub fn format_model_accuracy(evaluation: Option<&Evaluation>) -> String {
    match evaluation {
        Some(e) => format!("Model MAE: CAD {:.2} (held-out rows: {})", e.mae, e.n),
        None => "Model MAE: n/a".to_string(),
    }
}

/// One block per column, values in code order.
pub fn format_vocabulary<'a, I>(columns: I) -> String
where
    I: IntoIterator<Item = (CategoricalColumn, &'a [String])>,
{
    let mut out = String::new();
    for (column, values) in columns {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("{} ({}):\n", column.header(), values.len()));
        for (code, value) in values.iter().enumerate() {
            out.push_str(&format!("{code:>4}  {value}\n"));
        }
    }
    out
}
