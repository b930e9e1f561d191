//! Gradient-boosted tree regressor for ticket prices.
//!
//! The learning algorithm belongs to the `gbdt` crate. This wrapper pins the
//! contract the rest of the crate relies on:
//! - input is always a 14-field [`FeatureVector`]
//! - output is a single price in CAD
//! - training is reproducible (row/feature subsampling disabled)

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::codec::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
use crate::domain::ModelParams;

/// Rows per `gbdt` predict call when scoring in parallel.
const PREDICT_CHUNK: usize = 512;

/// Anything that turns a feature vector into a price.
pub trait Regressor {
    fn predict(&self, x: &FeatureVector) -> f64;

    fn predict_batch(&self, xs: &[FeatureVector]) -> Vec<f64> {
        xs.iter().map(|x| self.predict(x)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Cannot train on an empty dataset")]
    EmptyTrainingSet,
    #[error("Feature rows ({rows}) and targets ({targets}) differ in length")]
    LengthMismatch { rows: usize, targets: usize },
    #[error("Non-finite price at row {0}")]
    NonFiniteTarget(usize),
    #[error("Invalid model parameters: {0}")]
    InvalidParams(String),
}

/// A fitted price model.
#[derive(Serialize, Deserialize)]
pub struct PriceModel {
    params: ModelParams,
    feature_names: Vec<String>,
    trained_rows: usize,
    booster: GBDT,
}

impl std::fmt::Debug for PriceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceModel")
            .field("params", &self.params)
            .field("feature_names", &self.feature_names)
            .field("trained_rows", &self.trained_rows)
            .finish_non_exhaustive()
    }
}

impl PriceModel {
    /// Fit a squared-error GBDT on assembled features.
    pub fn fit(x: &[FeatureVector], y: &[f64], params: &ModelParams) -> Result<Self, ModelError> {
        if x.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if x.len() != y.len() {
            return Err(ModelError::LengthMismatch {
                rows: x.len(),
                targets: y.len(),
            });
        }
        if let Some(idx) = y.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteTarget(idx));
        }
        validate_params(params)?;

        let mut cfg = Config::new();
        cfg.set_feature_size(FEATURE_COUNT);
        cfg.set_iterations(params.n_estimators);
        cfg.set_max_depth(params.max_depth);
        cfg.set_shrinkage(params.learning_rate as ValueType);
        cfg.set_min_leaf_size(params.min_leaf_size);
        cfg.set_loss("SquaredError");
        cfg.set_debug(false);
        // Full row and feature sampling keeps the fit free of internal randomness.
        cfg.set_data_sample_ratio(1.0);
        cfg.set_feature_sample_ratio(1.0);
        cfg.set_training_optimization_level(2);

        let mut train: DataVec = x
            .iter()
            .zip(y)
            .map(|(row, &label)| Data::new_training_data(to_values(row), 1.0, label as ValueType, None))
            .collect();

        debug!(rows = train.len(), ?params, "fitting gradient boosted trees");
        let mut booster = GBDT::new(&cfg);
        booster.fit(&mut train);
        info!(rows = x.len(), estimators = params.n_estimators, "model fitted");

        Ok(Self {
            params: *params,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            trained_rows: x.len(),
            booster,
        })
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Feature names the model was trained against, in order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn trained_rows(&self) -> usize {
        self.trained_rows
    }

    fn predict_values(&self, xs: &[FeatureVector]) -> Vec<f64> {
        let data: DataVec = xs
            .iter()
            .map(|x| Data::new_test_data(to_values(x), None))
            .collect();
        self.booster
            .predict(&data)
            .into_iter()
            .map(f64::from)
            .collect()
    }
}

impl Regressor for PriceModel {
    fn predict(&self, x: &FeatureVector) -> f64 {
        self.predict_values(std::slice::from_ref(x))
            .first()
            .copied()
            .unwrap_or(f64::NAN)
    }

    fn predict_batch(&self, xs: &[FeatureVector]) -> Vec<f64> {
        xs.par_chunks(PREDICT_CHUNK)
            .flat_map_iter(|chunk| self.predict_values(chunk))
            .collect()
    }
}

fn validate_params(params: &ModelParams) -> Result<(), ModelError> {
    if params.n_estimators == 0 {
        return Err(ModelError::InvalidParams("estimator count must be > 0".into()));
    }
    if params.max_depth == 0 {
        return Err(ModelError::InvalidParams("max depth must be > 0".into()));
    }
    if !(params.learning_rate.is_finite() && params.learning_rate > 0.0) {
        return Err(ModelError::InvalidParams("learning rate must be finite and > 0".into()));
    }
    if params.min_leaf_size == 0 {
        return Err(ModelError::InvalidParams("minimum leaf size must be > 0".into()));
    }
    Ok(())
}

fn to_values(x: &FeatureVector) -> Vec<ValueType> {
    x.as_slice().iter().map(|&v| v as ValueType).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_data() -> (Vec<FeatureVector>, Vec<f64>) {
        // Price depends on class (field 4) and days left (field 13).
        let mut x = Vec::new();
        let mut y = Vec::new();
        for class in 0..2 {
            for days in 0..30 {
                let mut row = [0.0; FEATURE_COUNT];
                row[4] = class as f64;
                row[13] = days as f64;
                x.push(FeatureVector::from(row));
                y.push(200.0 + 400.0 * class as f64 - 3.0 * days as f64);
            }
        }
        (x, y)
    }

    #[test]
    fn fit_learns_class_effect() {
        let (x, y) = toy_data();
        let model = PriceModel::fit(&x, &y, &ModelParams::default()).unwrap();
        let economy = model.predict(&x[10]);
        let business = model.predict(&x[40]);
        assert!(economy.is_finite() && business.is_finite());
        assert!(business > economy + 200.0, "business={business} economy={economy}");
        assert_eq!(model.trained_rows(), 60);
        assert_eq!(model.feature_names().len(), FEATURE_COUNT);
    }

    #[test]
    fn batch_matches_single_predictions() {
        let (x, y) = toy_data();
        let model = PriceModel::fit(&x, &y, &ModelParams::default()).unwrap();
        let batch = model.predict_batch(&x);
        assert_eq!(batch.len(), x.len());
        for (row, p) in x.iter().zip(&batch) {
            assert_eq!(model.predict(row), *p);
        }
    }

    #[test]
    fn refitting_is_reproducible() {
        let (x, y) = toy_data();
        let a = PriceModel::fit(&x, &y, &ModelParams::default()).unwrap();
        let b = PriceModel::fit(&x, &y, &ModelParams::default()).unwrap();
        assert_eq!(a.predict_batch(&x), b.predict_batch(&x));
    }

    #[test]
    fn rejects_bad_inputs() {
        let (x, y) = toy_data();
        let params = ModelParams::default();
        assert_eq!(PriceModel::fit(&[], &[], &params).unwrap_err(), ModelError::EmptyTrainingSet);
        assert!(matches!(
            PriceModel::fit(&x, &y[..3], &params),
            Err(ModelError::LengthMismatch { rows: 60, targets: 3 })
        ));
        let mut bad_y = y.clone();
        bad_y[5] = f64::NAN;
        assert_eq!(PriceModel::fit(&x, &bad_y, &params).unwrap_err(), ModelError::NonFiniteTarget(5));
        let zero_trees = ModelParams {
            n_estimators: 0,
            ..params
        };
        assert!(matches!(PriceModel::fit(&x, &y, &zero_trees), Err(ModelError::InvalidParams(_))));
    }
}
