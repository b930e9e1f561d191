//! Serving context: load once, predict many.
//!
//! A [`ServingContext`] owns the fitted codec and model for the lifetime of the
//! process. It is built explicitly (usually from the artifact directory) and
//! never mutated, so every query sees the same vocabularies and trees.

use std::path::Path;

use tracing::{debug, warn};

use crate::codec::{CategoricalColumn, CodecError, FeatureCodec, FeatureVector};
use crate::domain::{FlightRecord, MAX_DAYS_LEFT, QueryInput};
use crate::fit::Evaluation;
use crate::io::artifacts::{ArtifactError, load_artifacts};
use crate::models::{PriceModel, Regressor};

pub struct ServingContext<M = PriceModel> {
    codec: FeatureCodec,
    model: M,
    evaluation: Option<Evaluation>,
}

impl ServingContext<PriceModel> {
    /// Load all artifacts from `dir`. Fails without a partial context.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let artifacts = load_artifacts(dir)?;
        Ok(Self {
            codec: artifacts.codec,
            model: artifacts.model,
            evaluation: artifacts.evaluation,
        })
    }
}

impl<M: Regressor> ServingContext<M> {
    pub fn new(codec: FeatureCodec, model: M) -> Self {
        Self {
            codec,
            model,
            evaluation: None,
        }
    }

    pub fn codec(&self) -> &FeatureCodec {
        &self.codec
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Held-out evaluation recorded at training time, if any.
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// Known values for a categorical input.
    pub fn vocabulary(&self, column: CategoricalColumn) -> &[String] {
        self.codec.encoder(column).vocabulary()
    }

    /// The feature vector a query is scored with.
    pub fn features(&self, query: &QueryInput) -> Result<FeatureVector, CodecError> {
        if query.days_left_out_of_range() {
            warn!(
                days_left = query.days_left,
                max = MAX_DAYS_LEFT,
                "days_left outside the supported query range; clamping"
            );
        }
        self.codec.assemble(&FlightRecord::from(query))
    }

    /// Predicted price in CAD.
    pub fn predict(&self, query: &QueryInput) -> Result<f64, CodecError> {
        let x = self.features(query)?;
        let price = self.model.predict(&x);
        debug!(?x, price, "scored query");
        Ok(price)
    }
}
