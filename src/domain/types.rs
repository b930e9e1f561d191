//! Shared domain types.
//!
//! A flight has the same logical shape whether it comes from a dataset row or
//! from an interactive query. Both are reduced to a [`FlightRecord`] before they
//! reach the feature codec, which is what keeps training and serving in step.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::codec::CategoricalColumn;

/// Largest `days_left` a query may carry.
pub const MAX_DAYS_LEFT: i64 = 365;

/// One flight, ready for feature assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightRecord {
    pub airline: String,
    pub source: String,
    pub destination: String,
    pub number_of_stops: String,
    pub class: String,
    pub departure: NaiveTime,
    /// Arrival clock time. A next-day landing is indistinguishable from a same-day one.
    pub arrival: NaiveTime,
    pub flight_date: NaiveDate,
    /// Duration literal such as `"3h 25m"`, `"45m"`, or `"0"`.
    pub total_stopover: String,
    /// Unconstrained in training data.
    pub days_left: i64,
}

impl FlightRecord {
    /// Value of a categorical column.
    pub fn category(&self, column: CategoricalColumn) -> &str {
        match column {
            CategoricalColumn::Airline => &self.airline,
            CategoricalColumn::Source => &self.source,
            CategoricalColumn::Destination => &self.destination,
            CategoricalColumn::NumberOfStops => &self.number_of_stops,
            CategoricalColumn::Class => &self.class,
        }
    }
}

/// A single serving-time query.
///
/// Categorical values are expected to come from the fitted vocabularies; times
/// and dates come from pickers, so no text parsing is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryInput {
    pub airline: String,
    pub source: String,
    pub destination: String,
    pub number_of_stops: String,
    pub class: String,
    pub departure: NaiveTime,
    pub arrival: NaiveTime,
    pub flight_date: NaiveDate,
    pub total_stopover: String,
    /// Expected in `0..=365`; out-of-range values are clamped.
    pub days_left: i64,
}

impl QueryInput {
    /// Whether `days_left` falls outside the supported query range.
    pub fn days_left_out_of_range(&self) -> bool {
        !(0..=MAX_DAYS_LEFT).contains(&self.days_left)
    }
}

impl From<&QueryInput> for FlightRecord {
    fn from(query: &QueryInput) -> Self {
        FlightRecord {
            airline: query.airline.clone(),
            source: query.source.clone(),
            destination: query.destination.clone(),
            number_of_stops: query.number_of_stops.clone(),
            class: query.class.clone(),
            departure: query.departure,
            arrival: query.arrival,
            flight_date: query.flight_date,
            total_stopover: query.total_stopover.clone(),
            days_left: query.days_left.clamp(0, MAX_DAYS_LEFT),
        }
    }
}

/// Gradient boosting settings recorded with the fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub n_estimators: usize,
    pub max_depth: u32,
    pub learning_rate: f64,
    pub min_leaf_size: usize,
    /// Seed for the train/test split.
    pub seed: u64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 6,
            learning_rate: 0.1,
            min_leaf_size: 1,
            seed: 42,
        }
    }
}

/// A training run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub artifact_dir: PathBuf,
    /// Held-out fraction used for the MAE report.
    pub test_size: f64,
    pub params: ModelParams,
}
