//! Fixed-layout feature assembly.
//!
//! The model was fitted against exactly this column order:
//!
//! ```text
//! [airline, source, destination, stops, class,
//!  dep_hour, dep_minute, arr_hour, arr_minute,
//!  day, month, year, stopover_minutes, days_left]
//! ```
//!
//! Reordering, inserting or dropping a field invalidates every persisted model.

use rayon::prelude::*;

use crate::codec::{
    CategoricalColumn, CategoryEncoder, ClockFields, CodecError, DateFields, parse_duration_minutes,
};
use crate::domain::FlightRecord;

pub const FEATURE_COUNT: usize = 14;

/// Column names in feature order. Persisted alongside the model and checked on load.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "airline",
    "source",
    "destination",
    "number_of_stops",
    "class",
    "departure_hour",
    "departure_minute",
    "arrival_hour",
    "arrival_minute",
    "day",
    "month",
    "year",
    "total_stopover_minutes",
    "days_left",
];

/// One flight as model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_array(self) -> [f64; FEATURE_COUNT] {
        self.0
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Look up a field by its name in [`FEATURE_NAMES`].
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }
}

/// The five fitted encoders, applied in feature order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCodec {
    airline: CategoryEncoder,
    source: CategoryEncoder,
    destination: CategoryEncoder,
    number_of_stops: CategoryEncoder,
    class: CategoryEncoder,
}

impl FeatureCodec {
    /// Fit every categorical encoder on the training records.
    pub fn fit(records: &[FlightRecord]) -> Result<Self, CodecError> {
        let fit = |column| CategoryEncoder::fit(column, records.iter().map(|r| r.category(column)));
        Ok(Self {
            airline: fit(CategoricalColumn::Airline)?,
            source: fit(CategoricalColumn::Source)?,
            destination: fit(CategoricalColumn::Destination)?,
            number_of_stops: fit(CategoricalColumn::NumberOfStops)?,
            class: fit(CategoricalColumn::Class)?,
        })
    }

    /// Reassemble a codec from reloaded encoders, one per column.
    ///
    /// `encoder_for` is asked for each column in feature order; an encoder
    /// returned for the wrong column is rejected by the caller's loader.
    pub fn from_encoders<E>(
        mut encoder_for: impl FnMut(CategoricalColumn) -> Result<CategoryEncoder, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            airline: encoder_for(CategoricalColumn::Airline)?,
            source: encoder_for(CategoricalColumn::Source)?,
            destination: encoder_for(CategoricalColumn::Destination)?,
            number_of_stops: encoder_for(CategoricalColumn::NumberOfStops)?,
            class: encoder_for(CategoricalColumn::Class)?,
        })
    }

    pub fn encoder(&self, column: CategoricalColumn) -> &CategoryEncoder {
        match column {
            CategoricalColumn::Airline => &self.airline,
            CategoricalColumn::Source => &self.source,
            CategoricalColumn::Destination => &self.destination,
            CategoricalColumn::NumberOfStops => &self.number_of_stops,
            CategoricalColumn::Class => &self.class,
        }
    }

    /// Encoders in feature order.
    pub fn encoders(&self) -> impl Iterator<Item = &CategoryEncoder> {
        CategoricalColumn::ALL.into_iter().map(|c| self.encoder(c))
    }

    /// Build the 14-field vector for one flight.
    pub fn assemble(&self, record: &FlightRecord) -> Result<FeatureVector, CodecError> {
        let code = |column: CategoricalColumn| -> Result<f64, CodecError> {
            self.encoder(column)
                .encode(record.category(column))
                .map(|c| c as f64)
        };

        let dep = ClockFields::from(record.departure);
        let arr = ClockFields::from(record.arrival);
        let date = DateFields::from(record.flight_date);

        Ok(FeatureVector([
            code(CategoricalColumn::Airline)?,
            code(CategoricalColumn::Source)?,
            code(CategoricalColumn::Destination)?,
            code(CategoricalColumn::NumberOfStops)?,
            code(CategoricalColumn::Class)?,
            f64::from(dep.hour),
            f64::from(dep.minute),
            f64::from(arr.hour),
            f64::from(arr.minute),
            f64::from(date.day),
            f64::from(date.month),
            f64::from(date.year),
            f64::from(parse_duration_minutes(&record.total_stopover)),
            record.days_left as f64,
        ]))
    }

    /// Assemble many records, preserving input order.
    pub fn assemble_batch(&self, records: &[FlightRecord]) -> Result<Vec<FeatureVector>, CodecError> {
        records.par_iter().map(|r| self.assemble(r)).collect()
    }
}
