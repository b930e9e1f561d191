//! Label encoding for categorical columns.
//!
//! An encoder is fitted once on a training column and never changes. Codes are
//! positions in the sorted, deduplicated vocabulary, so the ordered class list
//! *is* the encoder: persisting it and reloading it reproduces every code.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::codec::CodecError;

/// The five categorical columns of the flight dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalColumn {
    Airline,
    Source,
    Destination,
    #[value(name = "stops", alias = "number-of-stops")]
    NumberOfStops,
    Class,
}

impl CategoricalColumn {
    /// Feature-vector order.
    pub const ALL: [CategoricalColumn; 5] = [
        CategoricalColumn::Airline,
        CategoricalColumn::Source,
        CategoricalColumn::Destination,
        CategoricalColumn::NumberOfStops,
        CategoricalColumn::Class,
    ];

    /// Column header in the training CSV.
    pub fn header(self) -> &'static str {
        match self {
            CategoricalColumn::Airline => "Airline",
            CategoricalColumn::Source => "Source",
            CategoricalColumn::Destination => "Destination",
            CategoricalColumn::NumberOfStops => "Number of Stops",
            CategoricalColumn::Class => "Class",
        }
    }

    /// File name of the persisted encoder.
    pub fn artifact_file_name(self) -> &'static str {
        match self {
            CategoricalColumn::Airline => "airline_encoder.json",
            CategoricalColumn::Source => "source_encoder.json",
            CategoricalColumn::Destination => "destination_encoder.json",
            CategoricalColumn::NumberOfStops => "number_of_stops_encoder.json",
            CategoricalColumn::Class => "class_encoder.json",
        }
    }
}

/// Immutable string → code mapping for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEncoder {
    column: CategoricalColumn,
    classes: Vec<String>,
}

impl CategoryEncoder {
    /// Fit on the observed values of a column: dedupe, sort, number from 0.
    pub fn fit<I, S>(column: CategoricalColumn, values: I) -> Result<Self, CodecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        classes.sort_unstable();
        classes.dedup();
        if classes.is_empty() {
            return Err(CodecError::EmptyVocabulary {
                column: column.header().to_string(),
            });
        }
        Ok(Self { column, classes })
    }

    /// Rebuild an encoder from a persisted class list.
    ///
    /// The list must be strictly ascending; anything else would silently remap
    /// codes relative to the model that was trained against it.
    pub fn from_classes(column: CategoricalColumn, classes: Vec<String>) -> Result<Self, CodecError> {
        if classes.is_empty() {
            return Err(CodecError::EmptyVocabulary {
                column: column.header().to_string(),
            });
        }
        if let Some(position) = classes.windows(2).position(|w| w[0] >= w[1]) {
            return Err(CodecError::UnsortedVocabulary {
                column: column.header().to_string(),
                position: position + 1,
            });
        }
        Ok(Self { column, classes })
    }

    pub fn column(&self) -> CategoricalColumn {
        self.column
    }

    /// Code of a known value.
    pub fn encode(&self, value: &str) -> Result<usize, CodecError> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .map_err(|_| CodecError::UnknownCategory {
                column: self.column.header().to_string(),
                value: value.to_string(),
            })
    }

    /// Value of a known code.
    pub fn decode(&self, code: usize) -> Result<&str, CodecError> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| CodecError::UnknownCode {
                column: self.column.header().to_string(),
                code,
                size: self.classes.len(),
            })
    }

    /// Known values in code order (for populating selection lists).
    pub fn vocabulary(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_sorts_and_dedupes() {
        let enc = CategoryEncoder::fit(CategoricalColumn::Airline, ["B", "A", "C", "A"]).unwrap();
        assert_eq!(enc.vocabulary(), ["A", "B", "C"]);
        assert_eq!(enc.encode("A").unwrap(), 0);
        assert_eq!(enc.encode("B").unwrap(), 1);
        assert_eq!(enc.encode("C").unwrap(), 2);
    }

    #[test]
    fn unknown_value_is_rejected() {
        let enc = CategoryEncoder::fit(CategoricalColumn::Airline, ["B", "A", "C", "A"]).unwrap();
        let err = enc.encode("Z").unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownCategory {
                column: "Airline".to_string(),
                value: "Z".to_string(),
            }
        );
    }

    #[test]
    fn ordering_is_bytewise() {
        // Uppercase sorts before lowercase, digits before letters.
        let enc = CategoryEncoder::fit(CategoricalColumn::NumberOfStops, ["non-stop", "1-stop", "2+-stops", "Non-stop"])
            .unwrap();
        assert_eq!(enc.vocabulary(), ["1-stop", "2+-stops", "Non-stop", "non-stop"]);
    }

    #[test]
    fn decode_inverts_encode() {
        let enc = CategoryEncoder::fit(CategoricalColumn::Class, ["Economy", "Business", "First"]).unwrap();
        for value in ["Business", "Economy", "First"] {
            let code = enc.encode(value).unwrap();
            assert_eq!(enc.decode(code).unwrap(), value);
        }
        assert!(matches!(enc.decode(3), Err(CodecError::UnknownCode { code: 3, size: 3, .. })));
    }

    #[test]
    fn empty_column_cannot_be_fitted() {
        let values: [&str; 0] = [];
        assert!(matches!(
            CategoryEncoder::fit(CategoricalColumn::Source, values),
            Err(CodecError::EmptyVocabulary { .. })
        ));
    }

    #[test]
    fn from_classes_requires_strict_order() {
        let ok = CategoryEncoder::from_classes(CategoricalColumn::Source, vec!["YUL".into(), "YVR".into(), "YYZ".into()]);
        assert!(ok.is_ok());

        let unsorted = CategoryEncoder::from_classes(CategoricalColumn::Source, vec!["YVR".into(), "YUL".into()]);
        assert!(matches!(unsorted, Err(CodecError::UnsortedVocabulary { position: 1, .. })));

        let duplicated = CategoryEncoder::from_classes(CategoricalColumn::Source, vec!["YUL".into(), "YUL".into()]);
        assert!(duplicated.is_err());
    }
}
