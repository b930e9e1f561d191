//! Read/write the persisted model and encoders.
//!
//! Training writes six JSON files into one directory:
//! - `airline_price_model.json`: fitted ensemble, its feature layout, params
//!   and the held-out evaluation
//! - one `<column>_encoder.json` per categorical column, holding the ordered
//!   class list
//!
//! Loading is all-or-nothing: every file must exist, parse, and match the
//! current feature layout, otherwise nothing is returned.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::codec::{CategoricalColumn, CategoryEncoder, FEATURE_NAMES, FeatureCodec};
use crate::fit::Evaluation;
use crate::models::PriceModel;

pub const MODEL_FILE_NAME: &str = "airline_price_model.json";
/// Bumped whenever the on-disk layout or the feature order changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;
const TOOL: &str = "fare";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("missing artifact '{}'", .path.display())]
    Missing { path: PathBuf },
    #[error("cannot access '{}': {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("corrupt artifact '{}': {source}", .path.display())]
    Corrupt { path: PathBuf, source: serde_json::Error },
    #[error("incompatible artifact '{}': {reason}", .path.display())]
    Incompatible { path: PathBuf, reason: String },
}

/// Everything serving needs, loaded together.
#[derive(Debug)]
pub struct Artifacts {
    pub codec: FeatureCodec,
    pub model: PriceModel,
    pub evaluation: Option<Evaluation>,
}

#[derive(Serialize, Deserialize)]
struct EncoderFile {
    tool: String,
    format_version: u32,
    column: CategoricalColumn,
    classes: Vec<String>,
}

#[derive(Serialize)]
struct ModelFileRef<'a> {
    tool: &'a str,
    format_version: u32,
    evaluation: Option<&'a Evaluation>,
    model: &'a PriceModel,
}

#[derive(Deserialize)]
struct ModelFile {
    tool: String,
    format_version: u32,
    evaluation: Option<Evaluation>,
    model: PriceModel,
}

/// Path of the encoder file for `column` inside `dir`.
pub fn encoder_path(dir: &Path, column: CategoricalColumn) -> PathBuf {
    dir.join(column.artifact_file_name())
}

/// Path of the model file inside `dir`.
pub fn model_path(dir: &Path) -> PathBuf {
    dir.join(MODEL_FILE_NAME)
}

/// Write all six artifacts. Returns the written paths.
pub fn write_artifacts(
    dir: &Path,
    codec: &FeatureCodec,
    model: &PriceModel,
    evaluation: Option<&Evaluation>,
) -> Result<Vec<PathBuf>, ArtifactError> {
    fs::create_dir_all(dir).map_err(|source| ArtifactError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(CategoricalColumn::ALL.len() + 1);
    for encoder in codec.encoders() {
        let path = encoder_path(dir, encoder.column());
        let file = EncoderFile {
            tool: TOOL.to_string(),
            format_version: ARTIFACT_FORMAT_VERSION,
            column: encoder.column(),
            classes: encoder.vocabulary().to_vec(),
        };
        write_json(&path, &file)?;
        written.push(path);
    }

    let path = model_path(dir);
    let file = ModelFileRef {
        tool: TOOL,
        format_version: ARTIFACT_FORMAT_VERSION,
        evaluation,
        model,
    };
    write_json(&path, &file)?;
    written.push(path);

    info!(dir = %dir.display(), files = written.len(), "artifacts written");
    Ok(written)
}

/// Load the five encoders into a codec.
pub fn load_codec(dir: &Path) -> Result<FeatureCodec, ArtifactError> {
    FeatureCodec::from_encoders(|column| load_encoder(dir, column))
}

/// Load the codec and model together.
pub fn load_artifacts(dir: &Path) -> Result<Artifacts, ArtifactError> {
    let codec = load_codec(dir)?;

    let path = model_path(dir);
    let file: ModelFile = read_json(&path)?;
    check_header(&path, &file.tool, file.format_version)?;

    if file.model.feature_names() != FEATURE_NAMES {
        return Err(ArtifactError::Incompatible {
            path,
            reason: format!(
                "feature layout {:?} does not match the expected {:?}",
                file.model.feature_names(),
                FEATURE_NAMES
            ),
        });
    }

    info!(dir = %dir.display(), trained_rows = file.model.trained_rows(), "artifacts loaded");
    Ok(Artifacts {
        codec,
        model: file.model,
        evaluation: file.evaluation,
    })
}

fn load_encoder(dir: &Path, column: CategoricalColumn) -> Result<CategoryEncoder, ArtifactError> {
    let path = encoder_path(dir, column);
    let file: EncoderFile = read_json(&path)?;
    check_header(&path, &file.tool, file.format_version)?;

    if file.column != column {
        return Err(ArtifactError::Incompatible {
            path,
            reason: format!("holds the `{}` encoder, expected `{}`", file.column.header(), column.header()),
        });
    }

    let encoder = CategoryEncoder::from_classes(column, file.classes).map_err(|e| ArtifactError::Incompatible {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    debug!(column = column.header(), classes = encoder.len(), "encoder loaded");
    Ok(encoder)
}

fn check_header(path: &Path, tool: &str, format_version: u32) -> Result<(), ArtifactError> {
    if tool != TOOL {
        return Err(ArtifactError::Incompatible {
            path: path.to_path_buf(),
            reason: format!("written by '{tool}', expected '{TOOL}'"),
        });
    }
    if format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ArtifactError::Incompatible {
            path: path.to_path_buf(),
            reason: format!("format version {format_version}, expected {ARTIFACT_FORMAT_VERSION}"),
        });
    }
    Ok(())
}

/// Written to a sibling `.tmp` file first, then renamed into place.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let tmp = path.with_extension("json.tmp");
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(File::create(&tmp).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)?;
    drop(writer);
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::domain::{FlightRecord, ModelParams};
    use crate::models::Regressor;

    fn records() -> Vec<FlightRecord> {
        let airlines = ["AirCo", "Aeroplan", "BlueSky"];
        let classes = ["Economy", "Business"];
        let mut out = Vec::new();
        for (i, airline) in airlines.iter().enumerate() {
            for (j, class) in classes.iter().enumerate() {
                for days in [3, 15, 45] {
                    out.push(FlightRecord {
                        airline: airline.to_string(),
                        source: "YYZ".into(),
                        destination: if i == 2 { "YYC".into() } else { "YVR".into() },
                        number_of_stops: if j == 0 { "non-stop".into() } else { "1-stop".into() },
                        class: class.to_string(),
                        departure: NaiveTime::from_hms_opt(8 + i as u32, 0, 0).unwrap(),
                        arrival: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
                        flight_date: NaiveDate::from_ymd_opt(2024, 6, 1 + days as u32 % 28).unwrap(),
                        total_stopover: if j == 0 { "0".into() } else { "1h 5m".into() },
                        days_left: days,
                    });
                }
            }
        }
        out
    }

    fn fitted() -> (FeatureCodec, PriceModel, Vec<FlightRecord>) {
        let records = records();
        let codec = FeatureCodec::fit(&records).unwrap();
        let x = codec.assemble_batch(&records).unwrap();
        let y: Vec<f64> = x.iter().map(|v| 150.0 + 300.0 * v.as_slice()[4] - v.as_slice()[13]).collect();
        let params = ModelParams {
            n_estimators: 20,
            ..ModelParams::default()
        };
        let model = PriceModel::fit(&x, &y, &params).unwrap();
        (codec, model, records)
    }

    #[test]
    fn round_trip_preserves_codec_and_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let (codec, model, records) = fitted();
        let eval = Evaluation { n: 4, mae: 1.5, rmse: 2.0 };

        let written = write_artifacts(dir.path(), &codec, &model, Some(&eval)).unwrap();
        assert_eq!(written.len(), 6);
        assert!(dir.path().join("number_of_stops_encoder.json").exists());
        assert!(dir.path().join(MODEL_FILE_NAME).exists());

        let loaded = load_artifacts(dir.path()).unwrap();
        assert_eq!(loaded.codec, codec);
        assert_eq!(loaded.evaluation, Some(eval));
        assert_eq!(loaded.model.params(), model.params());

        let x = codec.assemble_batch(&records).unwrap();
        assert_eq!(loaded.model.predict_batch(&x), model.predict_batch(&x));
    }

    #[test]
    fn missing_encoder_fails_the_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        let (codec, model, _) = fitted();
        write_artifacts(dir.path(), &codec, &model, None).unwrap();
        fs::remove_file(encoder_path(dir.path(), CategoricalColumn::Class)).unwrap();

        let err = load_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { .. }), "{err}");
    }

    #[test]
    fn reordered_vocabulary_is_incompatible() {
        let dir = tempfile::tempdir().unwrap();
        let (codec, model, _) = fitted();
        write_artifacts(dir.path(), &codec, &model, None).unwrap();

        let path = encoder_path(dir.path(), CategoricalColumn::Airline);
        let mut file: EncoderFile = read_json(&path).unwrap();
        file.classes.reverse();
        write_json(&path, &file).unwrap();

        let err = load_codec(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Incompatible { .. }), "{err}");
    }

    #[test]
    fn swapped_encoder_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (codec, model, _) = fitted();
        write_artifacts(dir.path(), &codec, &model, None).unwrap();
        fs::copy(
            encoder_path(dir.path(), CategoricalColumn::Source),
            encoder_path(dir.path(), CategoricalColumn::Destination),
        )
        .unwrap();

        let err = load_codec(dir.path()).unwrap_err();
        assert!(err.to_string().contains("expected `Destination`"), "{err}");
    }

    #[test]
    fn garbage_model_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let (codec, model, _) = fitted();
        write_artifacts(dir.path(), &codec, &model, None).unwrap();
        fs::write(model_path(dir.path()), b"{ not json").unwrap();

        let err = load_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { .. }), "{err}");
    }

    #[test]
    fn future_format_version_is_incompatible() {
        let dir = tempfile::tempdir().unwrap();
        let (codec, model, _) = fitted();
        write_artifacts(dir.path(), &codec, &model, None).unwrap();

        let path = encoder_path(dir.path(), CategoricalColumn::Source);
        let mut file: EncoderFile = read_json(&path).unwrap();
        file.format_version = ARTIFACT_FORMAT_VERSION + 1;
        write_json(&path, &file).unwrap();

        assert!(matches!(load_codec(dir.path()), Err(ArtifactError::Incompatible { .. })));
    }
}
