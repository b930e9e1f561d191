//! Application-level error carried to the binary boundary.
//!
//! Library modules return their own `thiserror` enums; `AppError` flattens them
//! into a message plus the process exit code:
//!
//! - `2` bad input, configuration, or artifacts
//! - `3` no usable training data
//! - `4` model/runtime failures

use crate::codec::CodecError;
use crate::io::artifacts::ArtifactError;
use crate::models::ModelError;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl From<ArtifactError> for AppError {
    fn from(err: ArtifactError) -> Self {
        AppError::new(2, format!("Artifact error: {err}"))
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::new(4, format!("Model error: {err}"))
    }
}
