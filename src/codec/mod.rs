//! Feature codec shared by training and serving.
//!
//! Everything that turns a flight into model input lives here, once:
//!
//! - stopover duration literals → minutes (`duration`)
//! - 12-hour clock text and date text → integer fields (`clock`)
//! - categorical label encoding (`encoder`)
//! - the fixed 14-field feature layout (`assembler`)
//!
//! The training job and the serving context both call into this module, so a
//! record produces the same vector no matter where it came from.

pub mod assembler;
pub mod clock;
pub mod duration;
pub mod encoder;

pub use assembler::*;
pub use clock::*;
pub use duration::*;
pub use encoder::*;

/// Errors raised while encoding flights into features.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Unknown category for `{column}`: '{value}' was not seen during training")]
    UnknownCategory { column: String, value: String },
    #[error("Unknown code for `{column}`: {code} (vocabulary size {size})")]
    UnknownCode { column: String, code: usize, size: usize },
    #[error("Cannot fit encoder for `{column}`: column has no values")]
    EmptyVocabulary { column: String },
    #[error("Vocabulary for `{column}` is not strictly ascending at position {position}")]
    UnsortedVocabulary { column: String, position: usize },
    #[error("Invalid clock time '{0}'. Expected `h:mm AM|PM`.")]
    InvalidClock(String),
    #[error("Invalid date '{0}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD.")]
    InvalidDate(String),
}
