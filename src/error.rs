//! Top-level build error.
//!
//! Each stage keeps its own error enum; [`BuildError`] wraps them so the
//! binary has one type to report. File names in messages are relative to the
//! project root.

use crate::assemble::AssembleError;
use crate::config::ConfigError;
use crate::validate::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("missing data file: {0}")]
    MissingDataFile(String),
    #[error("invalid JSON in {file}: {source}")]
    InvalidJson {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}
