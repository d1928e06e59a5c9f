use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Source file '{0}' does not exist")]
    MissingSource(PathBuf),

    #[error("Failed to read source file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse CSV file '{path}'")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Required column '{column}' not found in '{path}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Could not find '{marker}' in '{path}'")]
    MarkerNotFound { path: PathBuf, marker: String },

    #[error("Malformed line {line} in '{path}': {message}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to build frame from '{0}'")]
    FrameBuild(PathBuf, #[source] PolarsError),
}
