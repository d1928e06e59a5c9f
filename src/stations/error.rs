use crate::parsers::error::ParseError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StationError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to create station mapping file '{0}'")]
    MappingCreate(PathBuf, #[source] std::io::Error),

    #[error("Failed to write station mapping file '{0}'")]
    MappingWrite(PathBuf, #[source] PolarsError),
}
