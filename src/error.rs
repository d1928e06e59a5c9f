use crate::harness::error::HarnessError;
use crate::parsers::error::ParseError;
use crate::sites::error::SiteError;
use crate::stations::error::StationError;
use crate::types::data_source::DataSource;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaterSupplyError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Site(#[from] SiteError),

    #[error(transparent)]
    Station(#[from] StationError),

    #[error(transparent)]
    Harness(#[from] HarnessError),

    #[error("Could not interpret '{0}' as an issue date")]
    InvalidIssueDate(String),

    #[error("Source '{0}' requires a site id")]
    SiteRequired(DataSource),

    #[error("Failed to evaluate filtered frame")]
    PolarsError(#[from] PolarsError),
}
