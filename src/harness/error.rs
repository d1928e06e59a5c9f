use crate::parsers::error::ParseError;
use polars::error::PolarsError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Boxed error returned by forecaster hooks.
pub type ForecasterError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Data directory '{path}' is still empty after waiting {waited:?}")]
    DataNotMounted { path: PathBuf, waited: Duration },

    #[error("Failed to create directory '{0}'")]
    CreateDir(PathBuf, #[source] std::io::Error),

    #[error("Preprocessing failed")]
    Preprocess(#[source] ForecasterError),

    #[error("Prediction failed for site '{site_id}' on {issue_date}")]
    Predict {
        site_id: String,
        issue_date: String,
        #[source]
        source: ForecasterError,
    },

    #[error("Invalid prediction for site '{site_id}' on {issue_date}: {message}")]
    InvalidPrediction {
        site_id: String,
        issue_date: String,
        message: String,
    },

    #[error("Failed to read submission format")]
    SubmissionFormat(#[from] ParseError),

    #[error("Row {row} of submission format '{path}' has an unreadable issue date")]
    SubmissionIssueDate { path: PathBuf, row: usize },

    #[error("Failed to write submission file '{0}'")]
    SubmissionWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to create submission file '{0}'")]
    SubmissionCreate(PathBuf, #[source] std::io::Error),
}
