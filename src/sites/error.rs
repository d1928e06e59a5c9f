use crate::parsers::error::ParseError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Unknown site id '{0}'")]
    UnknownSite(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to decode GeoJSON layer '{0}'")]
    GeoJsonDecode(PathBuf, #[source] serde_json::Error),

    #[error("Feature {feature} of '{path}' has no '{property}' property")]
    MissingProperty {
        path: PathBuf,
        feature: usize,
        property: String,
    },

    #[error("Feature {feature} of '{path}' has invalid geometry: {message}")]
    InvalidGeometry {
        path: PathBuf,
        feature: usize,
        message: String,
    },
}
