//! Readers for the raw source formats. Each returns the complete table held in
//! its file, sorted by time key, with no issue-date filtering applied.

pub(crate) mod csv;
pub mod cpc_outlooks;
pub mod error;
pub mod fixed_width;
pub mod mjo;
pub mod monthly_indices;
pub mod naturalized_flow;
pub mod nino;
pub mod oni;
pub mod snotel;
pub mod usgs;

use crate::parsers::error::ParseError;
use std::path::Path;
use std::{fs, io};

/// Reads a whole source file as text. A file that does not exist is reported as
/// [`ParseError::MissingSource`].
pub(crate) fn read_source_text(path: &Path) -> Result<String, ParseError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ParseError::MissingSource(path.to_path_buf()),
        _ => ParseError::Read(path.to_path_buf(), e),
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
