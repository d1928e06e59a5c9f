use crate::parsers::csv::{parse_date_prefix, parse_optional_float, read_csv_as_strings, string_column};
use crate::parsers::error::ParseError;
use chrono::NaiveDate;
use log::warn;
use polars::prelude::*;
use std::path::Path;

pub const DATE_COLUMN: &str = "datetime";
pub const DISCHARGE_COLUMN: &str = "discharge_cfs_mean";
const RAW_DISCHARGE_COLUMN: &str = "00060_Mean";

/// Reads a USGS daily values file into `datetime` (date) and
/// `discharge_cfs_mean`, ordered by date.
pub fn read_usgs_table(path: &Path) -> Result<DataFrame, ParseError> {
    let raw = read_csv_as_strings(path)?;
    let dates = string_column(&raw, path, DATE_COLUMN)?;
    let discharge = string_column(&raw, path, RAW_DISCHARGE_COLUMN)?;

    let mut rows: Vec<(NaiveDate, Option<f64>)> = Vec::with_capacity(raw.height());
    for (date, value) in dates.into_iter().zip(discharge.into_iter()) {
        match date.and_then(parse_date_prefix) {
            Some(date) => rows.push((date, parse_optional_float(value))),
            None => warn!("Skipping row with unreadable datetime {date:?} in {}", path.display()),
        }
    }
    rows.sort_by_key(|(date, _)| *date);

    DataFrame::new(vec![
        Column::new(
            DATE_COLUMN.into(),
            rows.iter().map(|(d, _)| *d).collect::<Vec<NaiveDate>>(),
        ),
        Column::new(
            DISCHARGE_COLUMN.into(),
            rows.iter().map(|(_, v)| *v).collect::<Vec<Option<f64>>>(),
        ),
    ])
    .map_err(|e| ParseError::FrameBuild(path.to_path_buf(), e))
}
