use crate::parsers::csv::{
    optional_string_column, parse_date_prefix, parse_optional_float, read_csv_as_strings,
    string_column,
};
use crate::parsers::error::ParseError;
use chrono::NaiveDate;
use log::warn;
use polars::prelude::*;
use std::path::Path;

pub const DATE_COLUMN: &str = "date";
pub const STATION_COLUMN: &str = "station_id";

/// Daily elements kept from SNOTEL station files. Absent columns read as missing.
pub const ELEMENT_COLUMNS: [&str; 6] = [
    "WTEQ_DAILY",
    "SNWD_DAILY",
    "PREC_DAILY",
    "TMAX_DAILY",
    "TMIN_DAILY",
    "TAVG_DAILY",
];

/// A daily SNOTEL observation for one station.
#[derive(Debug, Clone, PartialEq)]
pub struct SnotelObservation {
    pub date: NaiveDate,
    pub station_id: String,
    pub values: [Option<f64>; 6],
}

/// Reads a station's daily file, tagging each row with `station_id`.
pub fn read_station_observations(
    path: &Path,
    station_id: &str,
) -> Result<Vec<SnotelObservation>, ParseError> {
    let raw = read_csv_as_strings(path)?;
    let dates = string_column(&raw, path, DATE_COLUMN)?;
    let mut elements = Vec::with_capacity(ELEMENT_COLUMNS.len());
    for name in ELEMENT_COLUMNS {
        elements.push(optional_string_column(&raw, path, name)?);
    }

    let mut observations = Vec::with_capacity(raw.height());
    for row in 0..raw.height() {
        let Some(date) = dates.get(row).and_then(parse_date_prefix) else {
            warn!("Skipping row {} of {}: unreadable date", row + 2, path.display());
            continue;
        };
        let mut values = [None; 6];
        for (value, column) in values.iter_mut().zip(&elements) {
            *value = column.and_then(|c| parse_optional_float(c.get(row)));
        }
        observations.push(SnotelObservation {
            date,
            station_id: station_id.to_string(),
            values,
        });
    }
    observations.sort_by_key(|o| o.date);
    Ok(observations)
}

/// Builds `date`, `station_id` and the element columns.
pub fn snotel_frame(observations: &[SnotelObservation]) -> PolarsResult<DataFrame> {
    let mut columns = vec![
        Column::new(
            DATE_COLUMN.into(),
            observations.iter().map(|o| o.date).collect::<Vec<NaiveDate>>(),
        ),
        Column::new(
            STATION_COLUMN.into(),
            observations.iter().map(|o| o.station_id.as_str()).collect::<Vec<&str>>(),
        ),
    ];
    for (position, name) in ELEMENT_COLUMNS.iter().enumerate() {
        let values: Vec<Option<f64>> = observations.iter().map(|o| o.values[position]).collect();
        columns.push(Column::new((*name).into(), values));
    }
    DataFrame::new(columns)
}
