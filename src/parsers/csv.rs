use crate::parsers::error::ParseError;
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::Path;

/// Reads a CSV with a header row, keeping every column as a string.
pub(crate) fn read_csv_as_strings(path: &Path) -> Result<DataFrame, ParseError> {
    if !path.is_file() {
        return Err(ParseError::MissingSource(path.to_path_buf()));
    }
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| ParseError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?
        .finish()
        .map_err(|e| ParseError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Retrieves a string column by name.
pub(crate) fn string_column<'a>(
    df: &'a DataFrame,
    path: &Path,
    name: &str,
) -> Result<&'a StringChunked, ParseError> {
    optional_string_column(df, path, name)?.ok_or_else(|| ParseError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    })
}

/// Retrieves the first of several alternative column names that is present.
pub(crate) fn string_column_any<'a>(
    df: &'a DataFrame,
    path: &Path,
    names: &[&str],
) -> Result<&'a StringChunked, ParseError> {
    for name in names {
        if let Some(column) = optional_string_column(df, path, name)? {
            return Ok(column);
        }
    }
    Err(ParseError::MissingColumn {
        path: path.to_path_buf(),
        column: names.join("|"),
    })
}

pub(crate) fn optional_string_column<'a>(
    df: &'a DataFrame,
    path: &Path,
    name: &str,
) -> Result<Option<&'a StringChunked>, ParseError> {
    match df.column(name) {
        Ok(column) => column.str().map(Some).map_err(|e| ParseError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        }),
        Err(_) => Ok(None),
    }
}

/// Empty cells, `NaN` and unparseable values all become missing.
pub(crate) fn parse_optional_float(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| !v.is_nan())
}

/// Parses the leading `YYYY-MM-DD` of a date or timestamp cell.
pub(crate) fn parse_date_prefix(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value.get(..10)?, "%Y-%m-%d").ok()
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Some(true),
        "false" | "f" | "0" | "no" => Some(false),
        _ => None,
    }
}
