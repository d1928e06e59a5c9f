//! Year-by-month index tables (PDO, PNA and SOI), reshaped to one row per month.

use crate::parsers::error::ParseError;
use crate::parsers::fixed_width::{parse_integer, parse_value, FixedWidthLayout};
use crate::parsers::read_source_text;
use crate::types::year_month::YearMonth;
use log::{debug, warn};
use polars::prelude::*;
use std::path::Path;

pub const PDO_COLUMN: &str = "pdo_index";
pub const PNA_COLUMN: &str = "pna_index";
pub const SOI_COLUMN: &str = "soi";

const PDO_LAYOUT: FixedWidthLayout =
    FixedWidthLayout::new(&[5, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6]);
const PNA_LAYOUT: FixedWidthLayout =
    FixedWidthLayout::new(&[4, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7]);
const SOI_LAYOUT: FixedWidthLayout =
    FixedWidthLayout::new(&[4, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6]);

const PDO_MISSING: [f64; 1] = [99.99];
const SOI_MISSING: [f64; 1] = [-999.9];
const SOI_MARKER: &str = "STANDARDIZEDDATA";

/// Reads the Pacific Decadal Oscillation table into `year`, `month`, `pdo_index`.
pub fn read_pdo_table(path: &Path) -> Result<DataFrame, ParseError> {
    let text = read_source_text(path)?;
    let rows = parse_month_table(path, &text, 0, PDO_LAYOUT, &PDO_MISSING)?;
    monthly_frame(path, &rows, PDO_COLUMN)
}

/// Reads the Pacific-North American index table into `year`, `month`, `pna_index`.
pub fn read_pna_table(path: &Path) -> Result<DataFrame, ParseError> {
    let text = read_source_text(path)?;
    let rows = parse_month_table(path, &text, 0, PNA_LAYOUT, &[])?;
    monthly_frame(path, &rows, PNA_COLUMN)
}

/// Reads the standardized Southern Oscillation Index table into `year`, `month`, `soi`.
///
/// The file holds an anomaly table first. Only the table following the
/// `STANDARDIZED DATA` banner is read.
pub fn read_soi_table(path: &Path) -> Result<DataFrame, ParseError> {
    let text = read_source_text(path)?;
    let marker_line = text
        .lines()
        .position(|line| line.replace(' ', "").contains(SOI_MARKER))
        .ok_or_else(|| ParseError::MarkerNotFound {
            path: path.to_path_buf(),
            marker: "STANDARDIZED DATA".to_string(),
        })?;
    let rows = parse_month_table(path, &text, marker_line + 1, SOI_LAYOUT, &SOI_MISSING)?;
    monthly_frame(path, &rows, SOI_COLUMN)
}

fn is_month_header(line: &str) -> bool {
    line.split_whitespace()
        .any(|token| token.eq_ignore_ascii_case("jan"))
}

fn parse_month_table(
    path: &Path,
    text: &str,
    first_line: usize,
    layout: FixedWidthLayout,
    sentinels: &[f64],
) -> Result<Vec<(YearMonth, Option<f64>)>, ParseError> {
    let mut lines = text.lines().enumerate().skip(first_line);
    if !lines.by_ref().any(|(_, line)| is_month_header(line)) {
        return Err(ParseError::MarkerNotFound {
            path: path.to_path_buf(),
            marker: "month header".to_string(),
        });
    }

    let mut rows = Vec::new();
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = layout.split(line);
        let year = match parse_integer(fields[0]) {
            Ok(year) => year,
            Err(_) => {
                debug!("Skipping line {} of {}: no year", index + 1, path.display());
                continue;
            }
        };
        for (month, field) in (1..=12).zip(&fields[1..]) {
            let value = parse_value(field, sentinels).unwrap_or_else(|message| {
                warn!(
                    "Treating value for {year}-{month:02} as missing in {}: {message}",
                    path.display()
                );
                None
            });
            rows.push((YearMonth::new(year, month), value));
        }
    }
    rows.sort_by_key(|(period, _)| *period);
    Ok(rows)
}

fn monthly_frame(
    path: &Path,
    rows: &[(YearMonth, Option<f64>)],
    value_column: &str,
) -> Result<DataFrame, ParseError> {
    let years: Vec<i32> = rows.iter().map(|(p, _)| p.year).collect();
    let months: Vec<i32> = rows.iter().map(|(p, _)| p.month as i32).collect();
    let values: Vec<Option<f64>> = rows.iter().map(|(_, v)| *v).collect();
    DataFrame::new(vec![
        Column::new("year".into(), years),
        Column::new("month".into(), months),
        Column::new(value_column.into(), values),
    ])
    .map_err(|e| ParseError::FrameBuild(path.to_path_buf(), e))
}
