//! CPC long-lead seasonal outlook files.
//!
//! A yearly file holds one table per issuance. Each table opens with a header
//! line carrying the issue date (`MMDD YYYY ... FORECAST ... PERCENTILES`),
//! followed by a `YEAR MN LEAD CD ...` column line and fixed-width rows, one
//! per target season and climate division. A line starting with `9999` ends
//! the data.

use crate::parsers::error::ParseError;
use crate::parsers::fixed_width::{parse_integer, parse_value_or_warn, FixedWidthLayout};
use crate::parsers::read_source_text;
use crate::types::data_source::OutlookVariable;
use chrono::NaiveDate;
use log::warn;
use polars::prelude::*;
use std::path::Path;

pub const ISSUE_DATE_COLUMN: &str = "issue_date";
pub const KEY_COLUMNS: [&str; 4] = ["YEAR", "MN", "LEAD", "CD"];

const TEMP_VALUE_COLUMNS: &[&str] = &[
    "R", "98.", "95.", "90.", "80.", "70.", "60.", "50.", "40.", "30.", "20.", "10.", "5.", "2.",
    "F MEAN", "C MEAN", "F SD", "C SD",
];

const PRECIP_VALUE_COLUMNS: &[&str] = &[
    "R", "98.", "95.", "90.", "80.", "70.", "60.", "50.", "40.", "30.", "20.", "10.", "5.", "2.",
    "F MEAN", "C MEAN", "F SD", "C SD", "POWER",
];

const TEMP_LAYOUT: FixedWidthLayout = FixedWidthLayout::new(&[
    4, 4, 4, 4, 5, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 7, 7,
]);

const PRECIP_LAYOUT: FixedWidthLayout = FixedWidthLayout::new(&[
    4, 4, 4, 4, 5, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 7, 7, 7,
]);

const PRECIP_ALT_LAYOUT: FixedWidthLayout = FixedWidthLayout::new(&[
    4, 3, 3, 4, 5, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 8, 8, 8,
]);

struct LayoutVariant {
    variable: OutlookVariable,
    /// Calendar years using this layout, `None` for the default.
    years: Option<&'static [i32]>,
    layout: FixedWidthLayout,
}

/// Checked in order, first match wins.
const LAYOUT_VARIANTS: &[LayoutVariant] = &[
    LayoutVariant {
        variable: OutlookVariable::Precipitation,
        years: Some(&[2004, 2006]),
        layout: PRECIP_ALT_LAYOUT,
    },
    LayoutVariant {
        variable: OutlookVariable::Precipitation,
        years: None,
        layout: PRECIP_LAYOUT,
    },
    LayoutVariant {
        variable: OutlookVariable::Temperature,
        years: None,
        layout: TEMP_LAYOUT,
    },
];

/// Fixed-width layout of the data rows for a variable's file of the given year.
pub fn layout_for(variable: OutlookVariable, year: i32) -> FixedWidthLayout {
    LAYOUT_VARIANTS
        .iter()
        .find(|v| v.variable == variable && v.years.map_or(true, |years| years.contains(&year)))
        .map(|v| v.layout)
        .unwrap_or(TEMP_LAYOUT)
}

pub fn value_columns(variable: OutlookVariable) -> &'static [&'static str] {
    match variable {
        OutlookVariable::Temperature => TEMP_VALUE_COLUMNS,
        OutlookVariable::Precipitation => PRECIP_VALUE_COLUMNS,
    }
}

/// One row of an outlook table.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlookRow {
    pub issue_date: NaiveDate,
    pub year: i32,
    pub month: i32,
    pub lead: i32,
    pub division: i32,
    pub values: Vec<Option<f64>>,
}

impl OutlookRow {
    fn sort_key(&self) -> (NaiveDate, i32, i32, i32, i32) {
        (self.issue_date, self.year, self.month, self.lead, self.division)
    }
}

fn parse_issue_date(line: &str) -> Option<NaiveDate> {
    let month = line.get(0..2)?.trim().parse().ok()?;
    let day = line.get(2..4)?.trim().parse().ok()?;
    let year = line.get(5..9)?.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses the text of an outlook file for `year`, returning rows ordered by
/// issue date and then `YEAR`, `MN`, `LEAD`, `CD`.
pub fn parse_outlook_text(
    path: &Path,
    text: &str,
    variable: OutlookVariable,
    year: i32,
) -> Result<Vec<OutlookRow>, ParseError> {
    let layout = layout_for(variable, year);
    let marker = variable.table_marker();
    let value_count = value_columns(variable).len();
    let mut issue_date: Option<NaiveDate> = None;
    let mut rows = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.starts_with("9999") {
            break;
        }
        if line.contains(marker) {
            issue_date = Some(parse_issue_date(line).ok_or_else(|| ParseError::MalformedLine {
                path: path.to_path_buf(),
                line: index + 1,
                message: "unreadable issue date in table header".to_string(),
            })?);
            continue;
        }
        if line.starts_with("YEAR") || line.trim().is_empty() {
            continue;
        }
        let Some(issue_date) = issue_date else {
            return Err(ParseError::MalformedLine {
                path: path.to_path_buf(),
                line: index + 1,
                message: "data row before any table header".to_string(),
            });
        };

        if line.trim_end().len() > layout.line_width() {
            warn!(
                "Line {} of {} is wider than the {year} layout",
                index + 1,
                path.display()
            );
        }
        let fields = layout.split(line);
        let keys: Result<Vec<i32>, String> = fields[..4].iter().map(|f| parse_integer(f)).collect();
        let keys = match keys {
            Ok(keys) => keys,
            Err(message) => {
                warn!("Skipping line {} of {}: {message}", index + 1, path.display());
                continue;
            }
        };
        let values: Vec<Option<f64>> = fields[4..]
            .iter()
            .take(value_count)
            .map(|field| parse_value_or_warn(field, &[], path, index + 1))
            .collect();
        rows.push(OutlookRow {
            issue_date,
            year: keys[0],
            month: keys[1],
            lead: keys[2],
            division: keys[3],
            values,
        });
    }
    rows.sort_by_key(OutlookRow::sort_key);
    Ok(rows)
}

/// Reads every table in one yearly outlook file.
pub fn read_outlook_rows(
    path: &Path,
    variable: OutlookVariable,
    year: i32,
) -> Result<Vec<OutlookRow>, ParseError> {
    let text = read_source_text(path)?;
    parse_outlook_text(path, &text, variable, year)
}

/// Builds the outlook frame: `issue_date`, the integer keys, then the statistics.
pub fn outlook_frame(variable: OutlookVariable, rows: &[OutlookRow]) -> PolarsResult<DataFrame> {
    let mut columns = vec![
        Column::new(
            ISSUE_DATE_COLUMN.into(),
            rows.iter().map(|r| r.issue_date).collect::<Vec<NaiveDate>>(),
        ),
        Column::new(KEY_COLUMNS[0].into(), rows.iter().map(|r| r.year).collect::<Vec<i32>>()),
        Column::new(KEY_COLUMNS[1].into(), rows.iter().map(|r| r.month).collect::<Vec<i32>>()),
        Column::new(KEY_COLUMNS[2].into(), rows.iter().map(|r| r.lead).collect::<Vec<i32>>()),
        Column::new(KEY_COLUMNS[3].into(), rows.iter().map(|r| r.division).collect::<Vec<i32>>()),
    ];
    for (position, name) in value_columns(variable).iter().enumerate() {
        let values: Vec<Option<f64>> = rows
            .iter()
            .map(|r| r.values.get(position).copied().flatten())
            .collect();
        columns.push(Column::new((*name).into(), values));
    }
    DataFrame::new(columns)
}

pub fn read_outlook_table(
    path: &Path,
    variable: OutlookVariable,
    year: i32,
) -> Result<DataFrame, ParseError> {
    let rows = read_outlook_rows(path, variable, year)?;
    outlook_frame(variable, &rows).map_err(|e| ParseError::FrameBuild(path.to_path_buf(), e))
}
