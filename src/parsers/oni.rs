use crate::parsers::error::ParseError;
use crate::parsers::fixed_width::{parse_integer, parse_value_or_warn};
use crate::parsers::read_source_text;
use crate::types::season::OniSeason;
use log::warn;
use polars::prelude::*;
use std::path::Path;

pub const SEASON_COLUMN: &str = "SEAS";
pub const YEAR_COLUMN: &str = "YR";

/// A single row of the Oceanic Niño Index table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OniRecord {
    pub season: OniSeason,
    pub year: i32,
    pub total: Option<f64>,
    pub anomaly: Option<f64>,
}

/// Reads the whitespace-delimited ONI table (`SEAS YR TOTAL ANOM`), ordered by
/// year and season.
pub fn read_oni_records(path: &Path) -> Result<Vec<OniRecord>, ParseError> {
    let text = read_source_text(path)?;
    let mut lines = text.lines().enumerate();
    let header_found = lines.by_ref().any(|(_, line)| {
        line.split_whitespace()
            .next()
            .is_some_and(|token| token == SEASON_COLUMN)
    });
    if !header_found {
        return Err(ParseError::MarkerNotFound {
            path: path.to_path_buf(),
            marker: "SEAS YR TOTAL ANOM".to_string(),
        });
    }

    let mut records = Vec::new();
    for (index, line) in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 4 {
            return Err(ParseError::MalformedLine {
                path: path.to_path_buf(),
                line: index + 1,
                message: format!("expected 4 fields, found {}", tokens.len()),
            });
        }
        let (season, year) = match (tokens[0].parse::<OniSeason>(), parse_integer(tokens[1])) {
            (Ok(season), Ok(year)) => (season, year),
            _ => {
                warn!("Skipping line {} of {}: '{line}'", index + 1, path.display());
                continue;
            }
        };
        records.push(OniRecord {
            season,
            year,
            total: parse_value_or_warn(tokens[2], &[], path, index + 1),
            anomaly: parse_value_or_warn(tokens[3], &[], path, index + 1),
        });
    }
    records.sort_by_key(|r| (r.year, r.season));
    Ok(records)
}

/// Builds the `SEAS`, `YR`, `TOTAL`, `ANOM` frame from parsed records.
pub fn oni_frame(records: &[OniRecord]) -> PolarsResult<DataFrame> {
    let seasons: Vec<&str> = records.iter().map(|r| r.season.as_str()).collect();
    let years: Vec<i32> = records.iter().map(|r| r.year).collect();
    let totals: Vec<Option<f64>> = records.iter().map(|r| r.total).collect();
    let anomalies: Vec<Option<f64>> = records.iter().map(|r| r.anomaly).collect();
    DataFrame::new(vec![
        Column::new(SEASON_COLUMN.into(), seasons),
        Column::new(YEAR_COLUMN.into(), years),
        Column::new("TOTAL".into(), totals),
        Column::new("ANOM".into(), anomalies),
    ])
}

pub fn read_oni_table(path: &Path) -> Result<DataFrame, ParseError> {
    let records = read_oni_records(path)?;
    oni_frame(&records).map_err(|e| ParseError::FrameBuild(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_file;

    #[test]
    fn test_read_records_in_season_order() -> Result<(), ParseError> {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "oni.txt",
            "SEAS  YR   TOTAL   ANOM\n\
             NDJ 2020  25.53  -1.02\n\
             DJF 2021  25.63  -0.98\n\
             OND 2020  25.62  -1.17\n\
             \n",
        );
        let records = read_oni_records(&path)?;
        let order: Vec<(OniSeason, i32)> = records.iter().map(|r| (r.season, r.year)).collect();
        assert_eq!(
            order,
            vec![
                (OniSeason::Ond, 2020),
                (OniSeason::Ndj, 2020),
                (OniSeason::Djf, 2021)
            ]
        );
        assert_eq!(records[2].anomaly, Some(-0.98));

        let df = read_oni_table(&path)?;
        assert_eq!(df.get_column_names_str(), vec!["SEAS", "YR", "TOTAL", "ANOM"]);
        Ok(())
    }

    #[test]
    fn test_unreadable_value_is_missing() -> Result<(), ParseError> {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "oni.txt",
            "SEAS YR TOTAL ANOM
DJF 2021 n/a -0.98
JFM 2021 25.80 bad
",
        );
        let records = read_oni_records(&path)?;
        assert_eq!(records.len(), 2);
        assert_eq!((records[0].total, records[0].anomaly), (None, Some(-0.98)));
        assert_eq!((records[1].total, records[1].anomaly), (Some(25.80), None));
        Ok(())
    }

    #[test]
    fn test_short_line_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "oni.txt", "SEAS YR TOTAL ANOM\nDJF 2021\n");
        assert!(matches!(
            read_oni_records(&path),
            Err(ParseError::MalformedLine { line: 2, .. })
        ));
    }
}
