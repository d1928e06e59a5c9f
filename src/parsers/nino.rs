use crate::parsers::error::ParseError;
use crate::parsers::fixed_width::{parse_integer, parse_value_or_warn};
use crate::parsers::read_source_text;
use log::warn;
use polars::prelude::*;
use std::path::Path;

pub const YEAR_COLUMN: &str = "YR";
pub const MONTH_COLUMN: &str = "MON";

/// Names the unlabelled `ANOM` columns after the region column preceding them,
/// so `NINO3 ANOM` follows `NINO3`.
fn label_anomaly_columns(header: &[&str]) -> Vec<String> {
    let mut labelled: Vec<String> = Vec::with_capacity(header.len());
    for name in header {
        let label = match labelled.last() {
            Some(previous) if *name == "ANOM" => format!("{previous} ANOM"),
            _ => name.to_string(),
        };
        labelled.push(label);
    }
    labelled
}

/// Reads the monthly Niño region sea surface temperature table.
///
/// Columns are `YR`, `MON` and, for each region, its temperature and anomaly
/// (`NINO1+2`, `NINO1+2 ANOM`, `NINO3`, ... `NINO3.4 ANOM`).
pub fn read_nino_table(path: &Path) -> Result<DataFrame, ParseError> {
    let text = read_source_text(path)?;
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());
    let header: Vec<&str> = lines
        .next()
        .map(|(_, line)| line.split_whitespace().collect())
        .unwrap_or_default();
    if header.len() < 2 || header[0] != YEAR_COLUMN || header[1] != MONTH_COLUMN {
        return Err(ParseError::MarkerNotFound {
            path: path.to_path_buf(),
            marker: "YR MON header".to_string(),
        });
    }
    let names = label_anomaly_columns(&header);
    let value_count = names.len() - 2;

    let mut rows: Vec<(i32, i32, Vec<Option<f64>>)> = Vec::new();
    for (index, line) in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (Some(year), Some(month)) = (
            tokens.first().and_then(|t| parse_integer(t).ok()),
            tokens.get(1).and_then(|t| parse_integer(t).ok()),
        ) else {
            warn!("Skipping line {} of {}: '{line}'", index + 1, path.display());
            continue;
        };
        let mut values: Vec<Option<f64>> = tokens[2..]
            .iter()
            .map(|t| parse_value_or_warn(t, &[], path, index + 1))
            .collect();
        values.resize(value_count, None);
        rows.push((year, month, values));
    }
    rows.sort_by_key(|(year, month, _)| (*year, *month));

    let mut columns = vec![
        Column::new(
            YEAR_COLUMN.into(),
            rows.iter().map(|r| r.0).collect::<Vec<i32>>(),
        ),
        Column::new(
            MONTH_COLUMN.into(),
            rows.iter().map(|r| r.1).collect::<Vec<i32>>(),
        ),
    ];
    for (position, name) in names[2..].iter().enumerate() {
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.2[position]).collect();
        columns.push(Column::new(name.as_str().into(), values));
    }
    DataFrame::new(columns).map_err(|e| ParseError::FrameBuild(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SourceFixture;

    #[test]
    fn test_anomaly_labels() {
        let header = ["YR", "MON", "NINO1+2", "ANOM", "NINO3", "ANOM", "NINO4", "ANOM", "NINO3.4", "ANOM"];
        assert_eq!(
            label_anomaly_columns(&header),
            vec![
                "YR",
                "MON",
                "NINO1+2",
                "NINO1+2 ANOM",
                "NINO3",
                "NINO3 ANOM",
                "NINO4",
                "NINO4 ANOM",
                "NINO3.4",
                "NINO3.4 ANOM"
            ]
        );
    }

    #[test]
    fn test_read_fixture() -> Result<(), ParseError> {
        let fixture = SourceFixture::new();
        let df = read_nino_table(&fixture.root().teleconnection_file("nino_regions_sst"))?;
        assert_eq!(df.width(), 10);
        assert!(df.column("NINO3.4 ANOM").is_ok());
        let years = df.column(YEAR_COLUMN).unwrap().i32().unwrap();
        assert_eq!(years.get(0), Some(2020));
        Ok(())
    }
}
