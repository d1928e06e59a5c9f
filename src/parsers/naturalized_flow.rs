use crate::parsers::csv::{parse_optional_float, read_csv_as_strings, string_column};
use crate::parsers::error::ParseError;
use crate::parsers::fixed_width::parse_integer;
use log::warn;
use polars::prelude::*;
use std::path::Path;

pub const SITE_COLUMN: &str = "site_id";
pub const FORECAST_YEAR_COLUMN: &str = "forecast_year";
pub const VOLUME_COLUMN: &str = "volume";

/// Monthly naturalized flow volume for one site and forecast year.
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalizedFlowRecord {
    pub site_id: String,
    pub forecast_year: i32,
    pub year: i32,
    pub month: i32,
    pub volume: Option<f64>,
}

pub fn read_naturalized_flow_records(path: &Path) -> Result<Vec<NaturalizedFlowRecord>, ParseError> {
    let raw = read_csv_as_strings(path)?;
    let sites = string_column(&raw, path, SITE_COLUMN)?;
    let forecast_years = string_column(&raw, path, FORECAST_YEAR_COLUMN)?;
    let years = string_column(&raw, path, "year")?;
    let months = string_column(&raw, path, "month")?;
    let volumes = string_column(&raw, path, VOLUME_COLUMN)?;

    let mut records = Vec::with_capacity(raw.height());
    for row in 0..raw.height() {
        let keys = (
            sites.get(row),
            forecast_years.get(row).and_then(|v| parse_integer(v).ok()),
            years.get(row).and_then(|v| parse_integer(v).ok()),
            months.get(row).and_then(|v| parse_integer(v).ok()),
        );
        let (Some(site_id), Some(forecast_year), Some(year), Some(month)) = keys else {
            warn!("Skipping row {} of {}: incomplete keys", row + 2, path.display());
            continue;
        };
        records.push(NaturalizedFlowRecord {
            site_id: site_id.to_string(),
            forecast_year,
            year,
            month,
            volume: parse_optional_float(volumes.get(row)),
        });
    }
    records.sort_by(|a, b| {
        (&a.site_id, a.forecast_year, a.year, a.month).cmp(&(&b.site_id, b.forecast_year, b.year, b.month))
    });
    Ok(records)
}

/// Full table: `site_id`, `forecast_year`, `year`, `month`, `volume`.
pub fn naturalized_flow_frame(records: &[NaturalizedFlowRecord]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            SITE_COLUMN.into(),
            records.iter().map(|r| r.site_id.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            FORECAST_YEAR_COLUMN.into(),
            records.iter().map(|r| r.forecast_year).collect::<Vec<i32>>(),
        ),
        Column::new("year".into(), records.iter().map(|r| r.year).collect::<Vec<i32>>()),
        Column::new("month".into(), records.iter().map(|r| r.month).collect::<Vec<i32>>()),
        Column::new(
            VOLUME_COLUMN.into(),
            records.iter().map(|r| r.volume).collect::<Vec<Option<f64>>>(),
        ),
    ])
}

pub fn read_naturalized_flow_table(path: &Path) -> Result<DataFrame, ParseError> {
    let records = read_naturalized_flow_records(path)?;
    naturalized_flow_frame(&records).map_err(|e| ParseError::FrameBuild(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_file;

    #[test]
    fn test_records_sorted() -> Result<(), ParseError> {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "flow.csv",
            "site_id,forecast_year,year,month,volume\n\
             b,2021,2020,11,3.5\n\
             a,2021,2020,12,\n\
             a,2021,2020,10,1.0\n\
             a,,2020,10,1.0\n",
        );
        let records = read_naturalized_flow_records(&path)?;
        assert_eq!(records.len(), 3);
        assert_eq!((records[0].site_id.as_str(), records[0].month), ("a", 10));
        assert_eq!(records[1].volume, None);
        assert_eq!(records[2].site_id, "b");
        let df = naturalized_flow_frame(&records).unwrap();
        assert_eq!(df.width(), 5);
        Ok(())
    }
}
