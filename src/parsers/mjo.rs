use crate::parsers::error::ParseError;
use crate::parsers::fixed_width::parse_value_or_warn;
use crate::parsers::read_source_text;
use chrono::NaiveDate;
use log::warn;
use polars::prelude::*;
use std::path::Path;

pub const DATE_COLUMN: &str = "DATE";

/// Reads the Madden-Julian Oscillation table.
///
/// The first line names the indices, the second line (longitudes) is skipped.
/// Each data line is a `YYYYMMDD` date followed by one value per index, where
/// `*****` marks a missing value. The result has a `DATE` column followed by
/// one float column per index, ordered by date.
pub fn read_mjo_table(path: &Path) -> Result<DataFrame, ParseError> {
    let text = read_source_text(path)?;
    let mut lines = text.lines().enumerate();
    let index_names: Vec<String> = lines
        .next()
        .map(|(_, line)| line.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    if index_names.is_empty() {
        return Err(ParseError::MarkerNotFound {
            path: path.to_path_buf(),
            marker: "index header".to_string(),
        });
    }
    lines.next();

    let mut rows: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
    for (index, line) in lines {
        let mut tokens = line.split_whitespace();
        let Some(date_token) = tokens.next() else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(date_token, "%Y%m%d") else {
            warn!("Skipping line {} of {}: bad date '{date_token}'", index + 1, path.display());
            continue;
        };
        let mut values: Vec<Option<f64>> = tokens
            .map(|token| parse_value_or_warn(token, &[], path, index + 1))
            .collect();
        if values.len() != index_names.len() {
            warn!(
                "Line {} of {} has {} values for {} indices",
                index + 1,
                path.display(),
                values.len(),
                index_names.len()
            );
        }
        values.resize(index_names.len(), None);
        rows.push((date, values));
    }
    rows.sort_by_key(|(date, _)| *date);

    let dates: Vec<NaiveDate> = rows.iter().map(|(date, _)| *date).collect();
    let mut columns = vec![Column::new(DATE_COLUMN.into(), dates)];
    for (position, name) in index_names.iter().enumerate() {
        let values: Vec<Option<f64>> = rows.iter().map(|(_, v)| v[position]).collect();
        columns.push(Column::new(name.as_str().into(), values));
    }
    DataFrame::new(columns).map_err(|e| ParseError::FrameBuild(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_file;

    #[test]
    fn test_read_mjo() -> Result<(), ParseError> {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "mjo.txt",
            "   INDEX_9  INDEX_10\n\
             \x20     20E       70E\n\
             20210310    0.51   *****\n\
             20210305   -0.20    1.10\n",
        );
        let df = read_mjo_table(&path)?;
        dbg!(&df);
        assert_eq!(df.get_column_names_str(), vec!["DATE", "INDEX_9", "INDEX_10"]);
        assert_eq!(df.height(), 2);
        let dates = df.column(DATE_COLUMN).unwrap().date().unwrap();
        assert!(dates.get(0) < dates.get(1), "rows should be sorted by date");
        let index_10 = df.column("INDEX_10").unwrap().f64().unwrap();
        assert_eq!(index_10.get(0), Some(1.10));
        assert_eq!(index_10.get(1), None);
        Ok(())
    }

    #[test]
    fn test_unreadable_value_is_missing() -> Result<(), ParseError> {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "mjo.txt",
            "   INDEX_9  INDEX_10
                   20E       70E
             20210311    x.yz    0.75
",
        );
        let df = read_mjo_table(&path)?;
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("INDEX_9").unwrap().f64().unwrap().get(0), None);
        assert_eq!(df.column("INDEX_10").unwrap().f64().unwrap().get(0), Some(0.75));
        Ok(())
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "mjo.txt", "");
        assert!(matches!(
            read_mjo_table(&path),
            Err(ParseError::MarkerNotFound { .. })
        ));
    }
}
