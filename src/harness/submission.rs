use crate::harness::error::HarnessError;
use crate::parsers::csv::{parse_date_prefix, read_csv_as_strings, string_column};
use chrono::NaiveDate;
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

pub const QUANTILE_COLUMNS: [&str; 3] = ["volume_10", "volume_50", "volume_90"];

/// One (site, issue date) cell of the submission grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRow {
    pub site_id: String,
    pub issue_date: NaiveDate,
    pub volumes: Option<[f64; 3]>,
}

/// The submission grid, in submission-format order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    rows: Vec<SubmissionRow>,
}

impl Submission {
    /// Reads the `site_id` and `issue_date` keys of a submission format file.
    /// Quantile columns in the file are ignored.
    pub fn read_format(path: &Path) -> Result<Self, HarnessError> {
        let raw = read_csv_as_strings(path)?;
        let sites = string_column(&raw, path, "site_id")?;
        let issue_dates = string_column(&raw, path, "issue_date")?;

        let mut rows = Vec::with_capacity(raw.height());
        for (row, (site_id, issue_date)) in sites.into_iter().zip(issue_dates).enumerate() {
            let (Some(site_id), Some(issue_date)) = (site_id, issue_date.and_then(parse_date_prefix))
            else {
                return Err(HarnessError::SubmissionIssueDate {
                    path: path.to_path_buf(),
                    row: row + 2,
                });
            };
            rows.push(SubmissionRow {
                site_id: site_id.to_string(),
                issue_date,
                volumes: None,
            });
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[SubmissionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn set_volumes(&mut self, index: usize, volumes: [f64; 3]) {
        if let Some(row) = self.rows.get_mut(index) {
            row.volumes = Some(volumes);
        }
    }

    /// `site_id`, `issue_date` and the three quantile columns. Unpredicted rows are null.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut columns = vec![
            Column::new(
                "site_id".into(),
                self.rows.iter().map(|r| r.site_id.as_str()).collect::<Vec<&str>>(),
            ),
            Column::new(
                "issue_date".into(),
                self.rows.iter().map(|r| r.issue_date).collect::<Vec<NaiveDate>>(),
            ),
        ];
        for (position, name) in QUANTILE_COLUMNS.iter().enumerate() {
            let values: Vec<Option<f64>> = self
                .rows
                .iter()
                .map(|r| r.volumes.map(|v| v[position]))
                .collect();
            columns.push(Column::new((*name).into(), values));
        }
        DataFrame::new(columns)
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), HarnessError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| HarnessError::CreateDir(parent.to_path_buf(), e))?;
        }
        let mut file =
            File::create(path).map_err(|e| HarnessError::SubmissionCreate(path.to_path_buf(), e))?;
        let mut frame = self
            .to_frame()
            .map_err(|e| HarnessError::SubmissionWrite(path.to_path_buf(), e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)
            .map_err(|e| HarnessError::SubmissionWrite(path.to_path_buf(), e))?;
        info!("Wrote {} predictions to {}", self.len(), path.display());
        Ok(())
    }
}
