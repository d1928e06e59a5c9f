use crate::error::WaterSupplyError;
use crate::parsers::naturalized_flow::{
    read_naturalized_flow_table, FORECAST_YEAR_COLUMN, SITE_COLUMN, VOLUME_COLUMN,
};
use crate::parsers::usgs::{read_usgs_table, DATE_COLUMN};
use crate::readers::client::WaterSupplyData;
use crate::readers::filter::IssueDateFilterExt;
use crate::types::issue_date::{resolve_issue_date, AnyIssueDate};
use chrono::Datelike;
use polars::prelude::*;

impl WaterSupplyData {
    /// Daily mean discharge (cfs) at the site's USGS gauge, for the forecast
    /// year of `issue_date` and dated strictly before it.
    ///
    /// Columns: `datetime`, `discharge_cfs_mean`.
    ///
    /// # Errors
    ///
    /// Fails for an unknown site or when the site has no file for the forecast year.
    pub fn read_usgs_streamflow_data(
        &self,
        site_id: &str,
        issue_date: impl AnyIssueDate,
    ) -> Result<DataFrame, WaterSupplyError> {
        let issue_date = resolve_issue_date(issue_date)?;
        self.sites.validate_site(site_id)?;
        let path = self
            .data_root
            .usgs_streamflow_file(site_id, issue_date.year());
        let table = self.load_table(&path, read_usgs_table)?;
        Ok(table
            .lazy()
            .filter_dates_before(DATE_COLUMN, issue_date)
            .collect()?)
    }

    /// Monthly naturalized flow volumes (KAF) for the site in the forecast year
    /// of `issue_date`, for months before the issue date's month.
    ///
    /// Columns: `year`, `month`, `volume`.
    pub fn read_test_monthly_naturalized_flow(
        &self,
        site_id: &str,
        issue_date: impl AnyIssueDate,
    ) -> Result<DataFrame, WaterSupplyError> {
        let issue_date = resolve_issue_date(issue_date)?;
        self.sites.validate_site(site_id)?;
        let table = self.load_table(
            &self.data_root.naturalized_flow_file(),
            read_naturalized_flow_table,
        )?;
        Ok(table
            .lazy()
            .filter(
                col(SITE_COLUMN)
                    .eq(lit(site_id))
                    .and(col(FORECAST_YEAR_COLUMN).eq(lit(issue_date.year()))),
            )
            .filter_months_before("year", "month", issue_date)
            .select([col("year"), col("month"), col(VOLUME_COLUMN)])
            .collect()?)
    }
}
