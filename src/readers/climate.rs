//! CPC long-lead seasonal outlooks.

use crate::error::WaterSupplyError;
use crate::parsers::cpc_outlooks::{read_outlook_table, ISSUE_DATE_COLUMN, KEY_COLUMNS};
use crate::parsers::error::ParseError;
use crate::readers::client::WaterSupplyData;
use crate::readers::filter::IssueDateFilterExt;
use crate::types::data_source::{OutlookVariable, DEFAULT_FY_START_MONTH};
use crate::types::issue_date::{resolve_issue_date, AnyIssueDate};
use bon::bon;
use chrono::{Datelike, NaiveDate};
use log::warn;
use polars::prelude::*;

const MONTH_COLUMN: &str = KEY_COLUMNS[1];
const DIVISION_COLUMN: &str = KEY_COLUMNS[3];

#[bon]
impl WaterSupplyData {
    /// Outlooks issued for the forecast year of `issue_date`, up to the day before it.
    ///
    /// Rows come from two calendar-year files. From the previous year, rows with a
    /// target month (`MN`) at or after `fy_start_month` are kept. From the issue
    /// year, rows issued strictly before `issue_date` are kept. When `site_id` is
    /// given, only climate divisions intersecting the site's basin remain.
    ///
    /// # Arguments
    ///
    /// * `variable` - Temperature or precipitation.
    /// * `fy_start_month` - First month of the forecast year. Defaults to October.
    ///
    /// # Errors
    ///
    /// Fails with [`ParseError::MissingSource`] if the previous year's file is
    /// missing. A missing issue-year file only logs a warning.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use chrono::NaiveDate;
    /// # use watersupply::{OutlookVariable, WaterSupplyData, WaterSupplyError};
    /// # fn run() -> Result<(), WaterSupplyError> {
    /// let data = WaterSupplyData::new();
    /// let outlooks = data
    ///     .cpc_outlooks()
    ///     .variable(OutlookVariable::Temperature)
    ///     .issue_date(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap())
    ///     .site_id("animas_r_at_durango")
    ///     .fy_start_month(9)
    ///     .call()?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub fn cpc_outlooks(
        &self,
        variable: OutlookVariable,
        issue_date: NaiveDate,
        site_id: Option<&str>,
        fy_start_month: Option<u32>,
    ) -> Result<DataFrame, WaterSupplyError> {
        let fy_start_month = fy_start_month.unwrap_or(DEFAULT_FY_START_MONTH) as i32;
        let divisions = match site_id {
            Some(site_id) => Some(self.climate_divisions_for_site(site_id)?),
            None => None,
        };
        let year = issue_date.year();

        let previous_path = self.data_root.cpc_outlook_file(variable, year - 1);
        let previous = self
            .load_table(&previous_path, |path| read_outlook_table(path, variable, year - 1))?
            .lazy()
            .filter(col(MONTH_COLUMN).gt_eq(lit(fy_start_month)))
            .collect()?;

        let current_path = self.data_root.cpc_outlook_file(variable, year);
        let outlooks =
            match self.load_table(&current_path, |path| read_outlook_table(path, variable, year)) {
                Ok(current) => {
                    let current = current
                        .lazy()
                        .filter_dates_before(ISSUE_DATE_COLUMN, issue_date)
                        .collect()?;
                    previous.vstack(&current)?
                }
                Err(WaterSupplyError::Parse(ParseError::MissingSource(_))) => {
                    warn!(
                        "No CPC {variable} outlooks available for calendar year {year}. \
                         Only data from calendar year {} loaded.",
                        year - 1
                    );
                    previous
                }
                Err(e) => return Err(e),
            };

        Ok(match divisions {
            Some(divisions) => outlooks
                .lazy()
                .filter_one_of(DIVISION_COLUMN, &divisions)
                .collect()?,
            None => outlooks,
        })
    }

    /// Temperature outlooks as of `issue_date`, starting in October of the previous year.
    pub fn read_cpc_outlooks_temp(
        &self,
        issue_date: impl AnyIssueDate,
        site_id: Option<&str>,
    ) -> Result<DataFrame, WaterSupplyError> {
        self.cpc_outlooks()
            .variable(OutlookVariable::Temperature)
            .issue_date(resolve_issue_date(issue_date)?)
            .maybe_site_id(site_id)
            .call()
    }

    /// Precipitation outlooks as of `issue_date`, starting in October of the previous year.
    pub fn read_cpc_outlooks_precip(
        &self,
        issue_date: impl AnyIssueDate,
        site_id: Option<&str>,
    ) -> Result<DataFrame, WaterSupplyError> {
        self.cpc_outlooks()
            .variable(OutlookVariable::Precipitation)
            .issue_date(resolve_issue_date(issue_date)?)
            .maybe_site_id(site_id)
            .call()
    }
}
