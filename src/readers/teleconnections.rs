//! Global climate indices. A site id, when given, is validated but does not
//! narrow the rows.

use crate::error::WaterSupplyError;
use crate::parsers::mjo::{read_mjo_table, DATE_COLUMN as MJO_DATE_COLUMN};
use crate::parsers::monthly_indices::{read_pdo_table, read_pna_table, read_soi_table};
use crate::parsers::nino::{read_nino_table, MONTH_COLUMN as NINO_MONTH_COLUMN, YEAR_COLUMN as NINO_YEAR_COLUMN};
use crate::parsers::oni::{read_oni_table, SEASON_COLUMN, YEAR_COLUMN as ONI_YEAR_COLUMN};
use crate::readers::client::WaterSupplyData;
use crate::readers::filter::IssueDateFilterExt;
use crate::types::issue_date::{resolve_issue_date, AnyIssueDate};
use crate::types::season::OniSeason;
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::Path;

const AVAILABLE_YEAR: &str = "available_year";
const AVAILABLE_MONTH: &str = "available_month";

impl WaterSupplyData {
    fn read_monthly_index(
        &self,
        name: &str,
        parse: impl FnOnce(&Path) -> Result<DataFrame, crate::parsers::error::ParseError>,
        issue_date: NaiveDate,
        site_id: Option<&str>,
    ) -> Result<DataFrame, WaterSupplyError> {
        self.check_site(site_id)?;
        let table = self.load_table(&self.data_root.teleconnection_file(name), parse)?;
        Ok(table
            .lazy()
            .filter_months_before("year", "month", issue_date)
            .collect()?)
    }

    /// Pacific Decadal Oscillation index for months before the issue date's month.
    ///
    /// Columns: `year`, `month`, `pdo_index`.
    pub fn read_pdo_data(
        &self,
        issue_date: impl AnyIssueDate,
        site_id: Option<&str>,
    ) -> Result<DataFrame, WaterSupplyError> {
        let issue_date = resolve_issue_date(issue_date)?;
        self.read_monthly_index("pdo", read_pdo_table, issue_date, site_id)
    }

    /// Pacific-North American index for months before the issue date's month.
    ///
    /// Columns: `year`, `month`, `pna_index`.
    pub fn read_pna_data(
        &self,
        issue_date: impl AnyIssueDate,
        site_id: Option<&str>,
    ) -> Result<DataFrame, WaterSupplyError> {
        let issue_date = resolve_issue_date(issue_date)?;
        self.read_monthly_index("pna", read_pna_table, issue_date, site_id)
    }

    /// Standardized Southern Oscillation Index for months before the issue date's month.
    ///
    /// Columns: `year`, `month`, `soi`.
    pub fn read_soi_data(
        &self,
        issue_date: impl AnyIssueDate,
        site_id: Option<&str>,
    ) -> Result<DataFrame, WaterSupplyError> {
        let issue_date = resolve_issue_date(issue_date)?;
        self.read_monthly_index("soi", read_soi_table, issue_date, site_id)
    }

    /// Niño region sea surface temperatures for months before the issue date's month.
    pub fn read_nino_regions_sst_data(
        &self,
        issue_date: impl AnyIssueDate,
        site_id: Option<&str>,
    ) -> Result<DataFrame, WaterSupplyError> {
        let issue_date = resolve_issue_date(issue_date)?;
        self.check_site(site_id)?;
        let table = self.load_table(
            &self.data_root.teleconnection_file("nino_regions_sst"),
            read_nino_table,
        )?;
        Ok(table
            .lazy()
            .filter_months_before(NINO_YEAR_COLUMN, NINO_MONTH_COLUMN, issue_date)
            .collect()?)
    }

    /// Oceanic Niño Index seasons published by the issue date's month.
    ///
    /// A season is published the month after it ends: `DJF 2021` in March 2021,
    /// `NDJ 2020` in February 2021.
    pub fn read_oni_data(
        &self,
        issue_date: impl AnyIssueDate,
        site_id: Option<&str>,
    ) -> Result<DataFrame, WaterSupplyError> {
        let issue_date = resolve_issue_date(issue_date)?;
        self.check_site(site_id)?;
        let table = self.load_table(&self.data_root.teleconnection_file("oni"), read_oni_table)?;

        let seasons = table.column(SEASON_COLUMN)?.str()?;
        let years = table.column(ONI_YEAR_COLUMN)?.i32()?;
        let (available_years, available_months): (Vec<Option<i32>>, Vec<Option<i32>>) = seasons
            .into_iter()
            .zip(years)
            .map(|(season, year)| {
                match (season.and_then(|s| s.parse::<OniSeason>().ok()), year) {
                    (Some(season), Some(year)) => {
                        let available = season.available_in(year);
                        (Some(available.year), Some(available.month as i32))
                    }
                    _ => (None, None),
                }
            })
            .unzip();
        let original_columns: Vec<Expr> = table
            .get_column_names()
            .into_iter()
            .map(|name| col(name.clone()))
            .collect();

        Ok(table
            .hstack(&[
                Column::new(AVAILABLE_YEAR.into(), available_years),
                Column::new(AVAILABLE_MONTH.into(), available_months),
            ])?
            .lazy()
            .filter_months_through(AVAILABLE_YEAR, AVAILABLE_MONTH, issue_date)
            .select(original_columns)
            .collect()?)
    }

    /// Madden-Julian Oscillation indices dated on or before the issue date.
    pub fn read_mjo_data(
        &self,
        issue_date: impl AnyIssueDate,
        site_id: Option<&str>,
    ) -> Result<DataFrame, WaterSupplyError> {
        let issue_date = resolve_issue_date(issue_date)?;
        self.check_site(site_id)?;
        let table = self.load_table(&self.data_root.teleconnection_file("mjo"), read_mjo_table)?;
        Ok(table
            .lazy()
            .filter_dates_through(MJO_DATE_COLUMN, issue_date)
            .collect()?)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::WaterSupplyError;
    use crate::parsers::error::ParseError;
    use crate::test_support::{assert_monotonic_and_idempotent, assert_sorted_i32_pairs, SourceFixture};
    use chrono::NaiveDate;
    use polars::prelude::*;

    #[test]
    fn test_read_oni_boundary_seasons() -> Result<(), WaterSupplyError> {
        let fixture = SourceFixture::new();
        let df = fixture.client().read_oni_data("2021-03-15", None)?;
        dbg!(&df);
        let seasons = df.column("SEAS")?.str()?;
        let years = df.column("YR")?.i32()?;
        let last = df.height() - 1;
        assert_eq!(seasons.get(last), Some("DJF"));
        assert_eq!(years.get(last), Some(2021));
        // OND and NDJ of 2020 are published in January and February 2021
        let count_2020 = years.into_iter().filter(|y| *y == Some(2020)).count();
        assert_eq!(count_2020, 12);
        assert_eq!(df.get_column_names_str(), vec!["SEAS", "YR", "TOTAL", "ANOM"]);
        Ok(())
    }

    #[test]
    fn test_read_oni_before_ndj_published() -> Result<(), WaterSupplyError> {
        let fixture = SourceFixture::new();
        let df = fixture.client().read_oni_data("2021-01-10", None)?;
        let seasons = df.column("SEAS")?.str()?;
        let years = df.column("YR")?.i32()?;
        let last = df.height() - 1;
        assert_eq!((seasons.get(last), years.get(last)), (Some("OND"), Some(2020)));
        Ok(())
    }

    #[test]
    fn test_read_pdo_data() -> Result<(), WaterSupplyError> {
        let fixture = SourceFixture::new();
        let df = fixture.client().read_pdo_data("2021-03-15", None)?;
        dbg!(&df);
        let years = df.column("year")?.i32()?;
        let months = df.column("month")?.i32()?;
        assert_eq!(years.into_iter().filter(|y| *y == Some(2020)).count(), 12);
        let last = df.height() - 1;
        let final_period = (years.get(last).unwrap(), months.get(last).unwrap());
        assert!(final_period < (2021, 3), "final period {final_period:?}");
        assert_eq!(final_period, (2021, 2));
        assert_sorted_i32_pairs(&df, "year", "month");
        Ok(())
    }

    #[test]
    fn test_monthly_indices_sorted_and_idempotent() -> Result<(), WaterSupplyError> {
        let fixture = SourceFixture::new();
        let data = fixture.client();
        for read in [
            WaterSupplyDataReader::Pdo,
            WaterSupplyDataReader::Pna,
            WaterSupplyDataReader::Soi,
        ] {
            let first = read.call(&data, "2021-03-15")?;
            let second = read.call(&data, "2021-03-15")?;
            assert!(first.equals_missing(&second), "{read:?} not idempotent");
            assert_sorted_i32_pairs(&first, "year", "month");
        }
        Ok(())
    }

    #[derive(Debug, Clone, Copy)]
    enum WaterSupplyDataReader {
        Pdo,
        Pna,
        Soi,
    }

    impl WaterSupplyDataReader {
        fn call(
            self,
            data: &crate::WaterSupplyData,
            issue_date: &str,
        ) -> Result<DataFrame, WaterSupplyError> {
            match self {
                Self::Pdo => data.read_pdo_data(issue_date, None),
                Self::Pna => data.read_pna_data(issue_date, None),
                Self::Soi => data.read_soi_data(issue_date, None),
            }
        }
    }

    #[test]
    fn test_monotonic_in_issue_date() -> Result<(), WaterSupplyError> {
        let fixture = SourceFixture::new();
        let data = fixture.client();
        let earlier = data.read_soi_data("2020-11-01", None)?;
        let later = data.read_soi_data("2021-03-15", None)?;
        assert!(earlier.height() < later.height());
        let prefix = later.slice(0, earlier.height());
        assert!(earlier.equals_missing(&prefix));
        Ok(())
    }

    #[test]
    fn test_read_nino_regions() -> Result<(), WaterSupplyError> {
        let fixture = SourceFixture::new();
        let df = fixture.client().read_nino_regions_sst_data("2021-03-15", None)?;
        assert_eq!(df.height(), 14);
        assert_sorted_i32_pairs(&df, "YR", "MON");
        Ok(())
    }

    #[test]
    fn test_read_mjo_includes_issue_date() -> Result<(), WaterSupplyError> {
        let fixture = SourceFixture::new();
        let df = fixture.client().read_mjo_data("2021-03-15", None)?;
        let last = df.column("DATE")?.date()?.as_date_iter().last().flatten();
        assert_eq!(last, NaiveDate::from_ymd_opt(2021, 3, 15));
        assert!(df.height() > 1);
        Ok(())
    }

    #[test]
    fn test_oni_grows_with_publication_month() -> Result<(), WaterSupplyError> {
        let fixture = SourceFixture::new();
        let data = fixture.client();
        let heights = assert_monotonic_and_idempotent(
            &["2021-01-01", "2021-01-31", "2021-02-01", "2021-03-01", "2021-03-31", "2021-04-01"],
            |issue_date| data.read_oni_data(issue_date, None),
        )?;
        // OND 2020 arrives in January, NDJ in February, DJF 2021 in March
        assert_eq!(heights, vec![23, 23, 24, 25, 25, 26]);
        Ok(())
    }

    #[test]
    fn test_mjo_grows_through_issue_date() -> Result<(), WaterSupplyError> {
        let fixture = SourceFixture::new();
        let data = fixture.client();
        let heights = assert_monotonic_and_idempotent(
            &["2021-03-09", "2021-03-10", "2021-03-11", "2021-03-17", "2021-03-18"],
            |issue_date| data.read_mjo_data(issue_date, None),
        )?;
        assert_eq!(heights, vec![0, 1, 2, 8, 8]);
        Ok(())
    }

    #[test]
    fn test_nino_grows_by_month() -> Result<(), WaterSupplyError> {
        let fixture = SourceFixture::new();
        let data = fixture.client();
        let heights = assert_monotonic_and_idempotent(
            &["2020-12-31", "2021-01-01", "2021-04-30", "2021-05-01"],
            |issue_date| data.read_nino_regions_sst_data(issue_date, None),
        )?;
        assert_eq!(heights, vec![11, 12, 15, 16]);
        Ok(())
    }

    #[test]
    fn test_missing_source() {
        let fixture = SourceFixture::new();
        std::fs::remove_file(fixture.root().teleconnection_file("pna")).unwrap();
        let err = fixture.client().read_pna_data("2021-03-15", None).unwrap_err();
        assert!(matches!(err, WaterSupplyError::Parse(ParseError::MissingSource(_))));
    }
}
