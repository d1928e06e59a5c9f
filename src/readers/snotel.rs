use crate::error::WaterSupplyError;
use crate::parsers::error::ParseError;
use crate::parsers::snotel::{read_station_observations, snotel_frame, SnotelObservation};
use crate::readers::client::WaterSupplyData;
use crate::stations::selection::StationMapping;
use crate::types::issue_date::{resolve_issue_date, AnyIssueDate};
use chrono::Datelike;
use log::{debug, warn};
use polars::prelude::DataFrame;
use std::collections::BTreeSet;

impl WaterSupplyData {
    /// Daily SNOTEL observations dated before `issue_date` from the stations
    /// mapped to `site_id`, or from every mapped station when no site is given.
    ///
    /// Station files come from the forecast year of `issue_date`. Mapped stations
    /// without a file are skipped. Rows are ordered by `date`, then `station_id`.
    ///
    /// # Errors
    ///
    /// Fails for an unknown site or an unreadable mapping or station file.
    pub fn read_snotel_data(
        &self,
        issue_date: impl AnyIssueDate,
        site_id: Option<&str>,
    ) -> Result<DataFrame, WaterSupplyError> {
        let issue_date = resolve_issue_date(issue_date)?;
        self.check_site(site_id)?;
        let mapping = StationMapping::read_csv(&self.data_root.snotel_mapping_file())?;
        let stations: BTreeSet<&str> = match site_id {
            Some(site_id) => mapping.station_ids_for_site(site_id).into_iter().collect(),
            None => mapping.links().iter().map(|l| l.station_id.as_str()).collect(),
        };

        let forecast_year = issue_date.year();
        let mut observations: Vec<SnotelObservation> = Vec::new();
        for station_id in stations {
            let path = self.data_root.snotel_station_file(station_id, forecast_year);
            match read_station_observations(&path, station_id) {
                Ok(rows) => observations.extend(rows.into_iter().filter(|o| o.date < issue_date)),
                Err(ParseError::MissingSource(_)) => {
                    debug!("No FY{forecast_year} SNOTEL file for station {station_id}");
                }
                Err(e) => return Err(e.into()),
            }
        }
        observations.sort_by(|a, b| (a.date, &a.station_id).cmp(&(b.date, &b.station_id)));

        let duplicates = observations
            .windows(2)
            .filter(|w| w[0].date == w[1].date && w[0].station_id == w[1].station_id)
            .count();
        if duplicates > 0 {
            warn!("Found {duplicates} duplicate (station, date) SNOTEL rows");
        }

        Ok(snotel_frame(&observations)?)
    }
}
