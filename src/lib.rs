//! Readers for water supply forecasting source data, bounded by a forecast issue date.
//!
//! Every read returns a [`polars::prelude::DataFrame`] holding only the rows that
//! were knowable on the issue date. See [`WaterSupplyData`] for the entry point.

mod config;
mod error;
mod harness;
pub mod parsers;
mod readers;
mod sites;
mod stations;
mod types;

#[cfg(test)]
mod test_support;

pub use config::{DataRoot, DATA_ROOT_ENV_VAR};
pub use error::WaterSupplyError;

pub use readers::client::WaterSupplyData;
pub use readers::filter::IssueDateFilterExt;

pub use types::data_source::{DataSource, OutlookVariable, DEFAULT_FY_START_MONTH};
pub use types::issue_date::AnyIssueDate;
pub use types::season::OniSeason;
pub use types::year_month::YearMonth;

pub use sites::error::SiteError;
pub use sites::geospatial::{BasinLayer, ClimateDivision, ClimateDivisionLayer, SitePointLayer};
pub use sites::metadata::{Site, SiteMetadata};
pub use sites::store::SiteStore;

pub use parsers::error::ParseError;
pub use stations::error::StationError;
pub use stations::projection::AlbersEqualArea;
pub use stations::selection::{SiteStationLink, StationMapping, StationSelector, DEFAULT_BUFFER_METERS};
pub use stations::station::{load_stations, MonitoringStation};

pub use harness::config::{HarnessConfig, HarnessDirs};
pub use harness::error::{ForecasterError, HarnessError};
pub use harness::forecaster::{validate_prediction, Assets, Forecaster};
pub use harness::runner::{run as run_harness, wait_for_data, Event, EVENT_TARGET};
pub use harness::submission::{Submission, SubmissionRow, QUANTILE_COLUMNS};
