//! Identifies the raw data sources that can be read for an issue date.

use std::fmt;

/// Forecast-year boundary used by CPC outlooks when none is given.
pub const DEFAULT_FY_START_MONTH: u32 = 10;

/// Which CPC long-lead outlook table to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutlookVariable {
    Temperature,
    Precipitation,
}

impl OutlookVariable {
    pub(crate) fn file_prefix(&self) -> &'static str {
        match self {
            OutlookVariable::Temperature => "cpcllftd",
            OutlookVariable::Precipitation => "cpcllfpd",
        }
    }

    /// Substring identifying the header line of each table in the outlook file.
    pub(crate) fn table_marker(&self) -> &'static str {
        match self {
            OutlookVariable::Temperature => "FORECAST TEMPERATURE PERCENTILES",
            OutlookVariable::Precipitation => "FORECAST PRECIPITATION PERCENTILES",
        }
    }
}

impl fmt::Display for OutlookVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlookVariable::Temperature => f.write_str("temperature"),
            OutlookVariable::Precipitation => f.write_str("precipitation"),
        }
    }
}

/// A readable data source.
///
/// Global teleconnection indices ignore the site. Site-bound sources
/// (streamflow, naturalized flow, SNOTEL) cannot be read without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    Mjo,
    NinoRegionsSst,
    Oni,
    Pdo,
    Pna,
    Soi,
    CpcOutlooks {
        variable: OutlookVariable,
        fy_start_month: u32,
    },
    UsgsStreamflow,
    NaturalizedFlow,
    Snotel,
}

impl DataSource {
    pub fn cpc_outlooks(variable: OutlookVariable) -> Self {
        DataSource::CpcOutlooks {
            variable,
            fy_start_month: DEFAULT_FY_START_MONTH,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataSource::Mjo => "mjo",
            DataSource::NinoRegionsSst => "nino_regions_sst",
            DataSource::Oni => "oni",
            DataSource::Pdo => "pdo",
            DataSource::Pna => "pna",
            DataSource::Soi => "soi",
            DataSource::CpcOutlooks {
                variable: OutlookVariable::Temperature,
                ..
            } => "cpc_outlooks_temp",
            DataSource::CpcOutlooks {
                variable: OutlookVariable::Precipitation,
                ..
            } => "cpc_outlooks_precip",
            DataSource::UsgsStreamflow => "usgs_streamflow",
            DataSource::NaturalizedFlow => "test_monthly_naturalized_flow",
            DataSource::Snotel => "snotel",
        }
    }

    pub fn requires_site(&self) -> bool {
        matches!(
            self,
            DataSource::UsgsStreamflow | DataSource::NaturalizedFlow | DataSource::Snotel
        )
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
