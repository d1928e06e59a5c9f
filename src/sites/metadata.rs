use crate::parsers::csv::{optional_string_column, read_csv_as_strings, string_column};
use crate::parsers::fixed_width::parse_integer;
use crate::sites::error::SiteError;
use log::warn;
use polars::prelude::DataFrame;
use std::collections::BTreeMap;
use std::path::Path;

/// A forecast site from the metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub site_id: String,
    pub site_name: Option<String>,
    /// Kept as text, gauge ids carry leading zeros.
    pub usgs_id: Option<String>,
    pub season_start_month: Option<u32>,
    pub season_end_month: Option<u32>,
}

/// Site metadata keyed by `site_id`.
#[derive(Debug, Clone)]
pub struct SiteMetadata {
    sites: BTreeMap<String, Site>,
    table: DataFrame,
}

impl SiteMetadata {
    pub fn read_csv(path: &Path) -> Result<Self, SiteError> {
        let table = read_csv_as_strings(path)?;
        let ids = string_column(&table, path, "site_id")?;
        let names = optional_string_column(&table, path, "site_name")?;
        let usgs_ids = optional_string_column(&table, path, "usgs_id")?;
        let season_starts = optional_string_column(&table, path, "season_start_month")?;
        let season_ends = optional_string_column(&table, path, "season_end_month")?;

        let text = |column: Option<&polars::prelude::StringChunked>, row: usize| {
            column
                .and_then(|c| c.get(row))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let month = |column, row| {
            text(column, row)
                .and_then(|v| parse_integer(&v).ok())
                .and_then(|v| u32::try_from(v).ok())
        };

        let mut sites = BTreeMap::new();
        for row in 0..table.height() {
            let Some(site_id) = text(Some(ids), row) else {
                warn!("Skipping metadata row {} without site_id", row + 2);
                continue;
            };
            if sites.contains_key(&site_id) {
                warn!("Duplicate site_id '{site_id}' in {}", path.display());
                continue;
            }
            let site = Site {
                site_id: site_id.clone(),
                site_name: text(names, row),
                usgs_id: text(usgs_ids, row),
                season_start_month: month(season_starts, row),
                season_end_month: month(season_ends, row),
            };
            sites.insert(site_id, site);
        }
        Ok(Self { sites, table })
    }

    pub fn get(&self, site_id: &str) -> Result<&Site, SiteError> {
        self.sites
            .get(site_id)
            .ok_or_else(|| SiteError::UnknownSite(site_id.to_string()))
    }

    pub fn contains(&self, site_id: &str) -> bool {
        self.sites.contains_key(site_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// The metadata file as read, every column as text.
    pub fn table(&self) -> &DataFrame {
        &self.table
    }
}
