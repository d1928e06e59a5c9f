//! A small but complete data root written to a temporary directory.
//!
//! Two sites: `animas_r_at_durango`, whose basin overlaps climate divisions 1
//! and 2, and `dry_creek`, which overlaps none. Global indices cover 2019
//! through early 2021.

use crate::config::DataRoot;
use crate::error::WaterSupplyError;
use crate::readers::client::WaterSupplyData;
use crate::types::data_source::OutlookVariable;
use polars::prelude::DataFrame;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes `content` to `dir/relative`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Asserts that `(year_col, month_col)` is non-decreasing.
pub fn assert_sorted_i32_pairs(df: &DataFrame, year_col: &str, month_col: &str) {
    let years = df.column(year_col).unwrap().i32().unwrap();
    let months = df.column(month_col).unwrap().i32().unwrap();
    let pairs: Vec<(Option<i32>, Option<i32>)> = years.into_iter().zip(months).collect();
    assert!(
        pairs.windows(2).all(|w| w[0] <= w[1]),
        "{year_col}/{month_col} not sorted: {pairs:?}"
    );
}

/// Reads each issue date twice, asserting both reads agree and that every
/// result extends the previous one. Returns the row count per issue date.
pub fn assert_monotonic_and_idempotent(
    issue_dates: &[&str],
    read: impl Fn(&str) -> Result<DataFrame, WaterSupplyError>,
) -> Result<Vec<usize>, WaterSupplyError> {
    let mut heights = Vec::with_capacity(issue_dates.len());
    let mut previous: Option<(&str, DataFrame)> = None;
    for &issue_date in issue_dates {
        let first = read(issue_date)?;
        let second = read(issue_date)?;
        assert!(first.equals_missing(&second), "repeated reads for {issue_date} differ");
        if let Some((earlier_date, earlier)) = &previous {
            assert!(
                earlier.height() <= first.height(),
                "{earlier_date} has more rows than {issue_date}"
            );
            assert!(
                earlier.equals_missing(&first.slice(0, earlier.height())),
                "rows for {earlier_date} are not a prefix of rows for {issue_date}"
            );
        }
        heights.push(first.height());
        previous = Some((issue_date, first));
    }
    Ok(heights)
}

pub struct SourceFixture {
    _dir: TempDir,
    root: DataRoot,
}

impl SourceFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = DataRoot::new(dir.path());
        let fixture = Self { _dir: dir, root };
        fixture.write_sites();
        fixture.write_teleconnections();
        fixture.write_outlooks();
        fixture.write_streamflow();
        fixture.write_snotel();
        fixture
    }

    pub fn root(&self) -> &DataRoot {
        &self.root
    }

    pub fn client(&self) -> WaterSupplyData {
        WaterSupplyData::with_data_root(self.root.clone())
    }

    fn write(&self, path: PathBuf, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn write_sites(&self) {
        self.write(
            self.root.metadata_file(),
            "site_id,site_name,usgs_id,season_start_month,season_end_month\n\
             animas_r_at_durango,Animas River at Durango,09361500,4,7\n\
             dry_creek,Dry Creek,,4,7\n",
        );
        self.write(
            self.root.geospatial_layer("basins"),
            &feature_collection(&[
                polygon_feature("site_id", "\"animas_r_at_durango\"", (-108.0, 37.0, -107.0, 38.0)),
                polygon_feature("site_id", "\"dry_creek\"", (-100.0, 40.0, -99.5, 40.5)),
            ]),
        );
        self.write(
            self.root.geospatial_layer("sites"),
            &feature_collection(&[
                point_feature("animas_r_at_durango", -107.5, 37.3),
                point_feature("dry_creek", -99.7, 40.1),
            ]),
        );
        self.write(
            self.root.climate_divisions_file(),
            &feature_collection(&[
                polygon_feature("CD", "1", (-109.0, 36.0, -107.5, 38.0)),
                polygon_feature("CD", "2", (-107.5, 37.0, -106.0, 39.0)),
                polygon_feature("CD", "3", (-90.0, 30.0, -89.0, 31.0)),
            ]),
        );
    }

    fn write_teleconnections(&self) {
        // PDO: year in 5 columns, months in 6, 99.99 missing
        let mut pdo = String::from("ERSST PDO Index:\nYear  Jan   Feb   Mar   Apr   May   Jun   Jul   Aug   Sep   Oct   Nov   Dec\n");
        for year in 2019..=2021 {
            write!(pdo, "{year:<5}").unwrap();
            for month in 1..=12 {
                let value = match (year, month) {
                    (2019, 1) => -0.5,
                    (2021, m) if m > 4 => 99.99,
                    _ => month as f64 / 10.0 - 0.6,
                };
                write!(pdo, "{value:>6.2}").unwrap();
            }
            pdo.push('\n');
        }
        self.write(self.root.teleconnection_file("pdo"), &pdo);

        // PNA: year in 4 columns, months in 7, trailing months blank
        let mut pna = String::from("year    Jan    Feb    Mar    Apr    May    Jun    Jul    Aug    Sep    Oct    Nov    Dec\n");
        for year in 2019..=2021 {
            write!(pna, "{year:>4}").unwrap();
            let months = if year == 2021 { 4 } else { 12 };
            for month in 1..=months {
                write!(pna, "{:>7.2}", month as f64 / 20.0 - 0.3).unwrap();
            }
            pna.push('\n');
        }
        self.write(self.root.teleconnection_file("pna"), &pna);

        // SOI: an anomaly table, then the standardized table
        let header = "YEAR   JAN   FEB   MAR   APR   MAY   JUN   JUL   AUG   SEP   OCT   NOV   DEC\n";
        let mut soi = String::from("(STAND TAHITI - STAND DARWIN) SEA LEVEL PRESS ANOMALY\n");
        soi.push_str(header);
        for year in 2019..=2021 {
            write!(soi, "{year:>4}").unwrap();
            for _ in 1..=12 {
                write!(soi, "{:>6.1}", 5.0).unwrap();
            }
            soi.push('\n');
        }
        soi.push_str("\n  STANDARDIZED    DATA\n");
        soi.push_str(header);
        for year in 2019..=2021 {
            write!(soi, "{year:>4}").unwrap();
            for month in 1..=12 {
                let value = if year == 2021 && month > 4 {
                    -999.9
                } else {
                    month as f64 / 10.0 - 0.5
                };
                write!(soi, "{value:>6.1}").unwrap();
            }
            soi.push('\n');
        }
        self.write(self.root.teleconnection_file("soi"), &soi);

        let mut oni = String::from("SEAS  YR   TOTAL   ANOM\n");
        let seasons = [
            "DJF", "JFM", "FMA", "MAM", "AMJ", "MJJ", "JJA", "JAS", "ASO", "SON", "OND", "NDJ",
        ];
        for year in 2019..=2021 {
            let count = if year == 2021 { 3 } else { 12 };
            for (index, season) in seasons.iter().take(count).enumerate() {
                let anomaly = index as f64 / 10.0 - 0.6;
                writeln!(oni, "  {season} {year}  {:>5.2}  {anomaly:>5.2}", 26.5 + anomaly).unwrap();
            }
        }
        self.write(self.root.teleconnection_file("oni"), &oni);

        let mut mjo = String::from("   INDEX_1   INDEX_2\n       20E       70E\n");
        for day in 10..=17 {
            let second = if day == 12 { "*****".to_string() } else { format!("{:.2}", day as f64 / 10.0) };
            writeln!(mjo, "202103{day:02}  {:>8.2}  {second:>8}", day as f64 / 20.0).unwrap();
        }
        self.write(self.root.teleconnection_file("mjo"), &mjo);

        let mut nino = String::from(
            " YR   MON  NINO1+2   ANOM   NINO3    ANOM   NINO4    ANOM NINO3.4    ANOM\n",
        );
        for (year, months) in [(2020, 1..=12), (2021, 1..=4)] {
            for month in months {
                writeln!(
                    nino,
                    "{year:>5}{month:>5}{:>8.2}{:>8.2}{:>8.2}{:>8.2}{:>8.2}{:>8.2}{:>8.2}{:>8.2}",
                    23.0, -0.4, 25.0, -0.3, 28.0, -0.2, 26.5, -0.5
                )
                .unwrap();
            }
        }
        self.write(self.root.teleconnection_file("nino_regions_sst"), &nino);
    }

    fn write_outlooks(&self) {
        let precip = OutlookVariable::Precipitation;
        self.write(
            self.root.cpc_outlook_file(precip, 2020),
            &outlook_file(
                precip,
                &[
                    ((8, 20, 2020), &[(2020, 9, 1), (2020, 10, 2)]),
                    ((11, 19, 2020), &[(2020, 12, 1), (2021, 1, 2)]),
                ],
            ),
        );
        self.write(
            self.root.cpc_outlook_file(precip, 2021),
            &outlook_file(
                precip,
                &[
                    ((1, 21, 2021), &[(2021, 2, 1)]),
                    ((3, 18, 2021), &[(2021, 4, 1)]),
                ],
            ),
        );
        let temp = OutlookVariable::Temperature;
        self.write(
            self.root.cpc_outlook_file(temp, 2020),
            &outlook_file(temp, &[((11, 19, 2020), &[(2020, 12, 1), (2021, 1, 2)])]),
        );
    }

    fn write_streamflow(&self) {
        let mut usgs = String::from("datetime,site_no,00060_Mean,00060_Mean_cd\n");
        for day in 12..=16 {
            writeln!(usgs, "2021-03-{day:02} 00:00:00+00:00,09361500,{}.5,A", 100 + day).unwrap();
        }
        self.write(self.root.usgs_streamflow_file("animas_r_at_durango", 2021), &usgs);

        let mut flow = String::from("site_id,forecast_year,year,month,volume\n");
        for (year, month) in [(2019, 10), (2019, 11)] {
            writeln!(flow, "animas_r_at_durango,2020,{year},{month},10.0").unwrap();
        }
        for (year, month) in [(2020, 10), (2020, 11), (2020, 12), (2021, 1), (2021, 2), (2021, 3), (2021, 4)] {
            writeln!(flow, "animas_r_at_durango,2021,{year},{month},{}.0", month * 2).unwrap();
        }
        self.write(self.root.naturalized_flow_file(), &flow);
    }

    fn write_snotel(&self) {
        self.write(
            self.root.snotel_mapping_file(),
            "site_id,stationTriplet,in_basin\n\
             animas_r_at_durango,713:CO:SNTL,True\n\
             animas_r_at_durango,386:CO:SNTL,False\n\
             dry_creek,999:NE:SNTL,True\n",
        );
        self.write(
            self.root.snotel_station_metadata_file(),
            "stationTriplet,name,longitude,latitude\n\
             713:CO:SNTL,Red Mountain Pass,-107.71,37.89\n\
             386:CO:SNTL,Cascade,-106.8,37.5\n\
             999:NE:SNTL,Prairie,-99.7,40.2\n\
             1000:WA:SNTL,Far Away,-120.0,47.0\n",
        );
        let header = "date,WTEQ_DAILY,SNWD_DAILY,PREC_DAILY,TMAX_DAILY,TMIN_DAILY,TAVG_DAILY\n";
        let mut red_mountain = String::from(header);
        for day in 13..=16 {
            writeln!(red_mountain, "2021-03-{day:02},{}.0,40.0,20.0,35.0,10.0,22.0", day).unwrap();
        }
        self.write(self.root.snotel_station_file("713:CO:SNTL", 2021), &red_mountain);
        self.write(
            self.root.snotel_station_file("999:NE:SNTL", 2021),
            "date,WTEQ_DAILY,PREC_DAILY\n2021-03-16,1.0,2.0\n2021-03-14,0.5,1.5\n",
        );
    }
}

fn feature_collection(features: &[String]) -> String {
    format!(
        r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
        features.join(",\n")
    )
}

fn polygon_feature(key: &str, value: &str, (west, south, east, north): (f64, f64, f64, f64)) -> String {
    format!(
        r#"{{"type": "Feature", "properties": {{"{key}": {value}}},
            "geometry": {{"type": "Polygon", "coordinates": [[[{west}, {south}], [{east}, {south}], [{east}, {north}], [{west}, {north}], [{west}, {south}]]]}}}}"#
    )
}

fn point_feature(site_id: &str, longitude: f64, latitude: f64) -> String {
    format!(
        r#"{{"type": "Feature", "properties": {{"site_id": "{site_id}"}},
            "geometry": {{"type": "Point", "coordinates": [{longitude}, {latitude}]}}}}"#
    )
}

type Issuance<'a> = ((u32, u32, i32), &'a [(i32, i32, i32)]);

/// One table per issuance, each with a row per target and climate division 1-3.
fn outlook_file(variable: OutlookVariable, issuances: &[Issuance<'_>]) -> String {
    let wide_columns = match variable {
        OutlookVariable::Temperature => 2,
        OutlookVariable::Precipitation => 3,
    };
    let mut text = String::new();
    for ((month, day, year), targets) in issuances {
        writeln!(text, "{month:>2}{day:02} {year}  {}", variable.table_marker()).unwrap();
        text.push_str("YEAR MN LEAD CD    R   98.   95.\n");
        for (target_year, target_month, lead) in *targets {
            for division in 1..=3 {
                write!(text, "{target_year:>4}{target_month:>4}{lead:>4}{division:>4}{:>5.1}", 0.4).unwrap();
                for position in 0..15 {
                    write!(text, "{:>6.2}", 3.0 - position as f64 * 0.2).unwrap();
                }
                for _ in 0..wide_columns {
                    write!(text, "{:>7.2}", 0.3).unwrap();
                }
                text.push('\n');
            }
        }
    }
    text.push_str("9999\n");
    text
}
