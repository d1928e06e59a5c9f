//! Seasonal volume forecast from recent monthly naturalized flow, driven by the harness.
//!
//! Run with `cargo run --example moving_average -- /path/to/execution/root`.

use chrono::{Datelike, NaiveDate};
use serde_json::Value;
use std::env;
use watersupply::{
    run_harness, Assets, Forecaster, ForecasterError, HarnessConfig, HarnessDirs, WaterSupplyData,
    WaterSupplyError,
};

/// z-score of the 90th percentile of a normal distribution.
const Z_80: f64 = 1.281552;
/// Smoothing factor for an exponential moving average with center of mass 0.5.
const ALPHA: f64 = 2.0 / 3.0;

struct MovingAverage {
    data: WaterSupplyData,
}

fn ewm_mean(values: &[f64]) -> Option<f64> {
    let (weighted, total) = values
        .iter()
        .rev()
        .enumerate()
        .fold((0.0, 0.0), |(weighted, total), (age, value)| {
            let weight = (1.0 - ALPHA).powi(age as i32);
            (weighted + weight * value, total + weight)
        });
    (total > 0.0).then(|| weighted / total)
}

fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    let ddof = if values.len() > 1 { 1.0 } else { 0.0 };
    (squares / (n - ddof)).sqrt()
}

/// First and last month of the forecast season, both within one calendar year.
fn forecast_season(start: Option<u32>, end: Option<u32>) -> Result<(u32, u32), String> {
    let (Some(start), Some(end)) = (start, end) else {
        return Err("no forecast season".to_string());
    };
    if !(1..=12).contains(&start) || !(start..=12).contains(&end) {
        return Err(format!("bad forecast season {start}..{end}"));
    }
    Ok((start, end))
}

impl MovingAverage {
    fn from_training_stats(assets: &Assets, site_id: &str) -> Result<Vec<f64>, ForecasterError> {
        let stats = &assets["train_stats"][site_id];
        let (Some(mean), Some(std)) = (stats["mean"].as_f64(), stats["std"].as_f64()) else {
            return Err(format!("no training statistics for '{site_id}'").into());
        };
        let ci = std * Z_80;
        Ok(vec![mean - ci, mean, mean + ci])
    }
}

impl Forecaster for MovingAverage {
    fn preprocess(&mut self, dirs: &HarnessDirs) -> Result<Assets, ForecasterError> {
        let path = dirs.src.join("train_stats.json");
        log::info!("Loading training years mean and std for each site from {}", path.display());
        let stats: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        let mut assets = Assets::new();
        assets.insert("train_stats".to_string(), stats);
        Ok(assets)
    }

    fn predict(
        &self,
        site_id: &str,
        issue_date: NaiveDate,
        assets: &Assets,
        _dirs: &HarnessDirs,
    ) -> Result<Vec<f64>, ForecasterError> {
        let site = self.data.sites().site(site_id)?;
        let (start, end) = forecast_season(site.season_start_month, site.season_end_month)
            .map_err(|message| format!("{message} for '{site_id}'"))?;
        let flow = self.data.read_test_monthly_naturalized_flow(site_id, issue_date)?;
        let months: Vec<Option<i32>> = flow.column("month")?.i32()?.into_iter().collect();
        let volumes: Vec<Option<f64>> = flow.column("volume")?.f64()?.into_iter().collect();
        let observed: Vec<f64> = volumes.iter().flatten().copied().collect();
        if observed.is_empty() {
            return Self::from_training_stats(assets, site_id);
        }

        // Forward fill, then extend through the end of the season with the moving average.
        let mut series: Vec<(u32, f64)> = Vec::new();
        let mut last = None;
        for (month, volume) in months.iter().zip(&volumes) {
            last = volume.or(last);
            if let (Some(month), Some(value)) = (month, last) {
                series.push((*month as u32, value));
            }
        }
        let mut month = series.last().map_or(issue_date.month(), |(m, _)| *m);
        while month != end {
            month = month % 12 + 1;
            let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
            let next = ewm_mean(&values).unwrap_or_default();
            series.push((month, next));
        }

        let seasonal: f64 = series
            .iter()
            .filter(|(m, _)| (start..=end).contains(m))
            .map(|(_, v)| v)
            .sum();
        let ci = f64::from(end - start + 1) * std_dev(&observed) * Z_80;
        Ok(vec![seasonal - ci, seasonal, seasonal + ci])
    }
}

fn main() -> Result<(), WaterSupplyError> {
    env_logger::init();
    let root = env::args().nth(1).unwrap_or_else(|| "/code_execution".to_string());
    let dirs = HarnessDirs::under(root);
    let data = WaterSupplyData::with_data_root(dirs.data_root());
    let config = HarnessConfig::from_env(dirs);
    let submission = run_harness(&config, &mut MovingAverage { data })?;
    println!("Predicted {} rows", submission.len());
    Ok(())
}
