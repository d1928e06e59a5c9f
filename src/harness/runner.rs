//! Drives a [`Forecaster`] over the submission grid.

use crate::harness::config::HarnessConfig;
use crate::harness::error::HarnessError;
use crate::harness::forecaster::{validate_prediction, Forecaster};
use crate::harness::submission::Submission;
use log::{error, info, warn};
use std::fmt;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Log target for harness lifecycle events.
pub const EVENT_TARGET: &str = "watersupply::event";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    MainStart,
    MainEnd,
    PreprocessStart,
    PreprocessEnd,
    PredictStart,
    PredictEnd,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::MainStart => "main_start",
            Event::MainEnd => "main_end",
            Event::PreprocessStart => "preprocess_start",
            Event::PreprocessEnd => "preprocess_end",
            Event::PredictStart => "predict_start",
            Event::PredictEnd => "predict_end",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn log_event(event: Event, message: &str) {
    info!(target: EVENT_TARGET, "[{event}] {message}");
}

fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_some())
}

/// Polls until `dir` has at least one entry, giving up after `timeout`.
pub fn wait_for_data(dir: &Path, timeout: Duration, poll: Duration) -> Result<Duration, HarnessError> {
    let start = Instant::now();
    loop {
        if has_entries(dir) {
            return Ok(start.elapsed());
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(HarnessError::DataNotMounted {
                path: dir.to_path_buf(),
                waited: elapsed,
            });
        }
        thread::sleep(poll.min(timeout - elapsed));
    }
}

fn prepare_preprocessed_dir(dir: &Path) -> Result<(), HarnessError> {
    if dir.is_dir() {
        if has_entries(dir) {
            warn!("{} is not empty. This is not a clean run.", dir.display());
        }
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| HarnessError::CreateDir(dir.to_path_buf(), e))
}

/// Runs preprocessing and every prediction, then writes `submission.csv`.
///
/// The first failing or invalid prediction aborts the run, and nothing is written.
pub fn run(config: &HarnessConfig, forecaster: &mut impl Forecaster) -> Result<Submission, HarnessError> {
    log_event(Event::MainStart, "Beginning code execution");
    if let Some(date) = config.forecast_issue_date {
        info!("FORECAST_ISSUE_DATE: {date}");
    }
    info!("IS_SMOKE: {}", config.is_smoke);
    info!("data directory: {}", config.dirs.data.display());
    info!("preprocessed directory: {}", config.dirs.preprocessed.display());

    let waited = wait_for_data(&config.dirs.data, config.mount_wait, config.poll_interval)
        .map_err(|e| {
            error!("{e}");
            e
        })?;
    info!("Data directory has entries after waiting {waited:?}");
    prepare_preprocessed_dir(&config.dirs.preprocessed)?;

    log_event(Event::PreprocessStart, "Running preprocess");
    let assets = forecaster
        .preprocess(&config.dirs)
        .map_err(HarnessError::Preprocess)?;
    log_event(Event::PreprocessEnd, "Preprocess complete");
    info!(
        "Loaded assets with keys: {}",
        assets.keys().map(|k| format!("{k:?}")).collect::<Vec<_>>().join(", ")
    );

    let mut submission = Submission::read_format(&config.submission_format_file())?;
    let total = submission.len();
    let update_every = (total / 10).clamp(1, 100);

    log_event(Event::PredictStart, "Beginning predictions");
    for index in 0..total {
        let row = &submission.rows()[index];
        if index % update_every == 0 {
            info!("Predicting {index}/{total}");
        }
        let values = forecaster
            .predict(&row.site_id, row.issue_date, &assets, &config.dirs)
            .map_err(|source| {
                error!("Error predicting ({}, {})", row.site_id, row.issue_date);
                HarnessError::Predict {
                    site_id: row.site_id.clone(),
                    issue_date: row.issue_date.to_string(),
                    source,
                }
            })?;
        let volumes = validate_prediction(&values).map_err(|message| {
            error!("Validation failed for predictions {values:?}");
            HarnessError::InvalidPrediction {
                site_id: row.site_id.clone(),
                issue_date: row.issue_date.to_string(),
                message,
            }
        })?;
        submission.set_volumes(index, volumes);
    }
    log_event(Event::PredictEnd, "Predictions complete");

    submission.write_csv(&config.dirs.submission_file())?;
    log_event(Event::MainEnd, "Code execution run complete");

    if config.forecast_issue_date.is_some() {
        if let Ok(frame) = submission.to_frame() {
            info!("Generated predictions:\n{frame}");
        }
    }
    Ok(submission)
}
