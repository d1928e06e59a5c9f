use crate::config::DataRoot;
use bon::bon;
use chrono::NaiveDate;
use log::warn;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const IS_SMOKE_ENV_VAR: &str = "IS_SMOKE";
pub const FORECAST_ISSUE_DATE_ENV_VAR: &str = "FORECAST_ISSUE_DATE";
pub const DEFAULT_EXECUTION_ROOT: &str = "/code_execution";
pub const DEFAULT_MOUNT_WAIT: Duration = Duration::from_secs(30);

/// Directories the harness reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessDirs {
    pub src: PathBuf,
    pub data: PathBuf,
    pub preprocessed: PathBuf,
    pub submission: PathBuf,
}

impl HarnessDirs {
    /// `src`, `data`, `preprocessed` and `submission` under one root.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            src: root.join("src"),
            data: root.join("data"),
            preprocessed: root.join("preprocessed"),
            submission: root.join("submission"),
        }
    }

    /// The data directory as a reader root.
    pub fn data_root(&self) -> DataRoot {
        DataRoot::new(self.data.clone())
    }

    pub fn submission_file(&self) -> PathBuf {
        self.submission.join("submission.csv")
    }
}

/// Settings for one harness run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub dirs: HarnessDirs,
    pub is_smoke: bool,
    pub forecast_issue_date: Option<NaiveDate>,
    pub mount_wait: Duration,
    pub poll_interval: Duration,
}

#[bon]
impl HarnessConfig {
    /// # Arguments
    ///
    /// * `dirs` - Defaults to the directories under `/code_execution`.
    /// * `is_smoke` - Use the smoke-test submission format. Defaults to `false`.
    /// * `mount_wait` - How long to wait for the data directory. Defaults to 30 s.
    /// * `poll_interval` - Defaults to one second.
    #[builder]
    pub fn new(
        dirs: Option<HarnessDirs>,
        is_smoke: Option<bool>,
        forecast_issue_date: Option<NaiveDate>,
        mount_wait: Option<Duration>,
        poll_interval: Option<Duration>,
    ) -> Self {
        Self {
            dirs: dirs.unwrap_or_else(|| HarnessDirs::under(DEFAULT_EXECUTION_ROOT)),
            is_smoke: is_smoke.unwrap_or(false),
            forecast_issue_date,
            mount_wait: mount_wait.unwrap_or(DEFAULT_MOUNT_WAIT),
            poll_interval: poll_interval.unwrap_or(Duration::from_secs(1)),
        }
    }

    /// Reads `IS_SMOKE` (any non-empty value) and `FORECAST_ISSUE_DATE`.
    pub fn from_env(dirs: HarnessDirs) -> Self {
        let is_smoke = env::var(IS_SMOKE_ENV_VAR).is_ok_and(|v| !v.is_empty());
        let forecast_issue_date = env::var(FORECAST_ISSUE_DATE_ENV_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .and_then(|v| match NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    warn!("Ignoring unreadable {FORECAST_ISSUE_DATE_ENV_VAR} '{v}'");
                    None
                }
            });
        Self::builder()
            .dirs(dirs)
            .is_smoke(is_smoke)
            .maybe_forecast_issue_date(forecast_issue_date)
            .build()
    }

    /// `smoke_submission_format.csv` for smoke runs, else `submission_format.csv`.
    pub fn submission_format_file(&self) -> PathBuf {
        let name = if self.is_smoke {
            "smoke_submission_format.csv"
        } else {
            "submission_format.csv"
        };
        self.dirs.data.join(name)
    }
}
