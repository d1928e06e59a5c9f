pub mod config;
pub mod error;
pub mod forecaster;
pub mod runner;
pub mod submission;
