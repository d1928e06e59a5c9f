use crate::harness::config::HarnessDirs;
use crate::harness::error::ForecasterError;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Named values computed once by [`Forecaster::preprocess`] and handed to every prediction.
pub type Assets = Map<String, Value>;

/// A forecasting solution driven by the harness.
pub trait Forecaster {
    /// Runs once before any prediction. Defaults to no assets.
    fn preprocess(&mut self, dirs: &HarnessDirs) -> Result<Assets, ForecasterError> {
        let _ = dirs;
        Ok(Assets::new())
    }

    /// Returns the 10th, 50th and 90th percentile volume forecasts.
    fn predict(
        &self,
        site_id: &str,
        issue_date: NaiveDate,
        assets: &Assets,
        dirs: &HarnessDirs,
    ) -> Result<Vec<f64>, ForecasterError>;
}

/// Checks that a prediction holds exactly three finite values.
pub fn validate_prediction(values: &[f64]) -> Result<[f64; 3], String> {
    let quantiles: [f64; 3] = values
        .try_into()
        .map_err(|_| format!("expected 3 values, got {}", values.len()))?;
    if let Some(bad) = quantiles.iter().find(|v| !v.is_finite()) {
        return Err(format!("non-finite value {bad} in {quantiles:?}"));
    }
    Ok(quantiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_prediction() {
        assert_eq!(validate_prediction(&[1.0, 2.0, 3.0]), Ok([1.0, 2.0, 3.0]));
        assert!(validate_prediction(&[1.0, 2.0]).is_err());
        assert!(validate_prediction(&[1.0, 2.0, 3.0, 4.0]).is_err());
        assert!(validate_prediction(&[1.0, f64::NAN, 3.0]).is_err());
        assert!(validate_prediction(&[f64::INFINITY, 2.0, 3.0]).is_err());
    }
}
