//! Naive persistence forecast: flat continuation of the last observation.

use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use serde::{Deserialize, Serialize};

/// Repeats the last observed value across the entire horizon.
///
/// This is the terminal entry of every fallback chain: it fails only on
/// empty input, which the preprocessor already rejects, so a well-formed
/// request always gets a forecast.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaivePersistence {
    level: f64,
    fitted: bool,
}

impl NaivePersistence {
    /// Create a new unfitted model.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value that will be repeated.
    pub fn level(&self) -> f64 {
        self.level
    }
}

impl Forecaster for NaivePersistence {
    fn fit(&mut self, data: &[f64]) -> Result<()> {
        match data.last() {
            Some(&last) if last.is_finite() => {
                self.level = last;
                self.fitted = true;
                Ok(())
            }
            Some(_) => Err(ForecastError::Numerical(
                "last observation is not finite".to_string(),
            )),
            None => Err(ForecastError::InsufficientData {
                required: 1,
                actual: 0,
            }),
        }
    }

    fn predict(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::NotFitted);
        }
        Ok(vec![self.level; steps])
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}
