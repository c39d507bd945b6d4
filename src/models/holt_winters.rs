//! Exponential smoothing (Holt-Winters) forecasting model.
//!
//! Additive level and trend, optional additive seasonal component. The
//! smoothing weights are chosen by a deterministic coordinate descent over a
//! small candidate ladder, minimizing the one-step-ahead squared error.
//! Initial state comes from a simple heuristic rather than an optimizer,
//! which keeps fitting stable on short, noisy sales series.

use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use serde::{Deserialize, Serialize};

const ALPHA_CANDIDATES: [f64; 7] = [0.05, 0.1, 0.2, 0.3, 0.5, 0.7, 0.9];
const BETA_CANDIDATES: [f64; 5] = [0.01, 0.05, 0.1, 0.2, 0.3];
const GAMMA_CANDIDATES: [f64; 5] = [0.01, 0.05, 0.1, 0.2, 0.3];
const DESCENT_PASSES: usize = 2;

/// Smoothing state after one full pass over the data.
struct SmoothingState {
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
    next_season_index: usize,
    sse: f64,
}

/// Holt-Winters model with additive trend and optional additive seasonality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoltWinters {
    /// Season length; `None` fits level and trend only
    seasonal_period: Option<usize>,
    /// Level smoothing weight
    alpha: f64,
    /// Trend smoothing weight
    beta: f64,
    /// Seasonal smoothing weight
    gamma: f64,
    /// Current level
    level: f64,
    /// Current trend
    trend: f64,
    /// Seasonal components (empty when non-seasonal)
    seasonal: Vec<f64>,
    /// Seasonal index of the first forecast step
    next_season_index: usize,
    /// Whether the model has been fitted
    fitted: bool,
}

impl HoltWinters {
    /// Create a new model. `seasonal_period` of `None` fits trend only.
    pub fn new(seasonal_period: Option<usize>) -> Result<Self> {
        if let Some(period) = seasonal_period {
            if period < 2 {
                return Err(ForecastError::InvalidParameter {
                    name: "seasonal_period".to_string(),
                    reason: "must be at least 2".to_string(),
                });
            }
        }
        Ok(Self {
            seasonal_period,
            alpha: 0.3,
            beta: 0.1,
            gamma: 0.1,
            level: 0.0,
            trend: 0.0,
            seasonal: Vec::new(),
            next_season_index: 0,
            fitted: false,
        })
    }

    /// Selected smoothing weights (alpha, beta, gamma).
    pub fn params(&self) -> (f64, f64, f64) {
        (self.alpha, self.beta, self.gamma)
    }

    /// Fitted components: (level, trend, seasonal).
    pub fn components(&self) -> (f64, f64, &[f64]) {
        (self.level, self.trend, &self.seasonal)
    }

    /// Whether a seasonal component is part of the model.
    pub fn is_seasonal(&self) -> bool {
        self.seasonal_period.is_some()
    }

    /// Run the smoothing recursion over `data` with the given weights.
    /// Returns `None` when the recursion produces non-finite state.
    fn run(&self, data: &[f64], alpha: f64, beta: f64, gamma: f64) -> Option<SmoothingState> {
        let mut sse = 0.0;

        if let Some(m) = self.seasonal_period {
            // Heuristic initialization: level from the first cycle, trend
            // from the cycle-to-cycle average change, seasonal as deviation
            // from the initial level.
            let first_avg: f64 = data[..m].iter().sum::<f64>() / m as f64;
            let second_avg: f64 = data[m..2 * m].iter().sum::<f64>() / m as f64;
            let mut level = first_avg;
            let mut trend = (second_avg - first_avg) / m as f64;
            let mut seasonal: Vec<f64> = data[..m].iter().map(|x| x - level).collect();

            for (t, &value) in data.iter().enumerate().skip(m) {
                let idx = t % m;
                let prev_level = level;
                let prev_seasonal = seasonal[idx];

                let one_step = level + trend + prev_seasonal;
                let error = value - one_step;
                sse += error * error;

                level = alpha * (value - prev_seasonal) + (1.0 - alpha) * (level + trend);
                trend = beta * (level - prev_level) + (1.0 - beta) * trend;
                seasonal[idx] = gamma * (value - level) + (1.0 - gamma) * prev_seasonal;
            }

            if !level.is_finite()
                || !trend.is_finite()
                || !sse.is_finite()
                || seasonal.iter().any(|x| !x.is_finite())
            {
                return None;
            }
            Some(SmoothingState {
                level,
                trend,
                seasonal,
                next_season_index: data.len() % m,
                sse,
            })
        } else {
            let mut level = data[0];
            let mut trend = data[1] - data[0];

            for &value in &data[1..] {
                let one_step = level + trend;
                let error = value - one_step;
                sse += error * error;

                let prev_level = level;
                level = alpha * value + (1.0 - alpha) * (level + trend);
                trend = beta * (level - prev_level) + (1.0 - beta) * trend;
            }

            if !level.is_finite() || !trend.is_finite() || !sse.is_finite() {
                return None;
            }
            Some(SmoothingState {
                level,
                trend,
                seasonal: Vec::new(),
                next_season_index: 0,
                sse,
            })
        }
    }

    fn sse_of(&self, data: &[f64], alpha: f64, beta: f64, gamma: f64) -> f64 {
        self.run(data, alpha, beta, gamma)
            .map_or(f64::INFINITY, |state| state.sse)
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, data: &[f64]) -> Result<()> {
        if data.iter().any(|x| !x.is_finite()) {
            return Err(ForecastError::Numerical(
                "data contains NaN or infinite values".to_string(),
            ));
        }
        let required = match self.seasonal_period {
            Some(m) => 2 * m,
            None => 3,
        };
        if data.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: data.len(),
            });
        }

        // Coordinate descent over fixed candidate ladders, one weight at a
        // time, keeping whichever candidate lowers the one-step-ahead SSE.
        let (mut alpha, mut beta, mut gamma) = (0.3, 0.1, 0.1);
        let mut best = self.sse_of(data, alpha, beta, gamma);
        for _ in 0..DESCENT_PASSES {
            for &candidate in &ALPHA_CANDIDATES {
                let sse = self.sse_of(data, candidate, beta, gamma);
                if sse < best {
                    best = sse;
                    alpha = candidate;
                }
            }
            for &candidate in &BETA_CANDIDATES {
                let sse = self.sse_of(data, alpha, candidate, gamma);
                if sse < best {
                    best = sse;
                    beta = candidate;
                }
            }
            if self.seasonal_period.is_some() {
                for &candidate in &GAMMA_CANDIDATES {
                    let sse = self.sse_of(data, alpha, beta, candidate);
                    if sse < best {
                        best = sse;
                        gamma = candidate;
                    }
                }
            }
        }

        let state = self
            .run(data, alpha, beta, gamma)
            .ok_or_else(|| {
                ForecastError::Numerical("smoothing recursion diverged".to_string())
            })?;

        self.alpha = alpha;
        self.beta = beta;
        self.gamma = gamma;
        self.level = state.level;
        self.trend = state.trend;
        self.seasonal = state.seasonal;
        self.next_season_index = state.next_season_index;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::NotFitted);
        }

        let mut forecasts = Vec::with_capacity(steps);
        for h in 1..=steps {
            let mut value = self.level + h as f64 * self.trend;
            if let Some(m) = self.seasonal_period {
                let idx = (self.next_season_index + h - 1) % m;
                value += self.seasonal[idx];
            }
            forecasts.push(value);
        }

        if forecasts.iter().any(|x| !x.is_finite()) {
            return Err(ForecastError::Numerical(
                "forecast produced non-finite values".to_string(),
            ));
        }
        Ok(forecasts)
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}
