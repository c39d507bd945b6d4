//! Ordered fallback cascade over forecasting strategies.
//!
//! The failure policy "try the seasonal model, then the simplified model,
//! then naive" lives here as an explicit list of strategies evaluated in
//! sequence, not as nested catch blocks. Each strategy is independently
//! constructible, so the policy can be audited in tests with stubs instead
//! of provoking real numerical failures.

use crate::error::{ForecastError, Result};
use crate::models::holt_winters::HoltWinters;
use crate::models::naive::NaivePersistence;
use crate::models::seasonal_arima::SeasonalArima;
use crate::models::Forecaster;
use tracing::{debug, warn};

/// One candidate model in a fallback chain.
pub trait ModelStrategy {
    /// Short name used in advisories and logs.
    fn name(&self) -> &'static str;

    /// Fit on `data` and forecast `steps` periods ahead.
    fn forecast(&self, data: &[f64], steps: usize) -> Result<Vec<f64>>;
}

/// Result of running a chain: the winning forecast, which strategy produced
/// it, and an advisory describing any degradation along the way.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    /// Forecast values, one per requested period
    pub values: Vec<f64>,
    /// Name of the strategy that produced the values
    pub model: &'static str,
    /// Present when one or more earlier strategies failed
    pub advisory: Option<String>,
}

/// Ordered list of strategies evaluated in sequence.
pub struct FallbackChain {
    strategies: Vec<Box<dyn ModelStrategy>>,
}

impl FallbackChain {
    /// Build a chain from strategies in evaluation order.
    pub fn new(strategies: Vec<Box<dyn ModelStrategy>>) -> Self {
        Self { strategies }
    }

    /// Names of the strategies, in evaluation order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Evaluate strategies in order and return the first usable forecast.
    ///
    /// A forecast is usable when it has exactly `steps` finite values. When
    /// the winner is not the first strategy, the outcome carries an advisory
    /// naming what failed. Errs only when every strategy fails, which a
    /// chain terminated by the naive strategy prevents for non-empty input.
    pub fn run(&self, data: &[f64], steps: usize) -> Result<ChainOutcome> {
        let mut failures: Vec<String> = Vec::new();

        for strategy in &self.strategies {
            match strategy.forecast(data, steps) {
                Ok(values) if values.len() == steps && values.iter().all(|v| v.is_finite()) => {
                    debug!(model = strategy.name(), "forecast strategy selected");
                    let advisory = if failures.is_empty() {
                        None
                    } else {
                        Some(format!(
                            "{}; used {} instead",
                            failures.join("; "),
                            strategy.name()
                        ))
                    };
                    return Ok(ChainOutcome {
                        values,
                        model: strategy.name(),
                        advisory,
                    });
                }
                Ok(_) => {
                    warn!(model = strategy.name(), "strategy returned an unusable forecast");
                    failures.push(format!("{} returned an unusable forecast", strategy.name()));
                }
                Err(e) => {
                    warn!(model = strategy.name(), error = %e, "strategy failed");
                    failures.push(format!("{} failed ({e})", strategy.name()));
                }
            }
        }

        Err(ForecastError::Numerical(format!(
            "all forecast strategies failed: {}",
            failures.join("; ")
        )))
    }
}

/// Weekly seasonal regression candidate: (1,1,1)(1,1,1) at period 7.
pub struct SeasonalRegressionStrategy;

impl ModelStrategy for SeasonalRegressionStrategy {
    fn name(&self) -> &'static str {
        "seasonal regression"
    }

    fn forecast(&self, data: &[f64], steps: usize) -> Result<Vec<f64>> {
        let mut model = SeasonalArima::with_seasonal(1, 1, 1, 1, 1, 1, 7)?;
        model.fit(data)?;
        model.predict(steps)
    }
}

/// Retry candidate: the same (1,1,1) order without the seasonal term.
pub struct RegressionStrategy;

impl ModelStrategy for RegressionStrategy {
    fn name(&self) -> &'static str {
        "regression"
    }

    fn forecast(&self, data: &[f64], steps: usize) -> Result<Vec<f64>> {
        let mut model = SeasonalArima::new(1, 1, 1)?;
        model.fit(data)?;
        model.predict(steps)
    }
}

/// Exponential smoothing candidate with an optional seasonal period.
pub struct SmoothingStrategy {
    seasonal_period: Option<usize>,
}

impl SmoothingStrategy {
    /// Trend-plus-seasonal smoothing at `period`.
    pub fn seasonal(period: usize) -> Self {
        Self {
            seasonal_period: Some(period),
        }
    }

    /// Trend-only smoothing.
    pub fn trend_only() -> Self {
        Self {
            seasonal_period: None,
        }
    }
}

impl ModelStrategy for SmoothingStrategy {
    fn name(&self) -> &'static str {
        if self.seasonal_period.is_some() {
            "seasonal smoothing"
        } else {
            "trend smoothing"
        }
    }

    fn forecast(&self, data: &[f64], steps: usize) -> Result<Vec<f64>> {
        let mut model = HoltWinters::new(self.seasonal_period)?;
        model.fit(data)?;
        model.predict(steps)
    }
}

/// Terminal candidate: flat continuation of the last observed value.
pub struct NaiveStrategy;

impl ModelStrategy for NaiveStrategy {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn forecast(&self, data: &[f64], steps: usize) -> Result<Vec<f64>> {
        let mut model = NaivePersistence::new();
        model.fit(data)?;
        model.predict(steps)
    }
}
