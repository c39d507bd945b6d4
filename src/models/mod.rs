//! Statistical models behind the forecast dispatcher.
//!
//! All models work on the plain value slice of a prepared series and share
//! the [`Forecaster`] fit/predict contract. Date handling stays outside, in
//! the dispatcher.

pub mod holt_winters;
pub mod naive;
pub mod seasonal_arima;

/// Common trait for all series models
pub trait Forecaster {
    /// Fit the model to historical data
    fn fit(&mut self, data: &[f64]) -> crate::Result<()>;

    /// Point forecast for the next `steps` periods
    fn predict(&self, steps: usize) -> crate::Result<Vec<f64>>;

    /// Check if the model has been fitted
    fn is_fitted(&self) -> bool;
}
