//! # salescast
//!
//! Sales forecasting core for dashboard use: turns an irregular tabular
//! record set into a regular daily series, fits a statistical model and
//! always returns a usable forecast.
//!
//! ## Pipeline
//!
//! - **Preprocessing** ([`preprocess::prepare_data`]): parse the date
//!   column, pick a numeric value column, sum per period, forward-fill gaps.
//! - **Models** ([`models`]): seasonal regression (SARIMA-style) and
//!   exponential smoothing (Holt-Winters), plus a naive persistence model.
//! - **Fallback cascade** ([`cascade`]): an explicit ordered strategy list;
//!   fitting failures degrade the forecast instead of failing the call.
//! - **Dispatcher** ([`forecast_sales`] / [`get_forecast`]): the public
//!   contract between filtered records plus a horizon and a forecast series.
//!
//! Only configuration and data errors reach the caller. Model convergence
//! failures are absorbed: the result then carries the naive forecast and an
//! advisory message describing the degradation.
//!
//! ## Example
//!
//! ```rust
//! use salescast::prelude::*;
//!
//! let mut table = RecordTable::new(vec!["Date", "Total"]);
//! for (i, total) in (1..=20).enumerate() {
//!     let date = format!("2023-01-{:02}", i + 1);
//!     table.push_row(vec![date.into(), (total as f64 * 10.0).into()]).unwrap();
//! }
//!
//! let options = ForecastOptions::with_periods(5);
//! let forecast = forecast_sales(&table, &options).unwrap();
//! assert_eq!(forecast.len(), 5);
//! ```

pub mod cascade;
mod error;
pub mod forecast;
pub mod models;
pub mod preprocess;
pub mod series;
pub mod table;

pub use error::{ErrorKind, ForecastError, Result};
pub use forecast::{forecast_sales, get_forecast, Forecast, ForecastOptions, ForecastPoint, Method};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cascade::{ChainOutcome, FallbackChain, ModelStrategy};
    pub use crate::error::{ErrorKind, ForecastError, Result};
    pub use crate::forecast::{
        forecast_sales, get_forecast, Forecast, ForecastOptions, ForecastPoint, Method,
    };
    pub use crate::models::holt_winters::HoltWinters;
    pub use crate::models::naive::NaivePersistence;
    pub use crate::models::seasonal_arima::SeasonalArima;
    pub use crate::models::Forecaster;
    pub use crate::preprocess::prepare_data;
    pub use crate::series::{Frequency, PreparedSeries};
    pub use crate::table::{RecordTable, Value};
}
