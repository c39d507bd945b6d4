//! Forecast dispatcher: the contract between "filtered records + horizon"
//! and a forecast series.
//!
//! [`forecast_sales`] prepares the series, builds the fallback chain for the
//! selected method, runs it and stamps the forecast dates.
//! [`get_forecast`] wraps the same result into a two-column table for
//! presentation.

use crate::cascade::{
    FallbackChain, NaiveStrategy, RegressionStrategy, SeasonalRegressionStrategy,
    SmoothingStrategy,
};
use crate::error::{ForecastError, Result};
use crate::preprocess::prepare_data;
use crate::series::Frequency;
use crate::table::RecordTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Seasonal period assumed by both methods on daily data (weekly pattern).
const WEEKLY_PERIOD: usize = 7;

/// Minimum series length before the smoothing method enables a seasonal
/// component: two full weekly cycles.
const MIN_SEASONAL_POINTS: usize = 2 * WEEKLY_PERIOD;

/// Forecasting method selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// Seasonal regression: (1,1,1)(1,1,1) at period 7, with a non-seasonal
    /// retry
    SeasonalRegression,
    /// Exponential smoothing: additive trend, seasonal only with enough data
    Smoothing,
}

impl Method {
    /// Select a method from its wire name.
    ///
    /// `"arima"` (case-insensitive) selects the seasonal regression model.
    /// Every other string, including unrecognized ones, selects the
    /// smoothing model. The permissive default is intentional, kept for
    /// compatibility with the dashboard's existing method strings.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("arima") {
            Method::SeasonalRegression
        } else {
            Method::Smoothing
        }
    }
}

/// Options for [`forecast_sales`] and [`get_forecast`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOptions {
    /// Forecast horizon in periods
    pub periods: usize,
    /// Resampling frequency
    pub freq: Frequency,
    /// Name of the date column
    pub date_col: String,
    /// Name of the value column (falls back to the first numeric column)
    pub value_col: String,
    /// Model selection
    pub method: Method,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            periods: 30,
            freq: Frequency::Daily,
            date_col: "Date".to_string(),
            value_col: "Total".to_string(),
            method: Method::SeasonalRegression,
        }
    }
}

impl ForecastOptions {
    /// Options with the given horizon and defaults elsewhere.
    pub fn with_periods(periods: usize) -> Self {
        Self {
            periods,
            ..Self::default()
        }
    }

    /// Set the method, consuming and returning self.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

/// One forecasted period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Forecast date
    pub date: NaiveDate,
    /// Forecasted value
    pub value: f64,
}

/// Forecast series plus the structured outcome of the fallback chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// (date, value) pairs, one per requested period, contiguous
    pub points: Vec<ForecastPoint>,
    /// Name of the strategy that produced the values
    pub model: String,
    /// Present when the forecast is degraded (an earlier strategy failed)
    pub advisory: Option<String>,
}

impl Forecast {
    /// Number of forecast points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the forecast holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Forecast values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Forecast dates in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }
}

fn build_chain(method: Method, series_len: usize, freq: Frequency) -> FallbackChain {
    match method {
        Method::SeasonalRegression => FallbackChain::new(vec![
            Box::new(SeasonalRegressionStrategy),
            Box::new(RegressionStrategy),
            Box::new(NaiveStrategy),
        ]),
        Method::Smoothing => {
            // The weekly period is only meaningful on daily data.
            let smoothing = if freq == Frequency::Daily && series_len >= MIN_SEASONAL_POINTS {
                SmoothingStrategy::seasonal(WEEKLY_PERIOD)
            } else {
                SmoothingStrategy::trend_only()
            };
            FallbackChain::new(vec![Box::new(smoothing), Box::new(NaiveStrategy)])
        }
    }
}

/// Forecast sales from raw transaction records.
///
/// Resamples the records into a regular series, fits the selected model via
/// its fallback chain and returns `options.periods` (date, value) pairs
/// starting one period after the last historical date. Configuration and
/// data errors propagate; model convergence failures never do — they
/// degrade to the naive forecast and set the advisory.
///
/// # Errors
///
/// * [`ForecastError::InvalidParameter`] for a zero horizon, or when the
///   seasonal regression method is combined with a non-daily frequency
///   (its weekly seasonal period assumes daily data).
/// * Preprocessing errors, unchanged (see
///   [`prepare_data`](crate::preprocess::prepare_data)).
pub fn forecast_sales(table: &RecordTable, options: &ForecastOptions) -> Result<Forecast> {
    if options.periods == 0 {
        return Err(ForecastError::InvalidParameter {
            name: "periods".to_string(),
            reason: "must be a positive integer".to_string(),
        });
    }
    if options.method == Method::SeasonalRegression && options.freq != Frequency::Daily {
        return Err(ForecastError::InvalidParameter {
            name: "method".to_string(),
            reason: "seasonal regression assumes a weekly pattern on daily data; \
                     use the smoothing method for other frequencies"
                .to_string(),
        });
    }

    let series = prepare_data(table, &options.date_col, &options.value_col, options.freq)?;
    debug!(
        points = series.len(),
        periods = options.periods,
        method = ?options.method,
        "prepared series"
    );

    let chain = build_chain(options.method, series.len(), options.freq);
    let outcome = chain.run(series.values(), options.periods)?;

    // Sales cannot be negative: the smoothing path clips on both the fitted
    // and the fallback branch.
    let values: Vec<f64> = if options.method == Method::Smoothing {
        outcome.values.iter().map(|v| v.max(0.0)).collect()
    } else {
        outcome.values
    };

    let points = series
        .future_dates(options.periods)
        .into_iter()
        .zip(values)
        .map(|(date, value)| ForecastPoint { date, value })
        .collect();

    Ok(Forecast {
        points,
        model: outcome.model.to_string(),
        advisory: outcome.advisory,
    })
}

/// Like [`forecast_sales`], wrapped into a two-column table for presentation.
///
/// Columns are `Date` (ISO formatted) and `Forecasted Sales`. Adds no logic
/// beyond the wrapping; the advisory, if any, is dropped here because the
/// table form is for rendering only.
pub fn get_forecast(table: &RecordTable, options: &ForecastOptions) -> Result<RecordTable> {
    let forecast = forecast_sales(table, options)?;

    let mut out = RecordTable::new(vec!["Date", "Forecasted Sales"]);
    for point in &forecast.points {
        out.push_row(vec![
            point.date.format("%Y-%m-%d").to_string().into(),
            point.value.into(),
        ])?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_name() {
        assert_eq!(Method::from_name("arima"), Method::SeasonalRegression);
        assert_eq!(Method::from_name("ARIMA"), Method::SeasonalRegression);
        assert_eq!(Method::from_name("holtwinters"), Method::Smoothing);
        // Unrecognized strings deliberately select the smoothing path.
        assert_eq!(Method::from_name("prophet"), Method::Smoothing);
        assert_eq!(Method::from_name(""), Method::Smoothing);
    }

    #[test]
    fn test_default_options() {
        let options = ForecastOptions::default();
        assert_eq!(options.periods, 30);
        assert_eq!(options.freq, Frequency::Daily);
        assert_eq!(options.date_col, "Date");
        assert_eq!(options.value_col, "Total");
        assert_eq!(options.method, Method::SeasonalRegression);
    }

    #[test]
    fn test_zero_periods_rejected() {
        let mut table = RecordTable::new(vec!["Date", "Total"]);
        table
            .push_row(vec!["2023-01-01".into(), 1.0.into()])
            .unwrap();
        let err = forecast_sales(&table, &ForecastOptions::with_periods(0)).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter { .. }));
    }

    #[test]
    fn test_seasonal_regression_rejected_for_weekly_frequency() {
        let mut table = RecordTable::new(vec!["Date", "Total"]);
        table
            .push_row(vec!["2023-01-01".into(), 1.0.into()])
            .unwrap();
        let options = ForecastOptions {
            freq: Frequency::Weekly,
            ..ForecastOptions::with_periods(4)
        };
        let err = forecast_sales(&table, &options).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter { .. }));

        // The smoothing method accepts weekly data (trend-only).
        let options = options.method(Method::Smoothing);
        assert!(forecast_sales(&table, &options).is_ok());
    }

    #[test]
    fn test_chain_composition_per_method() {
        let chain = build_chain(Method::SeasonalRegression, 100, Frequency::Daily);
        assert_eq!(
            chain.strategy_names(),
            vec!["seasonal regression", "regression", "naive"]
        );

        let chain = build_chain(Method::Smoothing, 100, Frequency::Daily);
        assert_eq!(chain.strategy_names(), vec!["seasonal smoothing", "naive"]);

        // Below two weekly cycles: no seasonal component.
        let chain = build_chain(Method::Smoothing, 13, Frequency::Daily);
        assert_eq!(chain.strategy_names(), vec!["trend smoothing", "naive"]);

        // Off daily data the weekly period is meaningless: trend only.
        let chain = build_chain(Method::Smoothing, 100, Frequency::Weekly);
        assert_eq!(chain.strategy_names(), vec!["trend smoothing", "naive"]);
    }
}
