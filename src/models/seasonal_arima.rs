//! Seasonal regression model (SARIMA-style).
//!
//! Combines autoregression, differencing and moving-average terms with an
//! optional repeating seasonal pattern. The model differences the series
//! (seasonally first, then regularly), estimates AR coefficients at the
//! seasonal and non-seasonal lags by least squares, estimates MA
//! coefficients from residual autocorrelation, forecasts recursively on the
//! differenced scale and then inverts every differencing stage.
//!
//! The sales dispatcher uses (1,1,1)(1,1,1) at period 7 as its primary
//! candidate and plain (1,1,1) as the retry.

use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Seasonal part of the model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal AR order (P)
    pub ar: usize,
    /// Seasonal differencing order (D)
    pub diff: usize,
    /// Seasonal MA order (Q)
    pub ma: usize,
    /// Season length in periods (s)
    pub period: usize,
}

/// Regression-style forecasting model with optional seasonality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalArima {
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
    /// Seasonal order, if any
    seasonal: Option<SeasonalOrder>,
    /// AR terms as (lag, coefficient)
    ar_terms: Vec<(usize, f64)>,
    /// MA terms as (lag, coefficient)
    ma_terms: Vec<(usize, f64)>,
    /// Mean of the fully differenced series
    mean: f64,
    /// Series before each differencing op, in application order (kept for
    /// inversion)
    stages: Vec<Vec<f64>>,
    /// Lag of each applied differencing op
    diff_lags: Vec<usize>,
    /// Fully differenced series the coefficients are estimated on
    differenced: Vec<f64>,
    /// Residuals aligned with the fully differenced series
    residuals: Vec<f64>,
    /// Whether the model has been fitted
    fitted: bool,
}

impl SeasonalArima {
    /// Create a non-seasonal model with orders (p, d, q).
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        Self::build(p, d, q, None)
    }

    /// Create a seasonal model with orders (p, d, q)(P, D, Q) at `period`.
    pub fn with_seasonal(
        p: usize,
        d: usize,
        q: usize,
        sp: usize,
        sd: usize,
        sq: usize,
        period: usize,
    ) -> Result<Self> {
        Self::build(
            p,
            d,
            q,
            Some(SeasonalOrder {
                ar: sp,
                diff: sd,
                ma: sq,
                period,
            }),
        )
    }

    fn build(p: usize, d: usize, q: usize, seasonal: Option<SeasonalOrder>) -> Result<Self> {
        if p > 5 {
            return Err(ForecastError::InvalidParameter {
                name: "p".to_string(),
                reason: "AR order must be <= 5".to_string(),
            });
        }
        if d > 2 {
            return Err(ForecastError::InvalidParameter {
                name: "d".to_string(),
                reason: "differencing order must be <= 2".to_string(),
            });
        }
        if q > 5 {
            return Err(ForecastError::InvalidParameter {
                name: "q".to_string(),
                reason: "MA order must be <= 5".to_string(),
            });
        }
        if let Some(s) = seasonal {
            if s.period < 2 {
                return Err(ForecastError::InvalidParameter {
                    name: "period".to_string(),
                    reason: "seasonal period must be at least 2".to_string(),
                });
            }
            if s.ar > 2 || s.ma > 2 {
                return Err(ForecastError::InvalidParameter {
                    name: "seasonal order".to_string(),
                    reason: "seasonal AR/MA orders must be <= 2".to_string(),
                });
            }
            if s.diff > 1 {
                return Err(ForecastError::InvalidParameter {
                    name: "D".to_string(),
                    reason: "seasonal differencing order must be <= 1".to_string(),
                });
            }
        }

        Ok(Self {
            p,
            d,
            q,
            seasonal,
            ar_terms: Vec::new(),
            ma_terms: Vec::new(),
            mean: 0.0,
            stages: Vec::new(),
            diff_lags: Vec::new(),
            differenced: Vec::new(),
            residuals: Vec::new(),
            fitted: false,
        })
    }

    /// Model orders ((p, d, q), seasonal).
    pub fn orders(&self) -> ((usize, usize, usize), Option<SeasonalOrder>) {
        ((self.p, self.d, self.q), self.seasonal)
    }

    /// Fitted AR terms as (lag, coefficient).
    pub fn ar_terms(&self) -> &[(usize, f64)] {
        &self.ar_terms
    }

    /// Fitted MA terms as (lag, coefficient).
    pub fn ma_terms(&self) -> &[(usize, f64)] {
        &self.ma_terms
    }

    fn ar_lags(&self) -> Vec<usize> {
        let mut lags: Vec<usize> = (1..=self.p).collect();
        if let Some(s) = self.seasonal {
            lags.extend((1..=s.ar).map(|j| j * s.period));
        }
        lags
    }

    fn ma_lags(&self) -> Vec<usize> {
        let mut lags: Vec<usize> = (1..=self.q).collect();
        if let Some(s) = self.seasonal {
            lags.extend((1..=s.ma).map(|j| j * s.period));
        }
        lags
    }

    /// Difference `data` once at `lag`.
    fn difference_at(data: &[f64], lag: usize) -> Vec<f64> {
        if data.len() <= lag {
            return Vec::new();
        }
        data.iter()
            .skip(lag)
            .zip(data.iter())
            .map(|(curr, prev)| curr - prev)
            .collect()
    }

    /// Estimate AR coefficients at `lags` by least squares on the centered
    /// differenced series. A singular system yields zero coefficients, which
    /// degrades the model to mean continuation instead of failing.
    fn estimate_ar(&self, w: &[f64], lags: &[usize]) -> Vec<f64> {
        if lags.is_empty() {
            return Vec::new();
        }
        let max_lag = *lags.iter().max().unwrap_or(&0);
        let n = w.len();
        let centered: Vec<f64> = w.iter().map(|x| x - self.mean).collect();

        let k = lags.len();
        let mut xtx = vec![vec![0.0; k]; k];
        let mut xty = vec![0.0; k];
        for t in max_lag..n {
            for (i, &li) in lags.iter().enumerate() {
                xty[i] += centered[t - li] * centered[t];
                for (j, &lj) in lags.iter().enumerate() {
                    xtx[i][j] += centered[t - li] * centered[t - lj];
                }
            }
        }

        match solve_linear(xtx, xty) {
            Some(coeffs) if coeffs.iter().all(|c| c.is_finite()) => coeffs
                .into_iter()
                .map(|c| c.clamp(-0.99, 0.99))
                .collect(),
            _ => {
                debug!("singular normal equations; using zero AR coefficients");
                vec![0.0; k]
            }
        }
    }

    /// Estimate MA coefficients from residual autocorrelation, clamped for
    /// stability.
    fn estimate_ma(&self, residuals: &[f64], lags: &[usize]) -> Vec<f64> {
        if lags.is_empty() || residuals.is_empty() {
            return vec![0.0; lags.len()];
        }
        let n = residuals.len();
        let mean: f64 = residuals.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = residuals.iter().map(|x| x - mean).collect();
        let var: f64 = centered.iter().map(|x| x * x).sum::<f64>() / n as f64;

        let mut coeffs = vec![0.0; lags.len()];
        if var.abs() > 1e-10 {
            for (i, &lag) in lags.iter().enumerate() {
                let mut sum = 0.0;
                for t in lag..n {
                    sum += centered[t] * centered[t - lag];
                }
                coeffs[i] = ((sum / n as f64) / var).clamp(-0.99, 0.99);
            }
        }
        coeffs
    }

    /// Undo every differencing stage, most recent first.
    fn undifference(&self, forecasts: &[f64]) -> Vec<f64> {
        let mut values = forecasts.to_vec();
        for k in (0..self.diff_lags.len()).rev() {
            let prev = &self.stages[k];
            let lag = self.diff_lags[k];
            let mut inverted = Vec::with_capacity(values.len());
            for t in 0..values.len() {
                let base = if t < lag {
                    prev[prev.len() - lag + t]
                } else {
                    inverted[t - lag]
                };
                inverted.push(values[t] + base);
            }
            values = inverted;
        }
        values
    }
}

impl Forecaster for SeasonalArima {
    fn fit(&mut self, data: &[f64]) -> Result<()> {
        if data.iter().any(|x| !x.is_finite()) {
            return Err(ForecastError::Numerical(
                "data contains NaN or infinite values".to_string(),
            ));
        }

        let ar_lags = self.ar_lags();
        let ma_lags = self.ma_lags();
        let max_lag = ar_lags
            .iter()
            .chain(ma_lags.iter())
            .copied()
            .max()
            .unwrap_or(0);
        let total_diff =
            self.d + self.seasonal.map_or(0, |s| s.diff * s.period);
        let required = total_diff + max_lag + 10;
        if data.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: data.len(),
            });
        }

        // Differencing chain: seasonal first, then regular.
        let mut stages = Vec::new();
        let mut diff_lags = Vec::new();
        let mut w = data.to_vec();
        if let Some(s) = self.seasonal {
            for _ in 0..s.diff {
                let next = Self::difference_at(&w, s.period);
                stages.push(std::mem::replace(&mut w, next));
                diff_lags.push(s.period);
            }
        }
        for _ in 0..self.d {
            let next = Self::difference_at(&w, 1);
            stages.push(std::mem::replace(&mut w, next));
            diff_lags.push(1);
        }
        self.stages = stages;
        self.diff_lags = diff_lags;

        self.mean = w.iter().sum::<f64>() / w.len() as f64;

        let ar_coeffs = self.estimate_ar(&w, &ar_lags);
        self.ar_terms = ar_lags.iter().copied().zip(ar_coeffs).collect();

        // Residuals from the AR part, aligned with the differenced series.
        let start = max_lag;
        self.residuals = vec![0.0; w.len()];
        for t in start..w.len() {
            let mut prediction = self.mean;
            for &(lag, coeff) in &self.ar_terms {
                prediction += coeff * (w[t - lag] - self.mean);
            }
            self.residuals[t] = w[t] - prediction;
        }

        let ma_coeffs = self.estimate_ma(&self.residuals[start..], &ma_lags);
        self.ma_terms = ma_lags.iter().copied().zip(ma_coeffs).collect();

        if self
            .ar_terms
            .iter()
            .chain(self.ma_terms.iter())
            .any(|(_, c)| !c.is_finite())
        {
            return Err(ForecastError::Numerical(
                "coefficient estimation produced non-finite values".to_string(),
            ));
        }

        self.differenced = w;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::NotFitted);
        }
        if steps == 0 {
            return Ok(Vec::new());
        }

        let n = self.differenced.len();
        let mut extended = self.differenced.clone();
        let mut extended_residuals = self.residuals.clone();

        for _ in 0..steps {
            let mut forecast = self.mean;
            for &(lag, coeff) in &self.ar_terms {
                let idx = extended.len() - lag;
                forecast += coeff * (extended[idx] - self.mean);
            }
            for &(lag, coeff) in &self.ma_terms {
                if extended_residuals.len() >= lag {
                    let idx = extended_residuals.len() - lag;
                    forecast += coeff * extended_residuals[idx];
                }
            }
            extended.push(forecast);
            extended_residuals.push(0.0); // future residuals are 0
        }

        let values = self.undifference(&extended[n..]);
        if values.iter().any(|x| !x.is_finite()) {
            return Err(ForecastError::Numerical(
                "forecast produced non-finite values".to_string(),
            ));
        }
        Ok(values)
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

/// Solve a small dense linear system by Gaussian elimination with partial
/// pivoting. Returns `None` when the system is singular.
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for col in (row + 1)..n {
            sum -= a[row][col] * x[col];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly_series(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let weekday = (i % 7) as f64;
                100.0 + i as f64 * 2.0 + 15.0 * (weekday * std::f64::consts::PI / 3.5).sin()
            })
            .collect()
    }

    #[test]
    fn test_order_validation() {
        assert!(SeasonalArima::new(1, 1, 1).is_ok());
        assert!(SeasonalArima::new(6, 0, 0).is_err());
        assert!(SeasonalArima::new(0, 3, 0).is_err());
        assert!(SeasonalArima::with_seasonal(1, 1, 1, 1, 1, 1, 1).is_err());
        assert!(SeasonalArima::with_seasonal(1, 1, 1, 1, 2, 1, 7).is_err());
    }

    #[test]
    fn test_non_seasonal_fit_predict() {
        let data: Vec<f64> = (1..=50)
            .map(|x| x as f64 + (x as f64 * 0.1).sin())
            .collect();
        let mut model = SeasonalArima::new(1, 1, 1).unwrap();
        model.fit(&data).unwrap();
        assert!(model.is_fitted());

        let forecast = model.predict(5).unwrap();
        assert_eq!(forecast.len(), 5);
        assert!(forecast.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_seasonal_fit_predict() {
        let data = weekly_series(42);
        let mut model = SeasonalArima::with_seasonal(1, 1, 1, 1, 1, 1, 7).unwrap();
        model.fit(&data).unwrap();

        let forecast = model.predict(7).unwrap();
        assert_eq!(forecast.len(), 7);
        assert!(forecast.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_trend_is_continued() {
        // Exactly linear data: the differenced series is constant, the
        // forecast continues the line via mean continuation.
        let data: Vec<f64> = (0..30).map(|i| 10.0 + 3.0 * i as f64).collect();
        let mut model = SeasonalArima::new(1, 1, 0).unwrap();
        model.fit(&data).unwrap();
        let forecast = model.predict(3).unwrap();
        for (h, value) in forecast.iter().enumerate() {
            let expected = 10.0 + 3.0 * (30 + h) as f64;
            assert!((value - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_insufficient_data() {
        let data = weekly_series(10);
        let mut model = SeasonalArima::with_seasonal(1, 1, 1, 1, 1, 1, 7).unwrap();
        let err = model.fit(&data).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData { .. }));
        assert!(!model.is_fitted());
    }

    #[test]
    fn test_nan_data_rejected() {
        let mut data = weekly_series(42);
        data[3] = f64::NAN;
        let mut model = SeasonalArima::new(1, 1, 1).unwrap();
        assert!(model.fit(&data).is_err());
    }

    #[test]
    fn test_predict_before_fit() {
        let model = SeasonalArima::new(1, 1, 1).unwrap();
        assert_eq!(model.predict(3).unwrap_err(), ForecastError::NotFitted);
    }

    #[test]
    fn test_deterministic_refit() {
        let data = weekly_series(42);
        let mut a = SeasonalArima::with_seasonal(1, 1, 1, 1, 1, 1, 7).unwrap();
        let mut b = SeasonalArima::with_seasonal(1, 1, 1, 1, 1, 1, 7).unwrap();
        a.fit(&data).unwrap();
        b.fit(&data).unwrap();
        assert_eq!(a.predict(10).unwrap(), b.predict(10).unwrap());
    }

    #[test]
    fn test_solve_linear() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![5.0, 10.0];
        let x = solve_linear(a, b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-10);
        assert!((x[1] - 3.0).abs() < 1e-10);

        let singular = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(solve_linear(singular, vec![1.0, 2.0]).is_none());
    }
}
