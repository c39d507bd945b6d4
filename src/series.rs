//! Regular fixed-frequency series produced by the preprocessor.

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Resampling frequency of a [`PreparedSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frequency {
    /// One value per calendar day
    #[default]
    Daily,
    /// One value per 7-day block, anchored at the first observed date
    Weekly,
}

impl Frequency {
    /// Length of one period in days.
    pub fn step_days(&self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
        }
    }

    /// The date one period after `date`.
    pub fn next(&self, date: NaiveDate) -> NaiveDate {
        date + Duration::days(self.step_days())
    }

    /// Number of whole periods between `origin` and `date` (`date >= origin`).
    pub fn periods_between(&self, origin: NaiveDate, date: NaiveDate) -> i64 {
        (date - origin).num_days() / self.step_days()
    }
}

impl FromStr for Frequency {
    type Err = ForecastError;

    /// Parse pandas-style frequency aliases: `"D"` and `"W"`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" => Ok(Frequency::Daily),
            "W" => Ok(Frequency::Weekly),
            other => Err(ForecastError::InvalidParameter {
                name: "freq".to_string(),
                reason: format!("unsupported frequency '{other}' (expected 'D' or 'W')"),
            }),
        }
    }
}

/// Regular single-column series: one value per period, contiguous, no gaps.
///
/// Constructed only by [`prepare_data`](crate::preprocess::prepare_data);
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedSeries {
    start: NaiveDate,
    freq: Frequency,
    values: Vec<f64>,
}

impl PreparedSeries {
    /// Build a series from a start date and contiguous per-period values.
    pub(crate) fn new(start: NaiveDate, freq: Frequency, values: Vec<f64>) -> Self {
        Self { start, freq, values }
    }

    /// Per-period values, ascending by date.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of periods.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series holds no periods.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resampling frequency.
    pub fn frequency(&self) -> Frequency {
        self.freq
    }

    /// Date of the first period.
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Date of the i-th period.
    pub fn date_at(&self, i: usize) -> NaiveDate {
        self.start + Duration::days(self.freq.step_days() * i as i64)
    }

    /// Date of the last period. `None` when empty.
    pub fn last_date(&self) -> Option<NaiveDate> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.date_at(self.values.len() - 1))
        }
    }

    /// Last observed value. `None` when empty.
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// All period dates, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.values.len()).map(|i| self.date_at(i)).collect()
    }

    /// `periods` consecutive dates starting one period after the last
    /// historical date. Empty for an empty series.
    pub fn future_dates(&self, periods: usize) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(periods);
        if let Some(mut current) = self.last_date() {
            for _ in 0..periods {
                current = self.freq.next(current);
                dates.push(current);
            }
        }
        dates
    }
}
