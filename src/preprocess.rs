//! Preprocessing: irregular tabular records to a regular daily series.
//!
//! Mirrors the resample-and-sum contract of the dashboard loader: parse the
//! date column, pick a numeric value column, sum per period over the full
//! date range, forward-fill gaps and zero-fill anything still missing at the
//! head.

use crate::error::{ForecastError, Result};
use crate::series::{Frequency, PreparedSeries};
use crate::table::RecordTable;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

/// Date formats accepted for the date column, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Datetime formats accepted for the date column; the time part is dropped.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Resolve the value column: the requested column when it holds at least one
/// numeric-coercible cell, otherwise the first fully numeric column among
/// the remaining ones.
fn resolve_value_column(
    table: &RecordTable,
    date_idx: usize,
    requested: &str,
) -> Result<usize> {
    if let Some(idx) = table.column_index(requested) {
        if idx != date_idx
            && table
                .column_values(idx)
                .any(|cell| cell.as_number().is_some())
        {
            return Ok(idx);
        }
    }
    for idx in 0..table.columns().len() {
        if idx == date_idx {
            continue;
        }
        if table.is_numeric_column(idx) {
            return Ok(idx);
        }
    }
    Err(ForecastError::NoValueColumn {
        requested: requested.to_string(),
    })
}

/// Validate and resample raw records into a regular single-column series.
///
/// Rows with unparseable dates are dropped; non-numeric value entries are
/// treated as missing. Periods with no contributing rows are forward-filled
/// from the preceding period, and still-missing leading periods default to
/// zero.
///
/// # Errors
///
/// * [`ForecastError::MissingDateColumn`] when `date_col` is absent.
/// * [`ForecastError::EmptyTable`] when the table has no rows.
/// * [`ForecastError::NoParseableDates`] when every date fails to parse.
/// * [`ForecastError::NoValueColumn`] when no numeric column is available.
pub fn prepare_data(
    table: &RecordTable,
    date_col: &str,
    value_col: &str,
    freq: Frequency,
) -> Result<PreparedSeries> {
    let date_idx = table
        .column_index(date_col)
        .ok_or_else(|| ForecastError::MissingDateColumn {
            name: date_col.to_string(),
        })?;

    if table.is_empty() {
        return Err(ForecastError::EmptyTable);
    }

    let value_idx = resolve_value_column(table, date_idx, value_col)?;

    // Parse dates, dropping rows that fail. Partial failures are tolerated.
    let mut parsed: Vec<(NaiveDate, Option<f64>)> = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let date = table
            .cell(row, date_idx)
            .and_then(|cell| cell.as_text())
            .and_then(parse_date);
        if let Some(date) = date {
            let value = table.cell(row, value_idx).and_then(|cell| cell.as_number());
            parsed.push((date, value));
        }
    }

    let dropped = table.len() - parsed.len();
    if dropped > 0 {
        debug!(dropped, kept = parsed.len(), "dropped rows with unparseable dates");
    }
    if parsed.is_empty() {
        return Err(ForecastError::NoParseableDates {
            name: date_col.to_string(),
        });
    }

    let no_dates = || ForecastError::NoParseableDates {
        name: date_col.to_string(),
    };
    let start = parsed.iter().map(|(d, _)| *d).min().ok_or_else(no_dates)?;
    let end = parsed.iter().map(|(d, _)| *d).max().ok_or_else(no_dates)?;
    let periods = freq.periods_between(start, end) as usize + 1;

    // Sum per period; a period with no numeric contributions stays missing.
    let mut buckets: Vec<Option<f64>> = vec![None; periods];
    for (date, value) in parsed {
        let idx = freq.periods_between(start, date) as usize;
        if let Some(v) = value {
            buckets[idx] = Some(buckets[idx].unwrap_or(0.0) + v);
        }
    }

    // Forward-fill, then zero-fill whatever is still missing at the head.
    let mut values = Vec::with_capacity(periods);
    let mut carry: Option<f64> = None;
    for bucket in buckets {
        let filled = match bucket {
            Some(v) => {
                carry = Some(v);
                v
            }
            None => carry.unwrap_or(0.0),
        };
        values.push(filled);
    }

    Ok(PreparedSeries::new(start, freq, values))
}
