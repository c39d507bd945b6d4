//! End-to-end scenarios: the dashboard's worked example, tabular wrapping
//! and serialization of results.

use chrono::NaiveDate;
use salescast::prelude::*;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// The worked example: ten rising daily totals over 2023-01-01..2023-01-10.
fn example_table() -> RecordTable {
    let values = [
        200.0, 220.0, 250.0, 270.0, 300.0, 320.0, 350.0, 370.0, 400.0, 450.0,
    ];
    let mut table = RecordTable::new(vec!["Date", "Total"]);
    for (i, v) in values.iter().enumerate() {
        let d = format!("2023-01-{:02}", i + 1);
        table.push_row(vec![d.into(), (*v).into()]).unwrap();
    }
    table
}

#[test]
fn worked_example_holtwinters_five_periods() {
    let options = ForecastOptions::with_periods(5).method(Method::from_name("holtwinters"));
    let forecast = forecast_sales(&example_table(), &options).unwrap();

    assert_eq!(forecast.len(), 5);
    assert_eq!(
        forecast.dates(),
        vec![
            date("2023-01-11"),
            date("2023-01-12"),
            date("2023-01-13"),
            date("2023-01-14"),
            date("2023-01-15"),
        ]
    );
    assert!(forecast.values().iter().all(|v| *v > 0.0));
}

#[test]
fn get_forecast_wraps_into_two_column_table() {
    let options = ForecastOptions::with_periods(5).method(Method::Smoothing);
    let out = get_forecast(&example_table(), &options).unwrap();

    assert_eq!(out.columns(), &["Date", "Forecasted Sales"]);
    assert_eq!(out.len(), 5);

    let date_col = out.column_index("Date").unwrap();
    let value_col = out.column_index("Forecasted Sales").unwrap();
    assert_eq!(
        out.cell(0, date_col).unwrap().as_text(),
        Some("2023-01-11")
    );
    assert!(out.cell(0, value_col).unwrap().as_number().unwrap() > 0.0);
}

#[test]
fn get_forecast_propagates_preprocessing_errors() {
    let empty = RecordTable::new(vec!["Date", "Total"]);
    let err = get_forecast(&empty, &ForecastOptions::with_periods(3)).unwrap_err();
    assert_eq!(err, ForecastError::EmptyTable);
}

#[test]
fn irregular_records_are_resampled_before_fitting() {
    // Two rows on the same day, a gap, unsorted input: the forecast still
    // starts right after the latest date.
    let mut table = RecordTable::new(vec!["Date", "Total"]);
    for (d, v) in [
        ("2023-03-05", 50.0),
        ("2023-03-01", 10.0),
        ("2023-03-01", 15.0),
        ("2023-03-03", 30.0),
    ] {
        table.push_row(vec![d.into(), v.into()]).unwrap();
    }

    let options = ForecastOptions::with_periods(2).method(Method::Smoothing);
    let forecast = forecast_sales(&table, &options).unwrap();
    assert_eq!(
        forecast.dates(),
        vec![date("2023-03-06"), date("2023-03-07")]
    );
}

#[test]
fn forecast_serializes_to_json() {
    let options = ForecastOptions::with_periods(3).method(Method::Smoothing);
    let forecast = forecast_sales(&example_table(), &options).unwrap();

    let json = serde_json::to_string(&forecast).unwrap();
    let back: Forecast = serde_json::from_str(&json).unwrap();
    assert_eq!(back, forecast);
    assert!(json.contains("2023-01-11"));
}

#[test]
fn arima_method_on_long_history() {
    let mut table = RecordTable::new(vec!["Date", "Total"]);
    let start = date("2023-01-01");
    for i in 0..60 {
        let d = start + chrono::Duration::days(i);
        let weekday = (i % 7) as f64;
        let total = 500.0 + i as f64 * 2.0 + 40.0 * (weekday * std::f64::consts::PI / 3.5).sin();
        table
            .push_row(vec![d.format("%Y-%m-%d").to_string().into(), total.into()])
            .unwrap();
    }

    let options = ForecastOptions::with_periods(14).method(Method::from_name("ARIMA"));
    let forecast = forecast_sales(&table, &options).unwrap();
    assert_eq!(forecast.len(), 14);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
    // With two months of history the seasonal candidate itself should fit.
    assert_eq!(forecast.model, "seasonal regression");
    assert!(forecast.advisory.is_none());
}
