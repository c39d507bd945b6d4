//! Error types for the forecasting core.
//!
//! Only input-validation failures (configuration and data errors) are hard
//! errors that reach the caller of [`forecast_sales`](crate::forecast_sales).
//! Model-side failures are absorbed by the fallback chain and surface as an
//! advisory on the result instead.

use thiserror::Error;

/// Result type alias for forecasting operations
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Coarse error classification.
///
/// `Configuration` and `Data` escape the dispatcher; `Model` errors are
/// internal to the fallback chain and compensated with the naive forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied configuration is wrong (missing column, bad parameter)
    Configuration,
    /// Input records cannot yield a usable series
    Data,
    /// Statistical fitting or prediction failed
    Model,
}

/// Errors that can occur while preparing data or fitting models
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Required date column is absent from the input table
    #[error("Missing date column '{name}'")]
    MissingDateColumn { name: String },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Input table has columns but no rows
    #[error("Input table has no rows")]
    EmptyTable,

    /// Every entry of the date column failed to parse
    #[error("No parseable dates in column '{name}'")]
    NoParseableDates { name: String },

    /// Neither the requested value column nor any other column is numeric
    #[error("No numeric value column available (requested '{requested}')")]
    NoValueColumn { requested: String },

    /// Insufficient data points for the operation
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Model has not been fitted yet
    #[error("Model must be fitted before prediction")]
    NotFitted,

    /// Numerical computation error
    #[error("Numerical error: {0}")]
    Numerical(String),
}

impl ForecastError {
    /// Classify the error per the Configuration / Data / Model taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::MissingDateColumn { .. } | ForecastError::InvalidParameter { .. } => {
                ErrorKind::Configuration
            }
            ForecastError::EmptyTable
            | ForecastError::NoParseableDates { .. }
            | ForecastError::NoValueColumn { .. } => ErrorKind::Data,
            ForecastError::InsufficientData { .. }
            | ForecastError::NotFitted
            | ForecastError::Numerical(_) => ErrorKind::Model,
        }
    }
}
