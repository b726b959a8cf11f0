use thiserror::Error;

/// Errors for emission estimates, mass-balance runs and reference data.
///
/// Every variant is terminal to the request that raised it only; the shared
/// reference table is never touched on failure.
#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("unsupported emission-factor unit '{unit}'; adjust the activity amount to match the EF")]
    UnsupportedUnit { unit: String },
    #[error("no emission factor for activity '{activity}' and pollutant '{pollutant}'")]
    NotFound { activity: String, pollutant: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("reference data line {line}: {reason}")]
    Data { line: usize, reason: String },
    #[error("bundled reference data is corrupt: {0}")]
    Bundled(String),
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl EmissionError {
    /// Unsupported units are reported as a warning, not a failure.
    pub fn is_warning(&self) -> bool {
        matches!(self, EmissionError::UnsupportedUnit { .. })
    }
}

/// Convenience type for `Result<T, EmissionError>`.
pub type EmissionResult<T> = Result<T, EmissionError>;
