use thiserror::Error as ThisError;

use crate::services::AllProvidersFailed;
use crate::stats::StatsError;

/// Application-level error for CLI and startup paths.
///
/// The HTTP layer maps the typed inner errors to status codes before they
/// ever reach this type; see `server::ApiError`.
#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error(transparent)]
    Fetch(#[from] AllProvidersFailed),

    #[error(transparent)]
    Stats(#[from] StatsError),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
