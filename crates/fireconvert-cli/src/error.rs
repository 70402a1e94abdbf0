//! CLI error types.

use fireconvert::ConvertError;
use fireconvert_scrape::ScrapeError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid credentials file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Convert(#[from] ConvertError),

    #[error("{0}")]
    Scrape(#[from] ScrapeError),

    #[error("{0}")]
    Validation(String),
}
