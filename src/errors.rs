// errors.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::scraping::ScraperError;

pub type AppResult<T> = Result<T, AppError>;

/// Errors that end a run. Anything recoverable (a failed page, a malformed row,
/// an address nobody could resolve) is logged and counted in the run report instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
    #[error("failed to render map: {0}")]
    Render(String),
    #[error("failed to write {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },
    #[error(transparent)]
    Scraper(#[from] ScraperError),
}

impl AppError {
    pub fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AppError::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
