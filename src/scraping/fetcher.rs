// fetcher.rs
use reqwest::blocking::Client;
use scraper::Html;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::{RetryPolicy, ScrapeConfig};
use crate::errors::{AppError, AppResult};
use crate::scraping::ScraperError;

/// Anything that can hand back one listing-index page as parsed markup.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<Html, ScraperError>;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn fetch(&self, url: &str) -> Result<Html, ScraperError> {
        (**self).fetch(url)
    }
}

pub struct PageFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl PageFetcher {
    pub fn new(config: &ScrapeConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            retry: config.retry.clone(),
        })
    }

    /// Fetch the raw body, retrying with exponential backoff. One request per attempt, no caching.
    pub fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_err = None;

        for attempt in 1..=max_attempts {
            let start = Instant::now();

            match self.try_fetch_html(url) {
                Ok(html) => {
                    debug!(url, attempt, elapsed = ?start.elapsed(), "page fetched");
                    return Ok(html);
                }
                Err(e) => {
                    warn!(url, attempt, elapsed = ?start.elapsed(), error = %e, "page fetch failed");
                    last_err = Some(e);

                    if attempt < max_attempts {
                        std::thread::sleep(self.retry.delay_after(attempt));
                    }
                }
            }
        }

        Err(ScraperError::Exhausted {
            url: url.to_string(),
            attempts: max_attempts,
            last: Box::new(last_err.unwrap_or_else(|| ScraperError::Network {
                url: url.to_string(),
                message: "retry loop ended without an attempt".into(),
            })),
        })
    }

    fn try_fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let network = |e: reqwest::Error| ScraperError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let resp = self.client.get(url).send().map_err(network)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().map_err(network)
    }
}

impl PageSource for PageFetcher {
    fn fetch(&self, url: &str) -> Result<Html, ScraperError> {
        let html = self.fetch_html(url)?;
        Ok(Html::parse_document(&html))
    }
}
