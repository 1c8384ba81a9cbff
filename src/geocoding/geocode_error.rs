use thiserror::Error;

/// A step of the geocoding chain that failed. Every variant carries the URL
/// that was being queried so the log line can name it.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("invalid endpoint {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("{url} returned no {what}")]
    Missing { url: String, what: &'static str },
}

impl GeocodeError {
    pub fn url(&self) -> &str {
        match self {
            GeocodeError::InvalidUrl { url, .. }
            | GeocodeError::Request { url, .. }
            | GeocodeError::Status { url, .. }
            | GeocodeError::Decode { url, .. }
            | GeocodeError::Missing { url, .. } => url,
        }
    }
}
