use std::{env, io, path::PathBuf, time::Duration};

use tracing::debug;

use crate::errors::{AppError, AppResult};

/// Fukuoka-city rental search, 50 results per page.
pub const DEFAULT_LISTING_URL_TEMPLATE: &str = "https://suumo.jp/jj/chintai/ichiran/FR301FC001/?ar=090&bs=040&ta=40&sc=40131&sc=40132&sc=40133&sc=40134&sc=40135&sc=40136&sc=40137&cb=0.0&ct=6.5&mb=0&mt=9999999&et=10&cn=15&tc=0400502&tc=0400301&shkr1=03&shkr2=03&shkr3=03&shkr4=03&sngz=&po1=25&pc=50&page={page}";

pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Upper bound on a single backoff wait.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(600);

const DEFAULT_ADDRESS_SEARCH_URL: &str = "https://msearch.gsi.go.jp/address-search/AddressSearch";
const DEFAULT_POSTAL_LOOKUP_URL: &str = "http://zipcoda.net/api";
const DEFAULT_POSTAL_GEOCODE_URL: &str = "http://geoapi.heartrails.com/api/json";

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub scrape: ScrapeConfig,
    pub geocoder: GeocoderConfig,
    pub jitter: JitterConfig,
    pub map: MapConfig,
    pub output: OutputConfig,
}

#[derive(Clone, Debug)]
pub struct ScrapeConfig {
    pub listing_url_template: String,
    pub max_pages: u32,
    pub page_pause: Duration,
    pub user_agent: String,
    pub http_timeout: Duration,
    pub retry: RetryPolicy,
}

/// Bounded retry with exponential backoff for page fetches.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_factor: f64,
}

#[derive(Clone, Debug)]
pub struct GeocoderConfig {
    /// Primary address search, queried with `q=<address>`.
    pub address_search_url: String,
    /// Postal-code lookup, queried with `address=<address>`.
    pub postal_lookup_url: String,
    /// Postal-code geocoder, queried with `method=searchByPostal&postal=<code>`.
    pub postal_geocode_url: String,
    pub pause: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Clone, Debug)]
pub struct JitterConfig {
    /// Per-axis offset bound in degrees, multiplied by the collision count.
    pub max_offset: f64,
    /// `None` keeps exact coordinate equality; `Some(r)` treats points within `r` degrees as colliding.
    pub collision_radius: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
}

#[derive(Clone, Debug)]
pub struct OutputConfig {
    pub csv_path: PathBuf,
    pub map_path: PathBuf,
    pub xlsx_path: Option<PathBuf>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based) before trying again.
    /// Capped at `MAX_RETRY_DELAY`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.backoff_factor.max(0.0).powi(exponent);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }
}

impl ScrapeConfig {
    pub fn page_url(&self, page: u32) -> String {
        self.listing_url_template
            .replace(PAGE_PLACEHOLDER, &page.to_string())
    }
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            max_offset: 0.0001,
            collision_radius: None,
            seed: None,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 33.5903,
            center_lon: 130.4017,
            zoom: 13,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        load_dotenv_if_applicable();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key source; unset or unparsable keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let user_agent = get("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let http_timeout = Duration::from_secs(parse_or(&get, "HTTP_TIMEOUT_SECS", 30));

        let config = Self {
            scrape: ScrapeConfig {
                listing_url_template: get("LISTING_URL_TEMPLATE")
                    .unwrap_or_else(|| DEFAULT_LISTING_URL_TEMPLATE.to_string()),
                max_pages: parse_or(&get, "MAX_PAGES", 2),
                page_pause: Duration::from_millis(parse_or(&get, "PAGE_PAUSE_MS", 1_000)),
                user_agent: user_agent.clone(),
                http_timeout,
                retry: RetryPolicy {
                    max_attempts: parse_or(&get, "FETCH_MAX_ATTEMPTS", 3),
                    base_delay: Duration::from_millis(parse_or(
                        &get,
                        "FETCH_BASE_DELAY_MS",
                        10_000,
                    )),
                    backoff_factor: parse_or(&get, "FETCH_BACKOFF_FACTOR", 2.0),
                },
            },
            geocoder: GeocoderConfig {
                address_search_url: get("ADDRESS_SEARCH_URL")
                    .unwrap_or_else(|| DEFAULT_ADDRESS_SEARCH_URL.to_string()),
                postal_lookup_url: get("POSTAL_LOOKUP_URL")
                    .unwrap_or_else(|| DEFAULT_POSTAL_LOOKUP_URL.to_string()),
                postal_geocode_url: get("POSTAL_GEOCODE_URL")
                    .unwrap_or_else(|| DEFAULT_POSTAL_GEOCODE_URL.to_string()),
                pause: Duration::from_millis(parse_or(&get, "GEOCODE_PAUSE_MS", 1_000)),
                timeout: http_timeout,
                user_agent,
            },
            jitter: JitterConfig {
                max_offset: parse_or(&get, "JITTER_MAX_OFFSET", 0.0001),
                collision_radius: get("JITTER_COLLISION_RADIUS").and_then(|v| v.parse().ok()),
                seed: get("JITTER_SEED").and_then(|v| v.parse().ok()),
            },
            map: MapConfig {
                center_lat: parse_or(&get, "MAP_CENTER_LAT", 33.5903),
                center_lon: parse_or(&get, "MAP_CENTER_LON", 130.4017),
                zoom: parse_or(&get, "MAP_ZOOM", 13),
            },
            output: OutputConfig {
                csv_path: get("CSV_OUTPUT_PATH")
                    .unwrap_or_else(|| "fukuokashi_data.csv".to_string())
                    .into(),
                map_path: get("MAP_OUTPUT_PATH")
                    .unwrap_or_else(|| "fukuoka.html".to_string())
                    .into(),
                xlsx_path: get("XLSX_OUTPUT_PATH").map(PathBuf::from),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if !self.scrape.listing_url_template.contains(PAGE_PLACEHOLDER) {
            return Err(AppError::Config(format!(
                "listing URL template must contain {PAGE_PLACEHOLDER}: {}",
                self.scrape.listing_url_template
            )));
        }
        if self.scrape.max_pages == 0 {
            return Err(AppError::Config("max pages must be at least 1".into()));
        }
        if self.scrape.retry.max_attempts == 0 {
            return Err(AppError::Config("fetch attempts must be at least 1".into()));
        }
        if !(self.scrape.retry.backoff_factor.is_finite() && self.scrape.retry.backoff_factor >= 1.0)
        {
            return Err(AppError::Config(format!(
                "backoff factor must be at least 1, got {}",
                self.scrape.retry.backoff_factor
            )));
        }
        if !(self.jitter.max_offset.is_finite() && self.jitter.max_offset > 0.0) {
            return Err(AppError::Config(format!(
                "jitter offset must be a positive number, got {}",
                self.jitter.max_offset
            )));
        }
        Ok(())
    }

    /// Drop every fixed pause and backoff delay. Meant for local fixtures, not the live site.
    pub fn without_pauses(mut self) -> Self {
        self.scrape.page_pause = Duration::ZERO;
        self.scrape.retry.base_delay = Duration::ZERO;
        self.geocoder.pause = Duration::ZERO;
        self
    }
}

fn load_dotenv_if_applicable() {
    if !should_load_dotenv() {
        debug!("skipping .env load outside dev mode");
        return;
    }

    if let Err(err) = dotenvy::dotenv() {
        match &err {
            dotenvy::Error::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {}
            _ => debug!(?err, "unable to load .env file"),
        }
    }
}

fn should_load_dotenv() -> bool {
    cfg!(debug_assertions)
        || env::var("ALLOW_DOTENV")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
            .unwrap_or(false)
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
