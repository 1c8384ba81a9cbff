use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::config::AppConfig;
use crate::domain::{normalize, Dataset, GeoStatus, Resolution};
use crate::errors::AppResult;
use crate::geocoding::{CollisionJitter, Geocode, Geocoder};
use crate::map::{MapArtifact, MapBuilder};
use crate::pipeline::{CancellationToken, Outcome, RunObserver, RunReport};
use crate::scraping::{
    ListingExtractor, PageExtraction, PageFetcher, PageSource, RawListing, ScraperError,
};
use crate::spreadsheets::{export_listings_csv, export_listings_xlsx};

/// Fetch → extract → normalize → geocode → map → export, sequentially on the calling thread.
pub struct Pipeline<S, G> {
    config: AppConfig,
    source: S,
    geocoder: G,
    extractor: ListingExtractor,
}

impl Pipeline<PageFetcher, Geocoder> {
    /// Live pipeline against the configured site and geocoding services.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let source = PageFetcher::new(&config.scrape)?;
        let geocoder = Geocoder::new(&config.geocoder)?;
        Self::new(config, source, geocoder)
    }
}

impl<S: PageSource, G: Geocode> Pipeline<S, G> {
    pub fn new(config: AppConfig, source: S, geocoder: G) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            geocoder,
            extractor: ListingExtractor::new()?,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run to completion or until cancelled. A cancelled run still normalizes
    /// and exports what it collected; only a failed write is an error.
    pub fn run(&self, token: &CancellationToken, observer: &dyn RunObserver) -> AppResult<RunReport> {
        let mut report = RunReport::started();
        info!(max_pages = self.config.scrape.max_pages, "run started");

        let raws = self.scrape_pages(token, observer, &mut report);
        report.raw_listings = raws.len();

        let normalized = normalize(raws);
        report.dropped_without_access = normalized.dropped_without_access;
        report.duplicates_removed = normalized.duplicates_removed;
        let mut dataset = normalized.dataset;
        report.rows = dataset.len();

        self.geocode_rows(&mut dataset, token, observer);
        report.geocoded = dataset.count_geo(|g| matches!(g, GeoStatus::Resolved(_)));
        report.unresolved = dataset.count_geo(|g| *g == GeoStatus::Unresolved);
        report.not_attempted = dataset.count_geo(|g| *g == GeoStatus::NotAttempted);

        let map = MapBuilder::new(&self.config.map).build(&dataset);
        report.markers = map.markers().len();

        if token.is_cancelled() {
            report.outcome = Outcome::Cancelled;
        }

        self.export(&dataset, map, &mut report)?;

        let report = report.finish();
        info!(
            outcome = ?report.outcome,
            rows = report.rows,
            markers = report.markers,
            "run finished"
        );
        Ok(report)
    }

    fn scrape_pages(
        &self,
        token: &CancellationToken,
        observer: &dyn RunObserver,
        report: &mut RunReport,
    ) -> Vec<RawListing> {
        let max_pages = self.config.scrape.max_pages;
        let mut raws = Vec::new();

        for page in 1..=max_pages {
            if stop_requested(token, observer) {
                info!(page, "cancelled before fetching page");
                break;
            }
            if page > 1 {
                pause(self.config.scrape.page_pause);
            }

            report.pages_requested += 1;
            let url = self.config.scrape.page_url(page);

            match self.scrape_page(&url, token, observer) {
                Ok(extraction) => {
                    report.pages_fetched += 1;
                    report.skipped_rows += extraction.skipped_rows;
                    info!(
                        page,
                        buildings = extraction.buildings,
                        listings = extraction.listings.len(),
                        "page scraped"
                    );
                    raws.extend(extraction.listings);
                    if extraction.interrupted {
                        info!(page, "cancelled while extracting page");
                    }
                }
                Err(e) => {
                    warn!(page, url = %url, error = %e, "skipping page");
                    report.failed_pages.push(page);
                }
            }

            observer.on_progress(page as usize, max_pages as usize);
        }

        raws
    }

    fn scrape_page(
        &self,
        url: &str,
        token: &CancellationToken,
        observer: &dyn RunObserver,
    ) -> Result<PageExtraction, ScraperError> {
        let page_url = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let document = self.source.fetch(url)?;
        Ok(self
            .extractor
            .extract(&document, &page_url, || stop_requested(token, observer)))
    }

    /// Resolve every row in order. Rows reached after a cancellation stay `NotAttempted`.
    fn geocode_rows(&self, dataset: &mut Dataset, token: &CancellationToken, observer: &dyn RunObserver) {
        let addresses: Vec<String> = dataset.iter().map(|r| r.address.clone()).collect();
        let total = addresses.len();
        let mut jitter = CollisionJitter::from_config(&self.config.jitter);

        for (index, address) in addresses.iter().enumerate() {
            if stop_requested(token, observer) {
                info!(done = index, total, "cancelled during geocoding");
                break;
            }
            if index > 0 {
                pause(self.config.geocoder.pause);
            }

            let status = match self.geocoder.resolve(address) {
                Resolution::Found(point) => GeoStatus::Resolved(jitter.place(point)),
                Resolution::Unresolved => GeoStatus::Unresolved,
            };
            debug!(address = %address, ?status, "geocoded");
            dataset.set_geo(index, status);

            observer.on_progress(index + 1, total);
        }
    }

    fn export(&self, dataset: &Dataset, map: MapArtifact, report: &mut RunReport) -> AppResult<()> {
        let output = &self.config.output;

        export_listings_csv(dataset, &output.csv_path)?;
        report.outputs.push(output.csv_path.clone());

        if let Some(xlsx_path) = &output.xlsx_path {
            export_listings_xlsx(dataset, xlsx_path)?;
            report.outputs.push(xlsx_path.clone());
        }

        map.save(&output.map_path)?;
        report.outputs.push(output.map_path.clone());
        Ok(())
    }
}

/// Yield point: ask the host, and latch its answer into the token.
fn stop_requested(token: &CancellationToken, observer: &dyn RunObserver) -> bool {
    if !token.is_cancelled() && observer.on_cancel_requested() {
        token.cancel();
    }
    token.is_cancelled()
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
