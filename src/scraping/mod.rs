mod extractor;
mod fetcher;
mod models;
mod scraper_error;

pub use extractor::{CellRef, ListingExtractor, PageExtraction, UnitColumns};
pub use fetcher::{PageFetcher, PageSource};
pub use models::RawListing;
pub use scraper_error::{ScraperError, ShapeError};
