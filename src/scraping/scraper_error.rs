use thiserror::Error;

/// Failures while turning a listing-index URL into parsed markup.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
    #[error("invalid page URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: Box<ScraperError>,
    },
}

/// A building block or unit row that does not have the shape the extractor expects.
/// These never abort a page; the offending row is skipped and counted.
#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("building has no {0}")]
    MissingBuildingField(&'static str),
    #[error("row has {found} cells, needs at least {needed}")]
    TooFewCells { found: usize, needed: usize },
    #[error("{field}: cell {column} has no list item {item}")]
    MissingItem {
        field: &'static str,
        column: usize,
        item: usize,
    },
    #[error("row has no detail link")]
    MissingDetailLink,
    #[error("cannot resolve link `{href}`: {message}")]
    BadLink { href: String, message: String },
}
