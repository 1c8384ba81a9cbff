//! Rental-listing scraper: fetch listing-index pages, normalize the units
//! they advertise, geocode each address and publish a clustered map plus a table.

pub mod config;
pub mod domain;
pub mod errors;
pub mod geocoding;
pub mod logging;
pub mod map;
pub mod pipeline;
pub mod scraping;
pub mod spreadsheets;
