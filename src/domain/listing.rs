// src/domain/listing.rs

use crate::domain::GeoStatus;

/// A scraped unit with typed money/area/age fields.
///
/// Money is in units of 10,000 yen: rent is published that way, the
/// management fee is published in yen and divided down to match.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedListing {
    pub name: String,
    pub category: String,
    pub address: String,
    pub access: String,
    /// Years; 0.0 for new builds.
    pub building_age: f64,
    pub structure: String,
    pub image_url: Option<String>,
    pub floor: String,
    pub rent: f64,
    pub management_fee: f64,
    pub deposit: f64,
    pub key_money: f64,
    pub layout: String,
    /// Square metres.
    pub area: f64,
    pub detail_url: String,

    pub geo: GeoStatus,
}

/// Rows of one scraping run, in first-seen order. Only the geocoding state of
/// a row changes after normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<NormalizedListing>,
}

impl Dataset {
    pub fn new(rows: Vec<NormalizedListing>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[NormalizedListing] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedListing> {
        self.rows.iter()
    }

    /// Record the geocoding outcome of one row. Returns false for an out-of-range index.
    pub fn set_geo(&mut self, index: usize, status: GeoStatus) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.geo = status;
                true
            }
            None => false,
        }
    }

    pub fn count_geo(&self, pred: impl Fn(&GeoStatus) -> bool) -> usize {
        self.rows.iter().filter(|r| pred(&r.geo)).count()
    }
}
