// src/domain/normalize.rs

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::domain::{Dataset, GeoStatus, NormalizedListing};
use crate::scraping::RawListing;

/// Management fees are published in yen; rent in units of 10,000 yen.
const FEE_DIVISOR: f64 = 10_000.0;

const FULLWIDTH_OFFSET: u32 = 0xFEE0;

/// Output of a normalization pass plus what it threw away.
#[derive(Debug, Default)]
pub struct Normalized {
    pub dataset: Dataset,
    pub dropped_without_access: usize,
    pub duplicates_removed: usize,
}

fn number_pattern() -> Option<&'static Regex> {
    static NUMBER: OnceLock<Option<Regex>> = OnceLock::new();
    NUMBER
        .get_or_init(|| Regex::new(r"[0-9]*\.?[0-9]+").ok())
        .as_ref()
}

/// First numeric run in `text` as a float. Text without digits ("-", "新築")
/// means "no value" and yields 0.0.
pub fn extract_number(text: &str) -> f64 {
    number_pattern()
        .and_then(|re| re.find(text))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Full-width Latin letters and digits (Ａ-Ｚ, ａ-ｚ, ０-９) to ASCII. Everything else is left alone.
pub fn to_halfwidth(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'Ａ'..='Ｚ' | 'ａ'..='ｚ' | '０'..='９' => {
                char::from_u32(c as u32 - FULLWIDTH_OFFSET).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

fn from_raw(raw: RawListing) -> Option<NormalizedListing> {
    let access = raw.access?;

    Some(NormalizedListing {
        name: to_halfwidth(&raw.name),
        category: raw.category,
        address: to_halfwidth(&raw.address),
        access,
        building_age: extract_number(&raw.building_age),
        structure: raw.structure,
        image_url: raw.image_url,
        floor: raw.floor,
        rent: extract_number(&raw.rent),
        management_fee: extract_number(&raw.management_fee) / FEE_DIVISOR,
        deposit: extract_number(&raw.deposit),
        key_money: extract_number(&raw.key_money),
        layout: raw.layout,
        area: extract_number(&raw.area),
        detail_url: raw.detail_url,
        geo: GeoStatus::NotAttempted,
    })
}

// 0.0 and -0.0 must collide.
fn bits(value: f64) -> u64 {
    (value + 0.0).to_bits()
}

type ListingKey = (
    String,
    String,
    u64,
    u64,
    String,
    u64,
    u64,
    u64,
    String,
    String,
    u64,
);

fn listing_key(l: &NormalizedListing) -> ListingKey {
    (
        l.address.clone(),
        l.category.clone(),
        bits(l.rent),
        bits(l.deposit),
        l.structure.clone(),
        bits(l.key_money),
        bits(l.management_fee),
        bits(l.building_age),
        l.layout.clone(),
        l.floor.clone(),
        bits(l.area),
    )
}

/// Two passes, first occurrence wins: unique by name, then unique by the
/// composite of address, category, money, structure, age, layout, floor and area.
pub fn dedup(rows: Vec<NormalizedListing>) -> Vec<NormalizedListing> {
    let mut names = HashSet::new();
    let by_name: Vec<NormalizedListing> = rows
        .into_iter()
        .filter(|row| names.insert(row.name.clone()))
        .collect();

    let mut keys = HashSet::new();
    by_name
        .into_iter()
        .filter(|row| keys.insert(listing_key(row)))
        .collect()
}

/// Type the raw rows, drop those without transit access, then deduplicate.
/// Transliteration happens before deduplication so that "Ａ棟" and "A棟" count as one name.
pub fn normalize(raws: Vec<RawListing>) -> Normalized {
    let total = raws.len();
    let typed: Vec<NormalizedListing> = raws.into_iter().filter_map(from_raw).collect();
    let dropped_without_access = total - typed.len();
    if dropped_without_access > 0 {
        debug!(dropped = dropped_without_access, "dropped rows without access");
    }

    let before_dedup = typed.len();
    let rows = dedup(typed);
    let duplicates_removed = before_dedup - rows.len();

    info!(
        raw = total,
        kept = rows.len(),
        duplicates = duplicates_removed,
        "normalized listings"
    );

    Normalized {
        dataset: Dataset::new(rows),
        dropped_without_access,
        duplicates_removed,
    }
}
