use serde::Serialize;

/// One unit row as scraped, before any typing. Building-level fields are
/// repeated on every unit of the same building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawListing {
    // Building
    pub name: String,
    pub category: String,
    pub address: String,
    /// Transit lines joined with " / "; `None` when the building lists none.
    pub access: Option<String>,
    pub building_age: String,
    pub structure: String,
    pub image_url: Option<String>,

    // Unit
    pub floor: String,
    pub rent: String,
    pub management_fee: String,
    pub deposit: String,
    pub key_money: String,
    pub layout: String,
    pub area: String,
    pub detail_url: String,
}
