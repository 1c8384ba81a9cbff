use serde::Serialize;

use crate::domain::NormalizedListing;

pub const HEADERS: [&str; 17] = [
    "名称",
    "カテゴリー",
    "アドレス",
    "アクセス",
    "築年数",
    "構造",
    "画像",
    "階数",
    "家賃",
    "管理費",
    "敷金",
    "礼金",
    "間取り",
    "面積",
    "URL",
    "経度",
    "緯度",
];

/// One exported row. Coordinates are empty for rows that were not resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow<'a> {
    #[serde(rename = "名称")]
    pub name: &'a str,
    #[serde(rename = "カテゴリー")]
    pub category: &'a str,
    #[serde(rename = "アドレス")]
    pub address: &'a str,
    #[serde(rename = "アクセス")]
    pub access: &'a str,
    #[serde(rename = "築年数")]
    pub building_age: f64,
    #[serde(rename = "構造")]
    pub structure: &'a str,
    #[serde(rename = "画像")]
    pub image_url: Option<&'a str>,
    #[serde(rename = "階数")]
    pub floor: &'a str,
    #[serde(rename = "家賃")]
    pub rent: f64,
    #[serde(rename = "管理費")]
    pub management_fee: f64,
    #[serde(rename = "敷金")]
    pub deposit: f64,
    #[serde(rename = "礼金")]
    pub key_money: f64,
    #[serde(rename = "間取り")]
    pub layout: &'a str,
    #[serde(rename = "面積")]
    pub area: f64,
    #[serde(rename = "URL")]
    pub detail_url: &'a str,
    #[serde(rename = "経度")]
    pub longitude: Option<f64>,
    #[serde(rename = "緯度")]
    pub latitude: Option<f64>,
}

/// A single worksheet cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Empty,
}

impl<'a> TableRow<'a> {
    pub fn from_listing(listing: &'a NormalizedListing) -> Self {
        let point = listing.geo.point();
        Self {
            name: &listing.name,
            category: &listing.category,
            address: &listing.address,
            access: &listing.access,
            building_age: listing.building_age,
            structure: &listing.structure,
            image_url: listing.image_url.as_deref(),
            floor: &listing.floor,
            rent: listing.rent,
            management_fee: listing.management_fee,
            deposit: listing.deposit,
            key_money: listing.key_money,
            layout: &listing.layout,
            area: listing.area,
            detail_url: &listing.detail_url,
            longitude: point.map(|p| p.longitude),
            latitude: point.map(|p| p.latitude),
        }
    }

    /// Cells in `HEADERS` order.
    pub fn cells(&self) -> [Cell<'a>; 17] {
        let opt = |v: Option<f64>| v.map_or(Cell::Empty, Cell::Number);
        [
            Cell::Text(self.name),
            Cell::Text(self.category),
            Cell::Text(self.address),
            Cell::Text(self.access),
            Cell::Number(self.building_age),
            Cell::Text(self.structure),
            self.image_url.map_or(Cell::Empty, Cell::Text),
            Cell::Text(self.floor),
            Cell::Number(self.rent),
            Cell::Number(self.management_fee),
            Cell::Number(self.deposit),
            Cell::Number(self.key_money),
            Cell::Text(self.layout),
            Cell::Number(self.area),
            Cell::Text(self.detail_url),
            opt(self.longitude),
            opt(self.latitude),
        ]
    }
}
