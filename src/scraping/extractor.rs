// extractor.rs
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::scraping::{RawListing, ScraperError, ShapeError};

const BUILDING: &str = "div.cassetteitem";
const TITLE: &str = "div.cassetteitem_content-title";
const CATEGORY: &str = "div.cassetteitem_content-label";
const ADDRESS: &str = "li.cassetteitem_detail-col1";
const ACCESS: &str = "div.cassetteitem_detail-text";
const AGE_AND_STRUCTURE: &str = "li.cassetteitem_detail-col3 div";
const IMAGE: &str = "img.js-noContextMenu";
const UNIT_ROWS: &str = "table.cassetteitem_other tbody";
const CELL: &str = "td";
const ITEM: &str = "li";
const LINK: &str = "a";

/// Where a unit field lives inside a detail-table row: a cell, and optionally
/// the n-th list item inside that cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRef {
    pub column: usize,
    pub item: Option<usize>,
}

impl CellRef {
    pub const fn cell(column: usize) -> Self {
        Self { column, item: None }
    }

    pub const fn item(column: usize, item: usize) -> Self {
        Self {
            column,
            item: Some(item),
        }
    }
}

/// Named layout of the per-unit detail table.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitColumns {
    pub floor: CellRef,
    pub rent: CellRef,
    pub management_fee: CellRef,
    pub deposit: CellRef,
    pub key_money: CellRef,
    pub layout: CellRef,
    pub area: CellRef,
    pub detail_link: usize,
}

impl Default for UnitColumns {
    fn default() -> Self {
        Self {
            floor: CellRef::cell(2),
            rent: CellRef::item(3, 0),
            management_fee: CellRef::item(3, 1),
            deposit: CellRef::item(4, 0),
            key_money: CellRef::item(4, 1),
            layout: CellRef::item(5, 0),
            area: CellRef::item(5, 1),
            detail_link: 8,
        }
    }
}

impl UnitColumns {
    fn required_cells(&self) -> usize {
        [
            self.floor.column,
            self.rent.column,
            self.management_fee.column,
            self.deposit.column,
            self.key_money.column,
            self.layout.column,
            self.area.column,
            self.detail_link,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

/// What one page yielded.
#[derive(Debug, Default)]
pub struct PageExtraction {
    pub listings: Vec<RawListing>,
    pub buildings: usize,
    pub skipped_rows: usize,
    /// Cancellation was observed before every building was visited.
    pub interrupted: bool,
}

struct Selectors {
    building: Selector,
    title: Selector,
    category: Selector,
    address: Selector,
    access: Selector,
    age_and_structure: Selector,
    image: Selector,
    unit_rows: Selector,
    cell: Selector,
    item: Selector,
    link: Selector,
}

struct BuildingFields {
    name: String,
    category: String,
    address: String,
    access: Option<String>,
    building_age: String,
    structure: String,
    image_url: Option<String>,
}

struct UnitFields {
    floor: String,
    rent: String,
    management_fee: String,
    deposit: String,
    key_money: String,
    layout: String,
    area: String,
    detail_url: String,
}

pub struct ListingExtractor {
    selectors: Selectors,
    columns: UnitColumns,
}

fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

impl ListingExtractor {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_columns(UnitColumns::default())
    }

    pub fn with_columns(columns: UnitColumns) -> Result<Self, ScraperError> {
        let selectors = Selectors {
            building: selector(BUILDING)?,
            title: selector(TITLE)?,
            category: selector(CATEGORY)?,
            address: selector(ADDRESS)?,
            access: selector(ACCESS)?,
            age_and_structure: selector(AGE_AND_STRUCTURE)?,
            image: selector(IMAGE)?,
            unit_rows: selector(UNIT_ROWS)?,
            cell: selector(CELL)?,
            item: selector(ITEM)?,
            link: selector(LINK)?,
        };

        Ok(Self { selectors, columns })
    }

    /// One `RawListing` per unit row of every building on the page. Malformed
    /// buildings and rows are skipped and counted, never raised. `should_stop`
    /// is polled before each building.
    pub fn extract(
        &self,
        document: &Html,
        page_url: &Url,
        should_stop: impl Fn() -> bool,
    ) -> PageExtraction {
        let mut out = PageExtraction::default();

        for building in document.select(&self.selectors.building) {
            if should_stop() {
                out.interrupted = true;
                break;
            }
            out.buildings += 1;

            let rows: Vec<ElementRef<'_>> = building.select(&self.selectors.unit_rows).collect();

            let shared = match self.building_fields(building, page_url) {
                Ok(shared) => shared,
                Err(e) => {
                    warn!(page = %page_url, rows = rows.len(), error = %e, "skipping building");
                    out.skipped_rows += rows.len();
                    continue;
                }
            };

            for (index, row) in rows.into_iter().enumerate() {
                match self.unit_fields(row, page_url) {
                    Ok(unit) => out.listings.push(combine(&shared, unit)),
                    Err(e) => {
                        warn!(
                            page = %page_url,
                            building = %shared.name,
                            row = index,
                            error = %e,
                            "skipping malformed unit row"
                        );
                        out.skipped_rows += 1;
                    }
                }
            }
        }

        debug!(
            page = %page_url,
            buildings = out.buildings,
            listings = out.listings.len(),
            skipped = out.skipped_rows,
            "page extracted"
        );
        out
    }

    fn first_text(&self, scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
        scope
            .select(selector)
            .next()
            .map(text_of)
            .filter(|s| !s.is_empty())
    }

    fn building_fields(
        &self,
        building: ElementRef<'_>,
        page_url: &Url,
    ) -> Result<BuildingFields, ShapeError> {
        let s = &self.selectors;

        let name = self
            .first_text(building, &s.title)
            .ok_or(ShapeError::MissingBuildingField("name"))?;
        let address = self
            .first_text(building, &s.address)
            .ok_or(ShapeError::MissingBuildingField("address"))?;
        let category = self.first_text(building, &s.category).unwrap_or_default();

        // Every transit line belongs to the building, not to a unit: keep them together.
        let stations: Vec<String> = building
            .select(&s.access)
            .map(text_of)
            .filter(|t| !t.is_empty())
            .collect();
        let access = (!stations.is_empty()).then(|| stations.join(" / "));

        let mut details = building.select(&s.age_and_structure).map(text_of);
        let building_age = details.next().unwrap_or_default();
        let structure = details.next().unwrap_or_default();

        let image_url = building
            .select(&s.image)
            .next()
            .and_then(|img| img.value().attr("rel").or_else(|| img.value().attr("src")))
            .map(str::trim)
            .filter(|src| !src.is_empty() && !src.starts_with("data:"))
            .and_then(|src| page_url.join(src).ok())
            .map(|u| u.to_string());

        Ok(BuildingFields {
            name,
            category,
            address,
            access,
            building_age,
            structure,
            image_url,
        })
    }

    fn unit_fields(&self, row: ElementRef<'_>, page_url: &Url) -> Result<UnitFields, ShapeError> {
        let cells: Vec<ElementRef<'_>> = row.select(&self.selectors.cell).collect();
        let needed = self.columns.required_cells();
        if cells.len() < needed {
            return Err(ShapeError::TooFewCells {
                found: cells.len(),
                needed,
            });
        }

        let c = &self.columns;
        let href = cells[c.detail_link]
            .select(&self.selectors.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ShapeError::MissingDetailLink)?;
        let detail_url = page_url
            .join(href)
            .map_err(|e| ShapeError::BadLink {
                href: href.to_string(),
                message: e.to_string(),
            })?
            .to_string();

        Ok(UnitFields {
            floor: self.field(&cells, c.floor, "floor")?,
            rent: self.field(&cells, c.rent, "rent")?,
            management_fee: self.field(&cells, c.management_fee, "management fee")?,
            deposit: self.field(&cells, c.deposit, "deposit")?,
            key_money: self.field(&cells, c.key_money, "key money")?,
            layout: self.field(&cells, c.layout, "layout")?,
            area: self.field(&cells, c.area, "area")?,
            detail_url,
        })
    }

    fn field(
        &self,
        cells: &[ElementRef<'_>],
        at: CellRef,
        field: &'static str,
    ) -> Result<String, ShapeError> {
        let cell = cells[at.column];
        match at.item {
            None => Ok(text_of(cell)),
            Some(item) => cell
                .select(&self.selectors.item)
                .nth(item)
                .map(text_of)
                .ok_or(ShapeError::MissingItem {
                    field,
                    column: at.column,
                    item,
                }),
        }
    }
}

fn combine(shared: &BuildingFields, unit: UnitFields) -> RawListing {
    RawListing {
        name: shared.name.clone(),
        category: shared.category.clone(),
        address: shared.address.clone(),
        access: shared.access.clone(),
        building_age: shared.building_age.clone(),
        structure: shared.structure.clone(),
        image_url: shared.image_url.clone(),
        floor: unit.floor,
        rent: unit.rent,
        management_fee: unit.management_fee,
        deposit: unit.deposit,
        key_money: unit.key_money,
        layout: unit.layout,
        area: unit.area,
        detail_url: unit.detail_url,
    }
}
