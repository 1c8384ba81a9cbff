use std::path::Path;

use tracing::info;

use crate::domain::Dataset;
use crate::errors::{AppError, AppResult};
use crate::spreadsheets::table::{TableRow, HEADERS};

/// Write the dataset as UTF-8 CSV, one row per listing, overwriting `path`.
pub fn export_listings_csv(dataset: &Dataset, path: &Path) -> AppResult<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| AppError::persistence(path, e))?;

    if dataset.is_empty() {
        // serde only emits the header row alongside the first record.
        writer
            .write_record(HEADERS)
            .map_err(|e| AppError::persistence(path, e))?;
    }

    for listing in dataset.iter() {
        writer
            .serialize(TableRow::from_listing(listing))
            .map_err(|e| AppError::persistence(path, format!("row {}: {e}", listing.name)))?;
    }

    writer.flush().map_err(|e| AppError::persistence(path, e))?;
    info!(path = %path.display(), rows = dataset.len(), "table written");
    Ok(())
}
