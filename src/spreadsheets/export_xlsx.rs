use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::domain::Dataset;
use crate::errors::{AppError, AppResult};
use crate::spreadsheets::table::{Cell, TableRow, HEADERS};

/// Same columns as the CSV export, in a single worksheet.
pub fn export_listings_xlsx(dataset: &Dataset, path: &Path) -> AppResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // Headers
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| {
                AppError::persistence(path, format!("failed to write header '{header}': {e}"))
            })?;
    }

    // Rows
    for (i, listing) in dataset.iter().enumerate() {
        let r = (i + 1) as u32;

        for (col, cell) in TableRow::from_listing(listing).cells().into_iter().enumerate() {
            let col = col as u16;
            let written = match cell {
                Cell::Text(text) => worksheet.write_string(r, col, text).map(|_| ()),
                Cell::Number(value) => worksheet.write_number(r, col, value).map(|_| ()),
                Cell::Empty => Ok(()),
            };
            written.map_err(|e| {
                AppError::persistence(
                    path,
                    format!("failed to write {} for {}: {e}", HEADERS[col as usize], listing.name),
                )
            })?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| AppError::persistence(path, format!("failed to save workbook: {e}")))?;

    info!(path = %path.display(), rows = dataset.len(), "workbook written");
    Ok(())
}
