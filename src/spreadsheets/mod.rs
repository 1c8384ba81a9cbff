pub mod export_csv;
pub mod export_xlsx;
mod table;

pub use export_csv::export_listings_csv;
pub use export_xlsx::export_listings_xlsx;
pub use table::{Cell, TableRow, HEADERS};
