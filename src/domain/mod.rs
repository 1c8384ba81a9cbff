pub mod geo;
pub mod listing;
pub mod normalize;

pub use geo::{GeoPoint, GeoStatus, Resolution};
pub use listing::{Dataset, NormalizedListing};
pub use normalize::{dedup, extract_number, normalize, to_halfwidth, Normalized};
