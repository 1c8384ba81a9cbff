mod builder;
mod page;
mod popup;

pub use builder::{MapArtifact, MapBuilder, Marker, MarkerCluster};
pub use popup::popup_content;
