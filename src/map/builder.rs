use std::fs;
use std::path::Path;

use maud::{html, Markup};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::domain::{Dataset, GeoStatus, NormalizedListing};
use crate::errors::{AppError, AppResult};
use crate::map::page::map_page;
use crate::map::popup_content;

/// One map pin. `tooltip` and `popup` are already HTML.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub tooltip: String,
    pub popup: String,
}

impl Marker {
    fn for_listing(listing: &NormalizedListing, lat: f64, lon: f64) -> Self {
        let tooltip: Markup = html! { (listing.name) };
        Self {
            lat,
            lon,
            tooltip: tooltip.into_string(),
            popup: popup_content(listing).into_string(),
        }
    }
}

/// All markers of a map; the page groups them into clusters at render time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerCluster {
    markers: Vec<Marker>,
}

impl MarkerCluster {
    pub fn add(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// A finished map, ready to be written out once.
#[derive(Debug, Clone)]
pub struct MapArtifact {
    center_lat: f64,
    center_lon: f64,
    zoom: u8,
    cluster: MarkerCluster,
}

impl MapArtifact {
    pub fn center(&self) -> (f64, f64) {
        (self.center_lat, self.center_lon)
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn markers(&self) -> &[Marker] {
        self.cluster.markers()
    }

    pub fn render(&self) -> AppResult<Markup> {
        let markers_json = serde_json::to_string(self.cluster.markers())
            .map_err(|e| AppError::Render(e.to_string()))?;
        Ok(map_page(self, &markers_json))
    }

    /// Write the page to `path`. Consumes the artifact: a map is saved at most once.
    pub fn save(self, path: &Path) -> AppResult<()> {
        let page = self.render()?.into_string();
        fs::write(path, page).map_err(|e| AppError::persistence(path, e))?;
        info!(path = %path.display(), markers = self.cluster.len(), "map saved");
        Ok(())
    }
}

pub struct MapBuilder {
    config: MapConfig,
}

impl MapBuilder {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// One marker per resolved row, at the row's stored (already spread) position.
    pub fn build(&self, dataset: &Dataset) -> MapArtifact {
        let mut cluster = MarkerCluster::default();

        for listing in dataset.iter() {
            match listing.geo {
                GeoStatus::Resolved(point) => {
                    cluster.add(Marker::for_listing(listing, point.latitude, point.longitude));
                }
                GeoStatus::Unresolved => {
                    warn!(name = %listing.name, url = %listing.detail_url, "no coordinates, left off the map");
                }
                GeoStatus::NotAttempted => {
                    debug!(name = %listing.name, "not geocoded, left off the map");
                }
            }
        }

        MapArtifact {
            center_lat: self.config.center_lat,
            center_lon: self.config.center_lon,
            zoom: self.config.zoom,
            cluster,
        }
    }
}
