// src/domain/geo.rs

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Result of asking the geocoding chain about one address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Found(GeoPoint),
    Unresolved,
}

/// Geocoding state of a dataset row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GeoStatus {
    /// The run was cancelled before this row was reached.
    #[default]
    NotAttempted,
    Unresolved,
    /// Placed position, after collision jitter.
    Resolved(GeoPoint),
}

impl GeoStatus {
    pub fn point(&self) -> Option<GeoPoint> {
        match self {
            GeoStatus::Resolved(p) => Some(*p),
            _ => None,
        }
    }
}
