// client.rs
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::GeocoderConfig;
use crate::domain::{GeoPoint, Resolution};
use crate::errors::{AppError, AppResult};
use crate::geocoding::models::{
    coordinate, postal_code, AddressCandidate, PostalGeocode, PostalLookup,
};
use crate::geocoding::GeocodeError;

/// Resolves a free-text address. Failures are never raised: they come back as
/// `Resolution::Unresolved` so a batch can carry on.
pub trait Geocode {
    fn resolve(&self, address: &str) -> Resolution;
}

impl<T: Geocode + ?Sized> Geocode for &T {
    fn resolve(&self, address: &str) -> Resolution {
        (**self).resolve(address)
    }
}

/// Address search first; when it has no candidate, postal-code lookup followed
/// by postal-code geocoding.
pub struct Geocoder {
    client: Client,
    config: GeocoderConfig,
}

impl Geocoder {
    pub fn new(config: &GeocoderConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn try_resolve(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        if let Some(point) = self.search_address(address)? {
            return Ok(point);
        }

        debug!(address, "no address-search candidate, falling back to postal code");
        let postal = self.lookup_postal_code(address)?;
        self.locate_postal_code(&postal)
    }

    /// `Ok(None)` when the service answered with zero candidates.
    fn search_address(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        let (url, candidates): (_, Vec<AddressCandidate>) =
            self.get_json(&self.config.address_search_url, &[("q", address)])?;

        let Some(first) = candidates.first() else {
            return Ok(None);
        };

        let coords = first
            .geometry
            .as_ref()
            .map(|g| g.coordinates.as_slice())
            .unwrap_or_default();
        match (coords.first().and_then(coordinate), coords.get(1).and_then(coordinate)) {
            (Some(longitude), Some(latitude)) => Ok(Some(GeoPoint::new(longitude, latitude))),
            _ => Err(GeocodeError::Missing {
                url,
                what: "coordinates",
            }),
        }
    }

    fn lookup_postal_code(&self, address: &str) -> Result<String, GeocodeError> {
        let (url, lookup): (_, PostalLookup) =
            self.get_json(&self.config.postal_lookup_url, &[("address", address)])?;

        lookup
            .items
            .first()
            .and_then(|item| postal_code(&item.zipcode))
            .ok_or(GeocodeError::Missing {
                url,
                what: "postal code",
            })
    }

    fn locate_postal_code(&self, postal: &str) -> Result<GeoPoint, GeocodeError> {
        let (url, body): (_, PostalGeocode) = self.get_json(
            &self.config.postal_geocode_url,
            &[("method", "searchByPostal"), ("postal", postal)],
        )?;

        body.response
            .location
            .first()
            .and_then(|loc| Some(GeoPoint::new(coordinate(&loc.x)?, coordinate(&loc.y)?)))
            .ok_or(GeocodeError::Missing {
                url,
                what: "location",
            })
    }

    /// GET `base?query` and decode the body. Returns the full URL alongside for error reporting.
    fn get_json<T: DeserializeOwned>(
        &self,
        base: &str,
        query: &[(&str, &str)],
    ) -> Result<(String, T), GeocodeError> {
        let url = Url::parse_with_params(base, query)
            .map_err(|e| GeocodeError::InvalidUrl {
                url: base.to_string(),
                message: e.to_string(),
            })?
            .to_string();

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| GeocodeError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeocodeError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let text = resp.text().map_err(|e| GeocodeError::Request {
            url: url.clone(),
            message: e.to_string(),
        })?;

        match serde_json::from_str(&text) {
            Ok(value) => Ok((url, value)),
            Err(e) => Err(GeocodeError::Decode {
                url,
                message: e.to_string(),
            }),
        }
    }
}

impl Geocode for Geocoder {
    fn resolve(&self, address: &str) -> Resolution {
        match self.try_resolve(address) {
            Ok(point) => Resolution::Found(point),
            Err(e) => {
                warn!(address, url = e.url(), error = %e, "geocoding failed");
                Resolution::Unresolved
            }
        }
    }
}
