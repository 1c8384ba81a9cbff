mod client;
mod geocode_error;
mod jitter;
mod models;

pub use client::{Geocode, Geocoder};
pub use geocode_error::GeocodeError;
pub use jitter::{CollisionJitter, CollisionPolicy};
