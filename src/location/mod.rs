//! Device location lookup.
//!
//! A [`PositionSource`] supplies coordinates, a [`ReverseGeocoder`] turns
//! them into a formatted address, and the address is split into
//! country/state/city from the end.

mod google;
mod position;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use google::GoogleGeocoder;
pub use position::{FixedPosition, NoPosition};

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Geocoder not configured: {0}")]
    NotConfigured(String),

    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoder returned status {0}")]
    Status(String),
}

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Country, state and city parsed from a formatted address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationData {
    pub country: String,
    pub state: String,
    pub city: String,
}

impl LocationData {
    /// Take the last three comma-separated segments as country, state, city.
    ///
    /// Segments are trimmed. Addresses with fewer than three segments leave
    /// the missing fields empty.
    pub fn from_formatted_address(address: &str) -> Self {
        let mut segments = address.rsplit(',').map(|s| s.trim().to_string());
        Self {
            country: segments.next().unwrap_or_default(),
            state: segments.next().unwrap_or_default(),
            city: segments.next().unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.country.is_empty() && self.state.is_empty() && self.city.is_empty()
    }
}

impl std::fmt::Display for LocationData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<&str> = [&self.city, &self.state, &self.country]
            .into_iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Supplies the current device position.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// `None` when geolocation is unsupported.
    async fn current_position(&self) -> Option<Coordinates>;
}

/// Converts coordinates into a formatted address.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    fn is_available(&self) -> bool;

    fn availability_hint(&self) -> String;

    /// Formatted address of the best match, or `None` when nothing matched.
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<String>, GeoError>;
}

/// Resolves the device location.
pub struct LocationResolver {
    position: Box<dyn PositionSource>,
    geocoder: Box<dyn ReverseGeocoder>,
}

impl LocationResolver {
    pub fn new(position: Box<dyn PositionSource>, geocoder: Box<dyn ReverseGeocoder>) -> Self {
        Self { position, geocoder }
    }

    pub fn geocoder(&self) -> &dyn ReverseGeocoder {
        self.geocoder.as_ref()
    }

    /// Look up the current location.
    ///
    /// Returns `None` only when geolocation is unsupported. A geocoder with no
    /// match, or one that fails, yields empty fields; failures are logged.
    pub async fn resolve(&self) -> Option<LocationData> {
        let Some(coords) = self.position.current_position().await else {
            tracing::warn!("Geolocation is not supported by this device.");
            return None;
        };

        match self.geocoder.reverse_geocode(coords).await {
            Ok(Some(address)) => {
                tracing::debug!("Reverse geocoded to {}", address);
                Some(LocationData::from_formatted_address(&address))
            }
            Ok(None) => Some(LocationData::default()),
            Err(e) => {
                tracing::warn!("Reverse geocoding failed: {}", e);
                Some(LocationData::default())
            }
        }
    }
}
