//! Google Geocoding API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{Coordinates, GeoError, ReverseGeocoder};
use crate::config::{LocationConfig, GEOCODER_KEY_ENV};

/// Reverse geocoder backed by the Google Geocoding API.
pub struct GoogleGeocoder {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

/// Geocoding API response format.
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}

impl GoogleGeocoder {
    pub fn new(config: &LocationConfig) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }
}

/// Pull the first formatted address out of a response.
///
/// `ZERO_RESULTS` is not an error; any other non-OK status is.
fn first_address(response: GeocodeResponse) -> Result<Option<String>, GeoError> {
    match response.status.as_str() {
        "OK" => Ok(response
            .results
            .into_iter()
            .next()
            .map(|r| r.formatted_address)),
        "ZERO_RESULTS" => Ok(None),
        other => Err(GeoError::Status(match response.error_message {
            Some(message) => format!("{}: {}", other, message),
            None => other.to_string(),
        })),
    }
}

#[async_trait]
impl ReverseGeocoder for GoogleGeocoder {
    fn is_available(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "Google geocoder is configured".to_string()
        } else {
            format!(
                "No geocoding API key. Set {} or location.api_key in the config",
                GEOCODER_KEY_ENV
            )
        }
    }

    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<String>, GeoError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GeoError::NotConfigured(self.availability_hint()))?;
        let latlng = format!("{},{}", coords.latitude, coords.longitude);

        let response: GeocodeResponse = self
            .client
            .get(&self.endpoint)
            .query(&[("latlng", latlng.as_str()), ("key", key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        first_address(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GeocodeResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_first_address_ok() {
        let response = parse(
            r#"{"status":"OK","results":[
                {"formatted_address":"123 St, Springfield, IL, USA"},
                {"formatted_address":"Springfield, IL, USA"}]}"#,
        );
        assert_eq!(
            first_address(response).unwrap().as_deref(),
            Some("123 St, Springfield, IL, USA")
        );
    }

    #[test]
    fn test_zero_results() {
        let response = parse(r#"{"status":"ZERO_RESULTS","results":[]}"#);
        assert_eq!(first_address(response).unwrap(), None);
    }

    #[test]
    fn test_denied_status_is_error() {
        let response = parse(r#"{"status":"REQUEST_DENIED","error_message":"bad key"}"#);
        let err = first_address(response).unwrap_err();
        assert_eq!(err.to_string(), "Geocoder returned status REQUEST_DENIED: bad key");
    }

    #[test]
    fn test_availability_requires_key() {
        let mut config = LocationConfig::default();
        let geocoder = GoogleGeocoder::new(&config).unwrap();
        assert!(!geocoder.is_available());
        assert!(geocoder.availability_hint().contains(GEOCODER_KEY_ENV));

        config.api_key = Some("abc".to_string());
        assert!(GoogleGeocoder::new(&config).unwrap().is_available());
    }
}
