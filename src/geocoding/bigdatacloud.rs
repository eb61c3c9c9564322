//! BigDataCloud free reverse geocoding client
//!
//! The free client endpoint needs no key. Its response is reshaped into the
//! canonical [`GeocodeResult`] so callers see the same structure whichever
//! provider answered.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ReverseGeocoder, read_json};
use crate::ProviderError;
use crate::models::{Coordinate, GeocodeResult, Resolution, Source};

const REVERSE_GEOCODE_PATH: &str = "/data/reverse-geocode-client";

/// Fallback provider client
pub struct BigDataCloudClient {
    client: Client,
    base_url: String,
    locality_language: String,
    timeout: Duration,
}

/// Subset of the BigDataCloud response used for reshaping
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BigDataCloudResponse {
    pub locality: Option<String>,
    pub city: Option<String>,
    pub principal_subdivision: Option<String>,
    pub administrative_area: Option<String>,
    pub country_name: Option<String>,
    #[serde(alias = "formatted")]
    pub formatted_address: Option<String>,
    pub locality_info: Option<LocalityInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LocalityInfo {
    #[serde(default)]
    pub administrative: Vec<AdministrativeLevel>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdministrativeLevel {
    pub name: Option<String>,
}

impl BigDataCloudClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        locality_language: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            locality_language: locality_language.into(),
            timeout,
        }
    }

    fn url(&self, coordinate: &Coordinate) -> String {
        format!(
            "{}{}?latitude={}&longitude={}&localityLanguage={}",
            self.base_url,
            REVERSE_GEOCODE_PATH,
            coordinate.latitude,
            coordinate.longitude,
            urlencoding::encode(&self.locality_language)
        )
    }
}

#[async_trait]
impl ReverseGeocoder for BigDataCloudClient {
    fn name(&self) -> &'static str {
        "bigdatacloud"
    }

    async fn reverse_geocode(&self, coordinate: &Coordinate) -> Result<Resolution, ProviderError> {
        debug!("Requesting BigDataCloud reverse geocode");

        let response = self
            .client
            .get(self.url(coordinate))
            .timeout(self.timeout)
            .send()
            .await?;
        let payload = read_json(response).await?;

        let parsed = BigDataCloudResponse::deserialize(&payload)
            .map_err(|e| ProviderError::Parse(format!("Unexpected BigDataCloud response: {e}")))?;

        let result = parsed.into_geocode_result(coordinate)?;
        Ok(Resolution::normalized(Source::Fallback, result))
    }
}

impl BigDataCloudResponse {
    /// Map fields by presence; empty strings count as missing
    pub fn into_geocode_result(self, coordinate: &Coordinate) -> Result<GeocodeResult, ProviderError> {
        let city = present(self.locality).or(present(self.city)).unwrap_or_default();
        let state = present(self.principal_subdivision)
            .or(present(self.administrative_area))
            .unwrap_or_default();
        let country = present(self.country_name).unwrap_or_default();
        let area = self
            .locality_info
            .and_then(|info| info.administrative.into_iter().nth(1))
            .and_then(|level| present(level.name))
            .unwrap_or_default();

        let formatted_address = match present(self.formatted_address) {
            Some(address) => address,
            None => [city.as_str(), state.as_str()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };

        if formatted_address.is_empty() {
            return Err(ProviderError::EmptyResult);
        }

        Ok(GeocodeResult {
            formatted_address,
            city,
            state,
            country,
            area,
            source_latitude: coordinate.latitude,
            source_longitude: coordinate.longitude,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coordinate() -> Coordinate {
        Coordinate::new(12.9716, 77.5946).unwrap()
    }

    fn parse(value: serde_json::Value) -> BigDataCloudResponse {
        BigDataCloudResponse::deserialize(&value).unwrap()
    }

    #[test]
    fn test_reshape_full_response() {
        let response = parse(json!({
            "locality": "Bengaluru",
            "city": "Bangalore",
            "principalSubdivision": "Karnataka",
            "countryName": "India",
            "localityInfo": {
                "administrative": [
                    { "name": "India" },
                    { "name": "Karnataka" },
                    { "name": "Bangalore Urban" }
                ]
            }
        }));

        let result = response.into_geocode_result(&coordinate()).unwrap();
        assert_eq!(result.city, "Bengaluru");
        assert_eq!(result.state, "Karnataka");
        assert_eq!(result.country, "India");
        assert_eq!(result.area, "Karnataka");
        assert_eq!(result.formatted_address, "Bengaluru, Karnataka");
        assert_eq!(result.source_latitude, 12.9716);
        assert_eq!(result.source_longitude, 77.5946);
    }

    #[test]
    fn test_reshape_uses_secondary_fields() {
        let response = parse(json!({
            "locality": "",
            "city": "Mysuru",
            "administrativeArea": "Karnataka",
            "countryName": "India"
        }));

        let result = response.into_geocode_result(&coordinate()).unwrap();
        assert_eq!(result.city, "Mysuru");
        assert_eq!(result.state, "Karnataka");
        assert!(result.area.is_empty());
    }

    #[test]
    fn test_reshape_prefers_explicit_formatted_field() {
        let response = parse(json!({
            "locality": "Bengaluru",
            "principalSubdivision": "Karnataka",
            "formatted": "100 Feet Road, Indiranagar, Bengaluru"
        }));

        let result = response.into_geocode_result(&coordinate()).unwrap();
        assert_eq!(result.formatted_address, "100 Feet Road, Indiranagar, Bengaluru");
    }

    #[test]
    fn test_reshape_skips_empty_parts() {
        let response = parse(json!({ "principalSubdivision": "Ladakh" }));
        let result = response.into_geocode_result(&coordinate()).unwrap();
        assert_eq!(result.formatted_address, "Ladakh");
    }

    #[test]
    fn test_reshape_without_any_address_fails() {
        let response = parse(json!({ "countryName": "", "lookupSource": "reverseGeocoding" }));
        assert!(matches!(
            response.into_geocode_result(&coordinate()),
            Err(ProviderError::EmptyResult)
        ));
    }

    #[test]
    fn test_url_contains_coordinates() {
        let client = BigDataCloudClient::new(
            Client::new(),
            "https://api.bigdatacloud.net/",
            "en",
            Duration::from_secs(5),
        );
        assert_eq!(
            client.url(&coordinate()),
            "https://api.bigdatacloud.net/data/reverse-geocode-client?latitude=12.9716&longitude=77.5946&localityLanguage=en"
        );
    }
}
