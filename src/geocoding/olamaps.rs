use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{ReverseGeocoder, read_json};
use crate::ProviderError;
use crate::config::OlaMapsConfig;
use crate::models::{Coordinate, GeocodeResult, Resolution};

const REVERSE_GEOCODE_PATH: &str = "/places/v1/reverse-geocode";

/// How the API key is presented to Ola Maps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// `?api_key=...`
    QueryParamKey,
    /// `Authorization: Bearer ...` plus optional project/client id headers
    BearerToken,
    /// `X-API-Key: ...`
    HeaderKey,
}

impl AuthMethod {
    /// Order in which the schemes are attempted
    pub const ORDER: [AuthMethod; 3] = [
        AuthMethod::QueryParamKey,
        AuthMethod::BearerToken,
        AuthMethod::HeaderKey,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::QueryParamKey => "olamaps:query_param_key",
            AuthMethod::BearerToken => "olamaps:bearer_token",
            AuthMethod::HeaderKey => "olamaps:header_key",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials shared by all three attempts
#[derive(Clone)]
pub struct OlaMapsCredentials {
    pub api_key: String,
    pub project_id: Option<String>,
    pub client_id: Option<String>,
}

impl OlaMapsCredentials {
    /// `None` when no API key is configured
    #[must_use]
    pub fn from_config(config: &OlaMapsConfig) -> Option<Self> {
        config.api_key.as_ref().map(|api_key| Self {
            api_key: api_key.clone(),
            project_id: config.project_id.clone(),
            client_id: config.client_id.clone(),
        })
    }
}

// Keep the key out of Debug output and therefore out of logs.
impl fmt::Debug for OlaMapsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OlaMapsCredentials")
            .field("api_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// A single Ola Maps reverse geocoding attempt using one auth scheme
pub struct OlaMapsAttempt {
    client: Client,
    base_url: String,
    credentials: Arc<OlaMapsCredentials>,
    method: AuthMethod,
    timeout: Duration,
}

impl OlaMapsAttempt {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        credentials: Arc<OlaMapsCredentials>,
        method: AuthMethod,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            method,
            timeout,
        }
    }

    /// One attempt per auth scheme, in [`AuthMethod::ORDER`]
    pub fn all(
        client: &Client,
        base_url: &str,
        credentials: OlaMapsCredentials,
        timeout: Duration,
    ) -> Vec<Self> {
        let credentials = Arc::new(credentials);
        AuthMethod::ORDER
            .iter()
            .map(|method| {
                Self::new(
                    client.clone(),
                    base_url,
                    Arc::clone(&credentials),
                    *method,
                    timeout,
                )
            })
            .collect()
    }

    #[must_use]
    pub fn method(&self) -> AuthMethod {
        self.method
    }

    fn request(&self, coordinate: &Coordinate) -> RequestBuilder {
        let mut url = format!(
            "{}{}?latlng={}",
            self.base_url,
            REVERSE_GEOCODE_PATH,
            urlencoding::encode(&coordinate.latlng_param())
        );
        let credentials = &self.credentials;

        let request = match self.method {
            AuthMethod::QueryParamKey => {
                url.push_str("&api_key=");
                url.push_str(&urlencoding::encode(&credentials.api_key));
                self.client.get(url)
            }
            AuthMethod::BearerToken => {
                let mut request = self.client.get(url).bearer_auth(&credentials.api_key);
                if let Some(project_id) = &credentials.project_id {
                    request = request.header("X-Project-ID", project_id);
                }
                if let Some(client_id) = &credentials.client_id {
                    request = request.header("X-Client-ID", client_id);
                }
                request
            }
            AuthMethod::HeaderKey => self
                .client
                .get(url)
                .header("X-API-Key", &credentials.api_key),
        };

        request.timeout(self.timeout)
    }
}

#[async_trait]
impl ReverseGeocoder for OlaMapsAttempt {
    fn name(&self) -> &'static str {
        self.method.as_str()
    }

    fn auth_method(&self) -> Option<AuthMethod> {
        Some(self.method)
    }

    async fn reverse_geocode(&self, coordinate: &Coordinate) -> Result<Resolution, ProviderError> {
        debug!(method = %self.method, "Requesting Ola Maps reverse geocode");

        let response = self.request(coordinate).send().await?;
        let payload = read_json(response).await?;

        Ok(Resolution::primary(payload))
    }
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    #[serde(default)]
    results: Vec<OlaResult>,
}

#[derive(Debug, Deserialize)]
struct OlaResult {
    formatted_address: Option<String>,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    geometry: Option<OlaGeometry>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OlaGeometry {
    location: OlaLocation,
}

#[derive(Debug, Deserialize)]
struct OlaLocation {
    lat: f64,
    lng: f64,
}

impl OlaResult {
    fn component(&self, kind: &str) -> String {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
            .map(|c| c.long_name.clone())
            .unwrap_or_default()
    }
}

/// Extract a canonical result from an Ola Maps payload.
///
/// Only used for logging; the payload itself is forwarded untouched.
#[must_use]
pub fn summarize(payload: &Value, coordinate: &Coordinate) -> Option<GeocodeResult> {
    let response = ReverseGeocodeResponse::deserialize(payload).ok()?;
    let first = response.results.into_iter().next()?;

    let formatted_address = first.formatted_address.clone().filter(|a| !a.is_empty())?;
    let (source_latitude, source_longitude) = first
        .geometry
        .as_ref()
        .map_or((coordinate.latitude, coordinate.longitude), |g| {
            (g.location.lat, g.location.lng)
        });

    Some(GeocodeResult {
        formatted_address,
        city: first.component("locality"),
        state: first.component("administrative_area_level_1"),
        country: first.component("country"),
        area: first.component("sublocality"),
        source_latitude,
        source_longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credentials() -> OlaMapsCredentials {
        OlaMapsCredentials {
            api_key: "secret key".to_string(),
            project_id: Some("project-1".to_string()),
            client_id: None,
        }
    }

    fn attempt(method: AuthMethod) -> OlaMapsAttempt {
        OlaMapsAttempt::new(
            Client::new(),
            "https://api.olamaps.io/",
            Arc::new(credentials()),
            method,
            Duration::from_secs(5),
        )
    }

    fn coordinate() -> Coordinate {
        Coordinate::new(12.9716, 77.5946).unwrap()
    }

    #[test]
    fn test_all_attempts_follow_method_order() {
        let attempts = OlaMapsAttempt::all(
            &Client::new(),
            "https://api.olamaps.io",
            credentials(),
            Duration::from_secs(5),
        );
        let methods: Vec<AuthMethod> = attempts.iter().map(OlaMapsAttempt::method).collect();
        assert_eq!(methods, AuthMethod::ORDER.to_vec());
        assert!(
            attempts
                .iter()
                .all(|a| a.auth_method() == Some(a.method()))
        );
    }

    #[test]
    fn test_query_param_request() {
        let request = attempt(AuthMethod::QueryParamKey)
            .request(&coordinate())
            .build()
            .unwrap();

        assert_eq!(request.url().path(), "/places/v1/reverse-geocode");
        let query: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert!(query.contains(&("latlng".to_string(), "12.9716,77.5946".to_string())));
        assert!(query.contains(&("api_key".to_string(), "secret key".to_string())));
        assert!(request.headers().get("authorization").is_none());
        assert_eq!(request.timeout(), Some(&Duration::from_secs(5)));
    }

    #[test]
    fn test_bearer_request_adds_optional_headers() {
        let request = attempt(AuthMethod::BearerToken)
            .request(&coordinate())
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer secret key"
        );
        assert_eq!(request.headers().get("x-project-id").unwrap(), "project-1");
        assert!(request.headers().get("x-client-id").is_none());
        assert!(!request.url().as_str().contains("api_key"));
    }

    #[test]
    fn test_header_key_request() {
        let request = attempt(AuthMethod::HeaderKey)
            .request(&coordinate())
            .build()
            .unwrap();

        assert_eq!(request.headers().get("x-api-key").unwrap(), "secret key");
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let debug = format!("{:?}", credentials());
        assert!(!debug.contains("secret key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_summarize_payload() {
        let payload = json!({
            "status": "ok",
            "results": [{
                "formatted_address": "MG Road, Bengaluru, Karnataka, India",
                "geometry": { "location": { "lat": 12.9757, "lng": 77.6055 } },
                "address_components": [
                    { "long_name": "MG Road", "types": ["sublocality"] },
                    { "long_name": "Bengaluru", "types": ["locality", "political"] },
                    { "long_name": "Karnataka", "types": ["administrative_area_level_1"] },
                    { "long_name": "India", "types": ["country"] }
                ]
            }]
        });

        let summary = summarize(&payload, &coordinate()).unwrap();
        assert_eq!(summary.formatted_address, "MG Road, Bengaluru, Karnataka, India");
        assert_eq!(summary.city, "Bengaluru");
        assert_eq!(summary.state, "Karnataka");
        assert_eq!(summary.country, "India");
        assert_eq!(summary.area, "MG Road");
        assert_eq!(summary.source_latitude, 12.9757);
    }

    #[test]
    fn test_summarize_unexpected_payload() {
        assert!(summarize(&json!({ "status": "ok", "results": [] }), &coordinate()).is_none());
        assert!(summarize(&json!(["not", "an", "object"]), &coordinate()).is_none());
    }
}
