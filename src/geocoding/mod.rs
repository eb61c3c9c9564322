//! Reverse geocoding module
//!
//! Providers implement [`ReverseGeocoder`]; [`LocationService`] runs them in
//! order and synthesizes a coordinate-only answer when all of them fail:
//! - Ola Maps, once per authentication scheme
//! - BigDataCloud free client endpoint, reshaped to the canonical result
//! - Coordinates only

pub mod bigdatacloud;
pub mod olamaps;
pub mod service;

use async_trait::async_trait;
use serde_json::Value;

use crate::ProviderError;
use crate::models::{Coordinate, Resolution};

pub use bigdatacloud::BigDataCloudClient;
pub use olamaps::{AuthMethod, OlaMapsAttempt, OlaMapsCredentials};
pub use service::{LocationService, ProviderAttempt};

/// One step of the fallback chain
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Label used in log events and attempt records
    fn name(&self) -> &'static str;

    /// Ola Maps auth scheme this step uses, if any
    fn auth_method(&self) -> Option<AuthMethod> {
        None
    }

    /// Resolve a coordinate, or explain why this step could not
    async fn reverse_geocode(&self, coordinate: &Coordinate) -> Result<Resolution, ProviderError>;
}

/// Turn a provider response into JSON, treating non-2xx as a failure
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, ProviderError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::NonSuccessStatus {
            status: status.as_u16(),
            body: truncate(&body, 200),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
