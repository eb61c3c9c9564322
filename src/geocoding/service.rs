use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{info, instrument, warn};

use super::{AuthMethod, BigDataCloudClient, OlaMapsAttempt, OlaMapsCredentials, ReverseGeocoder};
use crate::ResolverError;
use crate::config::ResolverConfig;
use crate::models::{Coordinate, GeocodeResult, Resolution, Source};

/// Record of one step of the chain for a single request
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAttempt {
    pub strategy: &'static str,
    /// Set for the Ola Maps steps, `None` for the fallback provider
    pub method: Option<AuthMethod>,
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl ProviderAttempt {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Reverse geocoding service holding the ordered provider chain
pub struct LocationService {
    strategies: Vec<Box<dyn ReverseGeocoder>>,
    placeholder_city: String,
    configured: bool,
}

impl LocationService {
    /// Service running `strategies` in order, then the coordinate-only answer
    pub fn new(strategies: Vec<Box<dyn ReverseGeocoder>>, placeholder_city: impl Into<String>) -> Self {
        Self {
            strategies,
            placeholder_city: placeholder_city.into(),
            configured: true,
        }
    }

    /// Service without provider credentials; every lookup is rejected
    pub fn unconfigured(placeholder_city: impl Into<String>) -> Self {
        Self {
            strategies: Vec::new(),
            placeholder_city: placeholder_city.into(),
            configured: false,
        }
    }

    /// Build the production chain: Ola Maps with each auth scheme, then BigDataCloud
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let Some(credentials) = OlaMapsCredentials::from_config(&config.olamaps) else {
            return Ok(Self::unconfigured(config.placeholder_city.clone()));
        };

        let timeout = Duration::from_secs(config.http.timeout_seconds);
        let client = Client::builder()
            .user_agent(config.http.user_agent.clone())
            .connect_timeout(timeout)
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let mut strategies: Vec<Box<dyn ReverseGeocoder>> =
            OlaMapsAttempt::all(&client, &config.olamaps.base_url, credentials, timeout)
                .into_iter()
                .map(|attempt| Box::new(attempt) as Box<dyn ReverseGeocoder>)
                .collect();

        strategies.push(Box::new(BigDataCloudClient::new(
            client,
            config.fallback.base_url.clone(),
            config.fallback.locality_language.clone(),
            timeout,
        )));

        Ok(Self::new(strategies, config.placeholder_city.clone()))
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Names of the chain steps, in the order they are attempted
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve a coordinate. Only fails when the service is unconfigured.
    pub async fn resolve(&self, coordinate: &Coordinate) -> crate::Result<Resolution> {
        self.resolve_traced(coordinate)
            .await
            .map(|(resolution, _)| resolution)
    }

    /// Resolve a coordinate and return the attempts made on the way
    #[instrument(skip(self), fields(lat = coordinate.latitude, lng = coordinate.longitude))]
    pub async fn resolve_traced(
        &self,
        coordinate: &Coordinate,
    ) -> crate::Result<(Resolution, Vec<ProviderAttempt>)> {
        if !self.configured {
            warn!("Reverse geocoding requested but no provider API key is configured");
            return Err(ResolverError::Misconfiguration);
        }

        let mut attempts = Vec::with_capacity(self.strategies.len());
        let mut last_error = None;

        for strategy in &self.strategies {
            let started = Instant::now();
            let outcome = strategy.reverse_geocode(coordinate).await;
            let elapsed = started.elapsed();

            match outcome {
                Ok(resolution) => {
                    info!(
                        strategy = strategy.name(),
                        method = ?strategy.auth_method(),
                        outcome = "success",
                        elapsed_ms = elapsed.as_millis() as u64,
                        source = %resolution.source,
                        "Reverse geocoding attempt succeeded"
                    );
                    attempts.push(ProviderAttempt {
                        strategy: strategy.name(),
                        method: strategy.auth_method(),
                        error: None,
                        elapsed,
                    });
                    return Ok((resolution, attempts));
                }
                Err(e) => {
                    warn!(
                        strategy = strategy.name(),
                        method = ?strategy.auth_method(),
                        outcome = "error",
                        elapsed_ms = elapsed.as_millis() as u64,
                        error = %e,
                        "Reverse geocoding attempt failed"
                    );
                    attempts.push(ProviderAttempt {
                        strategy: strategy.name(),
                        method: strategy.auth_method(),
                        error: Some(e.to_string()),
                        elapsed,
                    });
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = &last_error {
            warn!(
                last_error = %e,
                attempts = attempts.len(),
                "All reverse geocoding providers failed, responding with coordinates only"
            );
        }

        let result = GeocodeResult::coordinates_only(coordinate, &self.placeholder_city);
        Ok((Resolution::normalized(Source::CoordinatesOnly, result), attempts))
    }
}
