//! Configuration management for the location resolver
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and validates the result before the server starts.

use crate::ResolverError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable pointing at a config file
pub const CONFIG_FILE_ENV: &str = "LOCATION_RESOLVER_CONFIG";

const ENV_PREFIX: &str = "LOCATION_RESOLVER";

/// Root configuration structure for the location resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Primary provider (Ola Maps) credentials and endpoint
    pub olamaps: OlaMapsConfig,
    /// Free fallback provider endpoint
    pub fallback: FallbackConfig,
    /// Outbound HTTP settings shared by all providers
    pub http: HttpConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// City reported when no provider could resolve the coordinate
    pub placeholder_city: String,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

/// Ola Maps credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OlaMapsConfig {
    /// API key; without it every lookup is rejected as misconfigured
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub client_id: Option<String>,
    /// Accepted for completeness, never sent upstream
    pub client_secret: Option<String>,
    /// Base URL of the Ola Maps API
    pub base_url: String,
}

/// Fallback provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Base URL of the BigDataCloud API
    pub base_url: String,
    /// Language requested for locality names
    pub locality_language: String,
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout applied to every single provider request
    pub timeout_seconds: u64,
    /// User agent sent to providers
    pub user_agent: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_olamaps_base_url() -> String {
    "https://api.olamaps.io".to_string()
}

fn default_fallback_base_url() -> String {
    "https://api.bigdatacloud.net".to_string()
}

fn default_locality_language() -> String {
    "en".to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_user_agent() -> String {
    format!("location-resolver/{}", crate::VERSION)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_placeholder_city() -> String {
    "Current Location".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            olamaps: OlaMapsConfig::default(),
            fallback: FallbackConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
            placeholder_city: default_placeholder_city(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for OlaMapsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project_id: None,
            client_id: None,
            client_secret: None,
            base_url: default_olamaps_base_url(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            base_url: default_fallback_base_url(),
            locality_language: default_locality_language(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// `LOCATION_RESOLVER_OLAMAPS__API_KEY` style overrides.
///
/// Values stay strings; numeric fields are converted on deserialization so
/// ids like `007` keep their leading zeros.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

impl ResolverConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(environment());

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ResolverConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_overrides(|key| env::var(key).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Apply the conventional provider variables (`OLA_MAPS_API_KEY`, ...)
    /// and `PORT`. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = lookup("OLA_MAPS_API_KEY") {
            self.olamaps.api_key = Some(api_key);
        }
        if let Some(project_id) = lookup("OLA_MAPS_PROJECT_ID") {
            self.olamaps.project_id = Some(project_id);
        }
        if let Some(client_id) = lookup("OLA_MAPS_CLIENT_ID") {
            self.olamaps.client_id = Some(client_id);
        }
        if let Some(client_secret) = lookup("OLA_MAPS_CLIENT_SECRET") {
            self.olamaps.client_secret = Some(client_secret);
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.olamaps.base_url.is_empty() {
            self.olamaps.base_url = default_olamaps_base_url();
        }
        if self.fallback.base_url.is_empty() {
            self.fallback.base_url = default_fallback_base_url();
        }
        if self.fallback.locality_language.is_empty() {
            self.fallback.locality_language = default_locality_language();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_timeout();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.placeholder_city.is_empty() {
            self.placeholder_city = default_placeholder_city();
        }

        for field in [
            &mut self.olamaps.api_key,
            &mut self.olamaps.project_id,
            &mut self.olamaps.client_id,
            &mut self.olamaps.client_secret,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Whether a primary provider key is available
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.olamaps.api_key.is_some()
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 60 {
            return Err(
                ResolverError::config("Provider timeout cannot exceed 60 seconds").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ResolverError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ResolverError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Ola Maps", &self.olamaps.base_url),
            ("Fallback", &self.fallback.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ResolverError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.olamaps.base_url, "https://api.olamaps.io");
        assert_eq!(config.fallback.base_url, "https://api.bigdatacloud.net");
        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.placeholder_city, "Current Location");
        assert!(config.olamaps.api_key.is_none());
        assert!(!config.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars = HashMap::from([
            ("OLA_MAPS_API_KEY", "key-123"),
            ("OLA_MAPS_PROJECT_ID", "project-1"),
            ("OLA_MAPS_CLIENT_ID", ""),
            ("PORT", "8080"),
        ]);

        let mut config = ResolverConfig::default();
        config.apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.olamaps.api_key.as_deref(), Some("key-123"));
        assert_eq!(config.olamaps.project_id.as_deref(), Some("project-1"));
        assert!(config.olamaps.client_id.is_none());
        assert_eq!(config.server.port, 8080);
        assert!(config.is_configured());
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let mut config = ResolverConfig::default();
        config.olamaps.api_key = Some("   ".to_string());
        config.apply_defaults();
        assert!(!config.is_configured());
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = ResolverConfig::default();
        config.http.timeout_seconds = 0;
        config.placeholder_city = String::new();
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.placeholder_city, "Current Location");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = ResolverConfig::default();
        config.logging.level = "loud".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = ResolverConfig::default();
        config.http.timeout_seconds = 120;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot exceed"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = ResolverConfig::default();
        config.fallback.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Fallback base URL"));
    }

    #[test]
    fn test_prefixed_env_values_keep_their_text() {
        let vars: config::Map<String, String> = [
            ("LOCATION_RESOLVER_OLAMAPS__PROJECT_ID", "007"),
            ("LOCATION_RESOLVER_OLAMAPS__API_KEY", "12345"),
            ("LOCATION_RESOLVER_HTTP__TIMEOUT_SECONDS", "7"),
            ("LOCATION_RESOLVER_SERVER__PORT", "8081"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config: ResolverConfig = Config::builder()
            .add_source(environment().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.olamaps.project_id.as_deref(), Some("007"));
        assert_eq!(config.olamaps.api_key.as_deref(), Some("12345"));
        assert_eq!(config.http.timeout_seconds, 7);
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = env::temp_dir().join(format!("resolver-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "placeholder_city = \"Somewhere\"\n\n[http]\ntimeout_seconds = 3\n\n[logging]\nformat = \"json\"\n",
        )
        .unwrap();

        let result = ResolverConfig::load_from_path(Some(path.clone()));
        std::fs::remove_file(&path).ok();
        let config = result.unwrap();

        assert_eq!(config.http.timeout_seconds, 3);
        assert_eq!(config.placeholder_city, "Somewhere");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.fallback.locality_language, "en");
    }
}
