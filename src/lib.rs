//! Location resolver - reverse geocoding that always answers
//!
//! Resolves coordinates to a human-readable address through an ordered
//! fallback chain: Ola Maps (three authentication schemes), then the free
//! BigDataCloud endpoint, then an answer synthesized from the coordinates.

pub mod api;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod logging;
pub mod models;
pub mod web;

// Re-export core types for public API
pub use config::ResolverConfig;
pub use error::{ProviderError, ResolverError};
pub use geocoding::{LocationService, ProviderAttempt, ReverseGeocoder};
pub use models::{Coordinate, GeocodeResult, Resolution, Source};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ResolverError>;
