//! Data models for the location resolver
//!
//! - Coordinate: validated latitude/longitude taken from the request
//! - Geocode: canonical results, response shapes and chain outcomes

pub mod coordinate;
pub mod geocode;

pub use coordinate::Coordinate;
pub use geocode::{GeocodeResult, ResolvedData, Resolution, ResultsEnvelope, Source, WireResult};
