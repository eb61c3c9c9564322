//! Geocoding results and the response shapes built from them
//!
//! `GeocodeResult` is the canonical internal shape. On the wire it becomes a
//! Google-style result object:
//!
//! | `GeocodeResult`     | wire field                        |
//! |---------------------|-----------------------------------|
//! | `formatted_address` | `formatted_address`               |
//! | `city`              | `address_components.city`         |
//! | `state`             | `address_components.state`        |
//! | `country`           | `address_components.country`      |
//! | `area`              | `address_components.area`         |
//! | `source_latitude`   | `geometry.location.lat`           |
//! | `source_longitude`  | `geometry.location.lng`           |
//!
//! Results from the primary provider are not reshaped: its payload already
//! uses a `results` array and is forwarded as-is.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::Coordinate;

/// Human-readable address resolved for a coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub area: String,
    pub source_latitude: f64,
    pub source_longitude: f64,
}

impl GeocodeResult {
    /// Degraded result built purely from the input coordinate
    #[must_use]
    pub fn coordinates_only(coordinate: &Coordinate, placeholder_city: &str) -> Self {
        Self {
            formatted_address: coordinate.format_fixed(6),
            city: placeholder_city.to_string(),
            state: String::new(),
            country: String::new(),
            area: String::new(),
            source_latitude: coordinate.latitude,
            source_longitude: coordinate.longitude,
        }
    }
}

/// Which stage of the chain produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "olamaps")]
    OlaMaps,
    #[serde(rename = "fallback")]
    Fallback,
    #[serde(rename = "coordinates_only")]
    CoordinatesOnly,
}

impl Source {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::OlaMaps => "olamaps",
            Source::Fallback => "fallback",
            Source::CoordinatesOnly => "coordinates_only",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddressComponents {
    pub city: String,
    pub state: String,
    pub country: String,
    pub area: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

/// A single result object as it appears in the response
#[derive(Debug, Serialize, Deserialize)]
pub struct WireResult {
    pub formatted_address: String,
    pub address_components: AddressComponents,
    pub geometry: Geometry,
}

impl From<&GeocodeResult> for WireResult {
    fn from(result: &GeocodeResult) -> Self {
        Self {
            formatted_address: result.formatted_address.clone(),
            address_components: AddressComponents {
                city: result.city.clone(),
                state: result.state.clone(),
                country: result.country.clone(),
                area: result.area.clone(),
            },
            geometry: Geometry {
                location: LatLng {
                    lat: result.source_latitude,
                    lng: result.source_longitude,
                },
            },
        }
    }
}

/// `{ "results": [...] }` envelope used for normalized data
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsEnvelope {
    pub results: Vec<WireResult>,
}

/// Payload of a resolution: forwarded provider JSON or a canonical result
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedData {
    Raw(Value),
    Normalized(GeocodeResult),
}

impl Serialize for ResolvedData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResolvedData::Raw(payload) => payload.serialize(serializer),
            ResolvedData::Normalized(result) => ResultsEnvelope {
                results: vec![WireResult::from(result)],
            }
            .serialize(serializer),
        }
    }
}

/// Outcome of running the fallback chain for one coordinate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub source: Source,
    pub data: ResolvedData,
}

impl Resolution {
    /// Raw payload from the primary provider
    #[must_use]
    pub fn primary(payload: Value) -> Self {
        Self {
            source: Source::OlaMaps,
            data: ResolvedData::Raw(payload),
        }
    }

    #[must_use]
    pub fn normalized(source: Source, result: GeocodeResult) -> Self {
        Self {
            source,
            data: ResolvedData::Normalized(result),
        }
    }

    /// Best-effort canonical view of the resolved address
    #[must_use]
    pub fn summary(&self, coordinate: &Coordinate) -> Option<GeocodeResult> {
        match &self.data {
            ResolvedData::Raw(payload) => crate::geocoding::olamaps::summarize(payload, coordinate),
            ResolvedData::Normalized(result) => Some(result.clone()),
        }
    }
}
