//! Coordinate model and request parameter validation

use serde::{Deserialize, Serialize};

use crate::ResolverError;

const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A validated WGS84 coordinate pair
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> crate::Result<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(ResolverError::UnparseableNumber);
        }

        if !LATITUDE_RANGE.contains(&latitude) || !LONGITUDE_RANGE.contains(&longitude) {
            return Err(ResolverError::OutOfRange);
        }

        Ok(Self {
            latitude: unsigned_zero(latitude),
            longitude: unsigned_zero(longitude),
        })
    }

    /// Parse raw `lat`/`lng` request parameters.
    ///
    /// Missing or blank values fail with [`ResolverError::InvalidInput`] before
    /// any parsing happens, so `lat=abc` with no `lng` still reports the
    /// missing parameter.
    pub fn parse(lat: Option<&str>, lng: Option<&str>) -> crate::Result<Self> {
        let (Some(lat), Some(lng)) = (non_blank(lat), non_blank(lng)) else {
            return Err(ResolverError::InvalidInput);
        };

        let latitude = parse_degrees(lat)?;
        let longitude = parse_degrees(lng)?;

        Self::new(latitude, longitude)
    }

    /// Format as `"{lat}, {lng}"` with a fixed number of decimals
    #[must_use]
    pub fn format_fixed(&self, decimals: usize) -> String {
        format!(
            "{:.*}, {:.*}",
            decimals, self.latitude, decimals, self.longitude
        )
    }

    /// The `lat,lng` pair as providers expect it in a single query parameter
    #[must_use]
    pub fn latlng_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

// -0.0 would otherwise format as "-0.000000"
fn unsigned_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_degrees(raw: &str) -> crate::Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ResolverError::UnparseableNumber)
}
