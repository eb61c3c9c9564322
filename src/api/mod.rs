use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    ResolverError, VERSION,
    geocoding::LocationService,
    models::{Coordinate, ResolvedData, Source},
};

/// Raw query parameters; parsing happens in [`Coordinate::parse`]
#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReverseGeocodeResponse {
    pub success: bool,
    pub data: ResolvedData,
    pub source: Source,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub configured: bool,
    pub timestamp: DateTime<Utc>,
}

pub fn router(service: Arc<LocationService>) -> Router {
    Router::new()
        .route("/location/reverse", get(reverse_geocode))
        .route("/health", get(health))
        .with_state(service)
}

async fn reverse_geocode(
    State(service): State<Arc<LocationService>>,
    query: Result<Query<ReverseQuery>, QueryRejection>,
) -> Result<Json<ReverseGeocodeResponse>, ResolverError> {
    // e.g. a repeated `lat`; the value is ambiguous so it is treated as unparseable
    let Query(query) = query.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "Rejected malformed query string");
        ResolverError::UnparseableNumber
    })?;

    let coordinate = Coordinate::parse(query.lat.as_deref(), query.lng.as_deref()).inspect_err(
        |e| debug!(lat = ?query.lat, lng = ?query.lng, error = %e, "Rejected reverse geocode request"),
    )?;

    let resolution = service.resolve(&coordinate).await?;

    match resolution.summary(&coordinate) {
        Some(summary) => info!(
            source = %resolution.source,
            address = %summary.formatted_address,
            "Resolved location"
        ),
        None => info!(source = %resolution.source, "Resolved location"),
    }

    Ok(Json(ReverseGeocodeResponse {
        success: true,
        data: resolution.data,
        source: resolution.source,
    }))
}

async fn health(State(service): State<Arc<LocationService>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: VERSION,
        configured: service.is_configured(),
        timestamp: Utc::now(),
    })
}
