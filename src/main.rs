use std::sync::Arc;

use anyhow::{Context, Result};
use location_resolver::{LocationService, ResolverConfig, logging, web};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ResolverConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging)?;

    let service = LocationService::from_config(&config)?;
    if service.is_configured() {
        info!(chain = ?service.strategy_names(), "Reverse geocoding chain ready");
    } else {
        warn!("OLA_MAPS_API_KEY is not set; reverse geocoding requests will fail with 500");
    }

    web::run(&config.server, Arc::new(service)).await
}
