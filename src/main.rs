use std::sync::Arc;

use waypoint::config::JourneyConfig;
use waypoint::engine::JourneyEngine;
use waypoint::external::{google_maps::GoogleMaps, RouteProvider, RouteService};
use waypoint::server::serve;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match JourneyConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let maps = match GoogleMaps::from_env() {
        Ok(maps) => maps,
        Err(err) => {
            tracing::error!(%err, "failed to build directions client");
            std::process::exit(1);
        }
    };
    if !maps.is_loaded() {
        tracing::warn!("GOOGLE_MAPS_API_BASE/GOOGLE_MAPS_API_KEY not set, journeys use synthetic routes");
    }

    let routes = Arc::new(RouteService::new(Arc::new(maps)));
    let addr = config.addr;
    let engine = JourneyEngine::new(config, routes);

    if let Err(err) = serve(engine, addr).await {
        tracing::error!(%err, "shutting down");
        std::process::exit(1);
    }
}
