pub mod google_maps;
mod route_service;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{entities::Coordinates, error::Error};

pub use route_service::RouteService;

/// Road geometry between two points as reported by a directions service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderRoute {
    pub polyline: String,
    pub distance_meters: Option<f64>,
}

#[async_trait]
pub trait RouteProvider {
    /// Whether the provider is configured and able to take requests.
    fn is_loaded(&self) -> bool;

    async fn get_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<ProviderRoute, Error>;
}

pub type DynRouteProvider = std::sync::Arc<dyn RouteProvider + Send + Sync>;
