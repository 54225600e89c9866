use crate::{
    config::JourneyConfig,
    entities::{Coordinates, Route, RouteSource, Shipment},
    error::{provider_unavailable_error, Error},
    external::RouteService,
    path::{self, polyline},
};

pub struct LoadedRoute {
    pub route: Route,
    pub distance_meters: Option<f64>,
}

/// Resolves road geometry for `shipment`: its own encoded route first, then
/// the route provider. Never fails; anything unusable becomes a synthetic
/// curved path between the endpoints.
#[tracing::instrument(skip_all, fields(id = %shipment.id))]
pub async fn load_route(
    routes: &RouteService,
    config: &JourneyConfig,
    shipment: &Shipment,
) -> LoadedRoute {
    match fetch_geometry(routes, shipment).await {
        Ok((points, source, distance_meters)) if points.len() >= 2 => LoadedRoute {
            route: Route::new(points, source, config.densify_points),
            distance_meters,
        },
        Ok((points, source, _)) => {
            tracing::warn!(
                ?source,
                points = points.len(),
                "route geometry too short, using fallback path"
            );
            fallback(config, shipment.origin, shipment.destination)
        }
        Err(err) => {
            tracing::warn!(%err, "route unavailable, using fallback path");
            fallback(config, shipment.origin, shipment.destination)
        }
    }
}

async fn fetch_geometry(
    routes: &RouteService,
    shipment: &Shipment,
) -> Result<(Vec<Coordinates>, RouteSource, Option<f64>), Error> {
    if let Some(encoded) = &shipment.route_polyline {
        let line = polyline::decode(encoded)?;
        let points = line.coords().copied().map(Coordinates::from).collect();
        return Ok((points, RouteSource::Encoded, shipment.distance_meters));
    }

    if !routes.is_loaded() {
        return Err(provider_unavailable_error());
    }

    let provided = routes
        .get_route(shipment.origin, shipment.destination)
        .await?;
    let line = polyline::decode(&provided.polyline)?;
    let points = line.coords().copied().map(Coordinates::from).collect();

    Ok((points, RouteSource::Provider, provided.distance_meters))
}

fn fallback(config: &JourneyConfig, origin: Coordinates, destination: Coordinates) -> LoadedRoute {
    let points = path::fallback_path(origin, destination, config.fallback_points);

    LoadedRoute {
        route: Route::new(points, RouteSource::Fallback, config.densify_points),
        distance_meters: None,
    }
}
