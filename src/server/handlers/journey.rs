use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::{Coordinates, JourneyStatus, PositionUpdate, Route, Shipment};
use crate::error::{invalid_input_error, invalid_state_error, Error};
use crate::generator::ShipmentGenerator;
use crate::server::PositionBoard;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    number: Option<String>,
    origin: Option<Coordinates>,
    destination: Option<Coordinates>,
    route_polyline: Option<String>,
    seed: Option<u64>,
}

#[derive(Serialize, Deserialize)]
pub struct SpeedParams {
    multiplier: f64,
}

impl CreateParams {
    fn into_shipment(self) -> Result<Shipment, Error> {
        match (self.origin, self.destination, self.seed) {
            (Some(origin), Some(destination), _) => {
                let number = self.number.unwrap_or_else(|| "SHP-000000".into());
                let mut shipment = Shipment::new(number, origin, destination);
                shipment.route_polyline = self.route_polyline;
                Ok(shipment)
            }
            (None, None, Some(seed)) => ShipmentGenerator::new(seed)
                .with_routes()
                .generate(1)
                .pop()
                .ok_or_else(invalid_input_error),
            _ => Err(invalid_input_error()),
        }
    }
}

fn current_status(api: &DynAPI) -> Result<Json<JourneyStatus>, Error> {
    let status = api.journey_status().ok_or_else(invalid_state_error)?;

    Ok(status.into())
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Extension(board): Extension<PositionBoard>,
    Json(params): Json<CreateParams>,
) -> Result<Json<JourneyStatus>, Error> {
    let shipment = params.into_shipment()?;

    board.clear();
    api.initialize_journey(vec![shipment], board.subscriber())
        .await?;

    current_status(&api)
}

pub async fn status(Extension(api): Extension<DynAPI>) -> Result<Json<JourneyStatus>, Error> {
    current_status(&api)
}

pub async fn start(Extension(api): Extension<DynAPI>) -> Result<Json<JourneyStatus>, Error> {
    api.start();
    current_status(&api)
}

pub async fn pause(Extension(api): Extension<DynAPI>) -> Result<Json<JourneyStatus>, Error> {
    api.pause();
    current_status(&api)
}

pub async fn resume(Extension(api): Extension<DynAPI>) -> Result<Json<JourneyStatus>, Error> {
    api.resume();
    current_status(&api)
}

pub async fn set_speed(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<SpeedParams>,
) -> Result<Json<JourneyStatus>, Error> {
    api.set_speed(params.multiplier);
    current_status(&api)
}

pub async fn destroy(
    Extension(api): Extension<DynAPI>,
    Extension(board): Extension<PositionBoard>,
) -> StatusCode {
    api.destroy();
    board.clear();

    StatusCode::NO_CONTENT
}

pub async fn positions(Extension(board): Extension<PositionBoard>) -> Json<Vec<PositionUpdate>> {
    board.latest().into()
}

pub async fn route(Extension(api): Extension<DynAPI>) -> Result<Json<Route>, Error> {
    let status = api.journey_status().ok_or_else(invalid_state_error)?;
    let route = api
        .route(status.shipment_id)
        .ok_or_else(invalid_state_error)?;

    Ok(route.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JourneyConfig;
    use crate::engine::JourneyEngine;
    use crate::entities::{RouteSource, Status};
    use crate::external::{google_maps::GoogleMaps, RouteService};
    use std::sync::Arc;
    use std::time::Duration;

    fn api() -> DynAPI {
        let routes = RouteService::new(Arc::new(GoogleMaps::new(None, None).unwrap()));
        Arc::new(JourneyEngine::new(JourneyConfig::default(), Arc::new(routes)))
    }

    fn params() -> CreateParams {
        CreateParams {
            number: Some("SHP-123456".into()),
            origin: Some(Coordinates::new(34.0522, -118.2437)),
            destination: Some(Coordinates::new(41.8781, -87.6298)),
            route_polyline: None,
            seed: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn create_start_and_poll_positions() {
        let api = api();
        let board = PositionBoard::default();

        let Json(created) = create(
            Extension(api.clone()),
            Extension(board.clone()),
            Json(params()),
        )
        .await
        .unwrap();
        assert_eq!(created.status, Status::InTransit);
        assert!(!created.is_running);

        let Json(started) = start(Extension(api.clone())).await.unwrap();
        assert!(started.is_running);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        let Json(latest) = positions(Extension(board.clone())).await;
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].shipment_id, created.shipment_id);
        assert!(latest[0].progress_percentage > 3.0);

        let Json(route) = route(Extension(api.clone())).await.unwrap();
        assert_eq!(route.source, RouteSource::Fallback);

        assert_eq!(
            destroy(Extension(api.clone()), Extension(board.clone())).await,
            StatusCode::NO_CONTENT
        );
        assert!(board.latest().is_empty());
        assert_eq!(status(Extension(api)).await.unwrap_err(), invalid_state_error());
    }

    #[tokio::test]
    async fn speed_is_clamped_through_the_api() {
        let api = api();
        let board = PositionBoard::default();
        create(Extension(api.clone()), Extension(board), Json(params()))
            .await
            .unwrap();

        let Json(status) = set_speed(Extension(api), Json(SpeedParams { multiplier: 50.0 }))
            .await
            .unwrap();
        assert_eq!(status.current_speed, 10.0);
    }

    #[tokio::test]
    async fn seeded_journey_uses_generated_route() {
        let api = api();
        let params = CreateParams {
            number: None,
            origin: None,
            destination: None,
            route_polyline: None,
            seed: Some(5),
        };

        create(
            Extension(api.clone()),
            Extension(PositionBoard::default()),
            Json(params),
        )
        .await
        .unwrap();

        let Json(route) = route(Extension(api)).await.unwrap();
        assert_eq!(route.source, RouteSource::Encoded);
    }

    #[tokio::test]
    async fn incomplete_params_are_rejected() {
        let mut params = params();
        params.destination = None;

        let err = create(
            Extension(api()),
            Extension(PositionBoard::default()),
            Json(params),
        )
        .await
        .unwrap_err();
        assert_eq!(err, invalid_input_error());
    }
}
