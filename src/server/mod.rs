mod handlers;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::server::handlers::{journey, shipments};
use crate::{
    api::{DynAPI, API},
    engine::UpdateCallback,
    entities::PositionUpdate,
    error::{server_error, Error},
};

/// Latest batch of position updates, kept for clients that poll.
#[derive(Clone, Default)]
pub struct PositionBoard {
    latest: Arc<Mutex<Vec<PositionUpdate>>>,
}

impl PositionBoard {
    pub fn latest(&self) -> Vec<PositionUpdate> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Callback that replaces the board contents with every new batch.
    pub fn subscriber(&self) -> UpdateCallback {
        let latest = self.latest.clone();

        Arc::new(move |updates: Vec<PositionUpdate>| {
            *latest.lock().unwrap_or_else(PoisonError::into_inner) = updates;
        })
    }
}

pub fn router(api: DynAPI, board: PositionBoard) -> Router {
    Router::new()
        .route(
            "/journey",
            post(journey::create)
                .get(journey::status)
                .delete(journey::destroy),
        )
        .route("/journey/start", patch(journey::start))
        .route("/journey/pause", patch(journey::pause))
        .route("/journey/resume", patch(journey::resume))
        .route("/journey/speed", patch(journey::set_speed))
        .route("/journey/positions", get(journey::positions))
        .route("/journey/route", get(journey::route))
        .route("/shipments/demo", get(shipments::demo))
        .layer(Extension(api))
        .layer(Extension(board))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let api = Arc::new(api) as DynAPI;
    let app = router(api, PositionBoard::default());

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|err| {
            tracing::error!(%err, "server stopped");
            server_error()
        })
}
