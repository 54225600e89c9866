use super::helpers::{load_route, LoadedRoute};
use super::{JourneyEngine, Phase, UpdateCallback};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::JourneyAPI,
    entities::{JourneyStatus, Route, Shipment},
    error::Error,
};

#[async_trait]
impl JourneyAPI for JourneyEngine {
    #[tracing::instrument(skip_all, fields(shipments = shipments.len()))]
    async fn initialize_journey(
        &self,
        shipments: Vec<Shipment>,
        callback: UpdateCallback,
    ) -> Result<(), Error> {
        // nothing to animate; the active journey, if any, is left running
        if shipments.is_empty() {
            tracing::warn!("initialize_journey called without shipments, ignoring");
            return Ok(());
        }

        let epoch = {
            let mut state = self.inner.lock();
            if state.is_initialized() {
                tracing::info!("replacing active journey");
            }
            state.teardown();
            state.epoch
        };

        let mut loaded = Vec::with_capacity(shipments.len());
        for mut shipment in shipments {
            let LoadedRoute {
                route,
                distance_meters,
            } = load_route(&self.inner.routes, &self.inner.config, &shipment).await;

            shipment.begin_journey();
            shipment.distance_meters = shipment
                .distance_meters
                .or(distance_meters)
                .or(Some(route.distance_meters));

            tracing::info!(
                id = %shipment.id,
                source = ?route.source,
                points = route.len(),
                "route ready"
            );

            loaded.push((shipment, route));
        }

        let mut state = self.inner.lock();
        if state.epoch != epoch {
            tracing::warn!("journey was torn down while loading routes, discarding");
            return Ok(());
        }

        for (shipment, route) in loaded {
            state.routes.insert(shipment.id, route);
            state.shipments.push(shipment);
        }
        state.callback = Some(callback);

        Ok(())
    }

    fn start(&self) {
        let mut state = self.inner.lock();

        if !state.is_initialized() {
            tracing::debug!("start ignored, no journey initialized");
            return;
        }
        if state.is_running() || state.completed {
            return;
        }

        if self.spawn_timer(&mut state) {
            tracing::info!(speed = state.speed, "journey started");
        }
    }

    fn pause(&self) {
        if self.inner.lock().stop_timer() {
            tracing::info!("journey paused");
        }
    }

    fn resume(&self) {
        self.start();
    }

    fn destroy(&self) {
        let mut state = self.inner.lock();
        let was_initialized = state.is_initialized();

        state.teardown();

        if was_initialized {
            tracing::info!("journey destroyed");
        }
    }

    fn set_speed(&self, multiplier: f64) {
        let speed = self.inner.lock().set_speed(multiplier);
        tracing::debug!(requested = multiplier, speed, "speed changed");
    }

    fn journey_status(&self) -> Option<JourneyStatus> {
        self.inner.lock().status()
    }

    fn phase(&self) -> Phase {
        self.inner.lock().phase()
    }

    fn route(&self, shipment_id: Uuid) -> Option<Route> {
        self.inner.lock().routes.get(&shipment_id).cloned()
    }
}
