use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::engine::{Phase, UpdateCallback};
use crate::entities::{JourneyStatus, Route, Shipment};
use crate::error::Error;

#[async_trait]
pub trait JourneyAPI {
    /// Loads routes for `shipments` and makes the journey startable. Route
    /// provider failures never surface here.
    async fn initialize_journey(
        &self,
        shipments: Vec<Shipment>,
        callback: UpdateCallback,
    ) -> Result<(), Error>;

    fn start(&self);
    fn pause(&self);
    fn resume(&self);
    fn destroy(&self);
    fn set_speed(&self, multiplier: f64);

    fn journey_status(&self) -> Option<JourneyStatus>;
    fn phase(&self) -> Phase;
    fn route(&self, shipment_id: Uuid) -> Option<Route>;
}

pub trait API: JourneyAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
