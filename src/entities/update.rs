use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Shipment, Status};

/// One shipment's position after a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub shipment_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub progress_percentage: f64,
    pub status: Status,
    pub estimated_eta: Option<DateTime<Utc>>,
}

impl PositionUpdate {
    pub fn new(shipment: &Shipment, estimated_eta: Option<DateTime<Utc>>) -> Self {
        Self {
            shipment_id: shipment.id,
            latitude: shipment.current.latitude,
            longitude: shipment.current.longitude,
            progress_percentage: shipment.progress,
            status: shipment.status,
            estimated_eta,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JourneyStatus {
    pub shipment_id: Uuid,
    pub progress: f64,
    pub status: Status,
    pub is_running: bool,
    pub current_speed: f64,
}
