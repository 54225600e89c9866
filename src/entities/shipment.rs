use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Coordinates;

/// Progress this close to 100 counts as arrived, absorbing float drift from
/// summing fractional increments.
const ARRIVAL_EPSILON: f64 = 1e-6;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub number: String,
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub current: Coordinates,
    pub progress: f64,
    pub status: Status,
    #[serde(default)]
    pub route_polyline: Option<String>,
    #[serde(default)]
    pub distance_meters: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    InTransit,
    Delivered,
    Delayed,
}

impl Status {
    /// Status implied by `progress`. Once movement has started the shipment
    /// is never reported as pending again.
    pub fn from_progress(progress: f64, previous: Status) -> Status {
        if progress >= 100.0 {
            Status::Delivered
        } else if progress > 0.0 {
            Status::InTransit
        } else {
            previous
        }
    }
}

impl Shipment {
    pub fn new(number: String, origin: Coordinates, destination: Coordinates) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            origin,
            destination,
            current: origin,
            progress: 0.0,
            status: Status::Pending,
            route_polyline: None,
            distance_meters: None,
        }
    }

    pub fn with_route_polyline(mut self, polyline: String) -> Self {
        self.route_polyline = Some(polyline);
        self
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self.status, Status::Delivered)
    }

    /// Puts the shipment at the start of its journey.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub fn begin_journey(&mut self) {
        self.progress = 0.0;
        self.current = self.origin;
        self.status = Status::InTransit;
    }

    /// Moves progress forward by `increment`, clamped to 100. Negative
    /// increments are ignored so progress never goes backwards.
    pub fn advance(&mut self, increment: f64) -> f64 {
        let increment = if increment.is_finite() {
            increment.max(0.0)
        } else {
            0.0
        };

        self.progress = (self.progress + increment).min(100.0);
        if self.progress > 100.0 - ARRIVAL_EPSILON {
            self.progress = 100.0;
        }
        self.status = Status::from_progress(self.progress, self.status);
        self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipment() -> Shipment {
        Shipment::new(
            "SHP-000001".into(),
            Coordinates::new(34.0522, -118.2437),
            Coordinates::new(41.8781, -87.6298),
        )
    }

    #[test]
    fn new_shipment_is_pending_at_origin() {
        let s = shipment();
        assert_eq!(s.status, Status::Pending);
        assert_eq!(s.current, s.origin);
        assert_eq!(s.progress, 0.0);
    }

    #[test]
    fn advance_clamps_and_derives_status() {
        let mut s = shipment();
        s.begin_journey();

        assert_eq!(s.advance(40.0), 40.0);
        assert_eq!(s.status, Status::InTransit);

        assert_eq!(s.advance(-10.0), 40.0);
        assert_eq!(s.advance(f64::NAN), 40.0);

        assert_eq!(s.advance(59.9999999), 100.0);
        assert_eq!(s.status, Status::Delivered);
        assert!(s.is_delivered());
    }

    #[test]
    fn status_never_returns_to_pending() {
        assert_eq!(
            Status::from_progress(0.0, Status::InTransit),
            Status::InTransit
        );
        assert_eq!(Status::from_progress(0.0, Status::Pending), Status::Pending);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&Status::InTransit).unwrap();
        assert_eq!(json, "\"in_transit\"");
    }
}
