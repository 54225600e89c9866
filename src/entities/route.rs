use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;
use crate::path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    Encoded,
    Provider,
    Fallback,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    pub points: Vec<Coordinates>,
    pub source: RouteSource,
    pub distance_meters: f64,
}

impl Route {
    /// Builds a route from raw geometry, densified to `density` points.
    pub fn new(points: Vec<Coordinates>, source: RouteSource, density: usize) -> Self {
        let points = path::densify(&points, density);
        let distance_meters = path::path_length(&points);

        Self {
            points,
            source,
            distance_meters,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn position_at(&self, progress: f64) -> Option<Coordinates> {
        path::position_at_progress(&self.points, progress)
    }
}
