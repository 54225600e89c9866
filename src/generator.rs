//! Deterministic demo shipments between major US cities.

use geo_types::{Coord, LineString};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use uuid::Builder;

use crate::entities::{Coordinates, Shipment};
use crate::path::polyline;

const CITIES: [(&str, f64, f64); 10] = [
    ("Los Angeles", 34.0522, -118.2437),
    ("Chicago", 41.8781, -87.6298),
    ("New York", 40.7128, -74.0060),
    ("Houston", 29.7604, -95.3698),
    ("Phoenix", 33.4484, -112.0740),
    ("Seattle", 47.6062, -122.3321),
    ("Denver", 39.7392, -104.9903),
    ("Atlanta", 33.7490, -84.3880),
    ("Miami", 25.7617, -80.1918),
    ("Dallas", 32.7767, -96.7970),
];

const ROUTE_WAYPOINTS: usize = 8;
const JITTER_DEGREES: f64 = 0.3;

pub struct ShipmentGenerator {
    rng: StdRng,
    with_routes: bool,
}

impl ShipmentGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            with_routes: false,
        }
    }

    /// Also attach a jittered encoded route to every shipment.
    pub fn with_routes(mut self) -> Self {
        self.with_routes = true;
        self
    }

    pub fn city_name(coordinates: Coordinates) -> Option<&'static str> {
        CITIES
            .iter()
            .find(|(_, lat, lng)| *lat == coordinates.latitude && *lng == coordinates.longitude)
            .map(|(name, _, _)| *name)
    }

    pub fn generate(&mut self, count: usize) -> Vec<Shipment> {
        (0..count).map(|_| self.next_shipment()).collect()
    }

    fn next_shipment(&mut self) -> Shipment {
        let origin_index = self.rng.gen_range(0..CITIES.len());
        let mut destination_index = self.rng.gen_range(0..CITIES.len() - 1);
        if destination_index >= origin_index {
            destination_index += 1;
        }

        let (_, lat, lng) = CITIES[origin_index];
        let origin = Coordinates::new(lat, lng);
        let (_, lat, lng) = CITIES[destination_index];
        let destination = Coordinates::new(lat, lng);

        let number = format!("SHP-{:06}", self.rng.gen_range(0..1_000_000));
        let mut shipment = Shipment::new(number, origin, destination);
        shipment.id = Builder::from_random_bytes(self.rng.gen()).into_uuid();

        if self.with_routes {
            let line = self.jittered_line(origin, destination);
            shipment = shipment.with_route_polyline(polyline::encode(&line));
        }

        shipment
    }

    fn jittered_line(&mut self, origin: Coordinates, destination: Coordinates) -> LineString<f64> {
        let coords: Vec<Coord<f64>> = (0..ROUTE_WAYPOINTS)
            .map(|i| {
                let t = i as f64 / (ROUTE_WAYPOINTS - 1) as f64;
                let mut point = origin.lerp(&destination, t);

                if i != 0 && i != ROUTE_WAYPOINTS - 1 {
                    let dlat: f64 = StandardNormal.sample(&mut self.rng);
                    let dlng: f64 = StandardNormal.sample(&mut self.rng);
                    point.latitude += dlat * JITTER_DEGREES;
                    point.longitude += dlng * JITTER_DEGREES;
                }

                point.into()
            })
            .collect();

        LineString::new(coords)
    }
}
