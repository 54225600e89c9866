//! Route geometry: fallback synthesis, densification and interpolation.
//!
//! Positions are interpolated over the *point index* of a path, not its arc
//! length, so apparent speed follows point density. Coordinates are blended
//! independently on latitude and longitude (equirectangular approximation).

pub mod polyline;

use std::f64::consts::PI;

use crate::entities::Coordinates;

/// Lateral bulge of a synthetic route, relative to the endpoint separation.
pub const FALLBACK_CURVE_AMPLITUDE: f64 = 0.1;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Synthesizes a gently curved path between two points for when no real
/// road geometry is available. Always returns at least 2 points, starting at
/// `origin` and ending at `destination` exactly.
pub fn fallback_path(
    origin: Coordinates,
    destination: Coordinates,
    points: usize,
) -> Vec<Coordinates> {
    let points = points.max(2);
    let delta_lat = destination.latitude - origin.latitude;
    let delta_lng = destination.longitude - origin.longitude;

    let mut path: Vec<Coordinates> = (0..points)
        .map(|i| {
            let t = i as f64 / (points - 1) as f64;
            let offset = (t * PI).sin() * FALLBACK_CURVE_AMPLITUDE;

            Coordinates {
                latitude: origin.latitude + delta_lat * t + offset * delta_lng,
                longitude: origin.longitude + delta_lng * t - offset * delta_lat,
            }
        })
        .collect();

    path[0] = origin;
    path[points - 1] = destination;

    path
}

/// Interpolates `target` evenly indexed points along `path`. Paths that are
/// already at least `target` long, or too short to interpolate, come back
/// unchanged.
pub fn densify(path: &[Coordinates], target: usize) -> Vec<Coordinates> {
    if path.len() < 2 || path.len() >= target {
        return path.to_vec();
    }

    let last = path.len() - 1;
    let mut dense: Vec<Coordinates> = (0..target)
        .map(|i| {
            let idx = i as f64 / (target - 1) as f64 * last as f64;
            at_index(path, idx)
        })
        .collect();

    dense[0] = path[0];
    dense[target - 1] = path[last];

    dense
}

/// Position `progress` percent of the way through `path`'s index range.
pub fn position_at_progress(path: &[Coordinates], progress: f64) -> Option<Coordinates> {
    let first = *path.first()?;
    let last = *path.last()?;

    // NaN falls through to the origin as well
    if !(progress > 0.0) {
        return Some(first);
    }
    if progress >= 100.0 {
        return Some(last);
    }

    let idx = progress / 100.0 * (path.len() - 1) as f64;
    Some(at_index(path, idx))
}

fn at_index(path: &[Coordinates], idx: f64) -> Coordinates {
    let last = path.len() - 1;
    let lower = (idx.floor() as usize).min(last);
    let upper = (lower + 1).min(last);
    let fraction = idx - lower as f64;

    path[lower].lerp(&path[upper], fraction)
}

/// Great-circle distance between two points.
pub fn haversine_distance(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

pub fn path_length(path: &[Coordinates]) -> f64 {
    path.windows(2)
        .map(|pair| haversine_distance(pair[0], pair[1]))
        .sum()
}
