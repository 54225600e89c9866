use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::{
    entities::Coordinates,
    error::{invalid_input_error, provider_unavailable_error, upstream_error, Error},
    external::{ProviderRoute, RouteProvider},
};

/// Upper bound on a single Directions request, after which the journey
/// falls back to a synthetic route.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DirectionsRoute {
    overview_polyline: OverviewPolyline,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct OverviewPolyline {
    points: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Leg {
    distance: Option<Distance>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Distance {
    value: f64,
}

/// Directions API client. Credentials are read once at construction; a
/// client without them reports itself as not loaded.
#[derive(Clone, Debug)]
pub struct GoogleMaps {
    client: reqwest::Client,
    api_base: Option<String>,
    key: Option<String>,
}

impl GoogleMaps {
    pub fn new(api_base: Option<String>, key: Option<String>) -> Result<Self, Error> {
        Self::with_timeout(api_base, key, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        api_base: Option<String>,
        key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base,
            key,
        })
    }

    pub fn from_env() -> Result<Self, Error> {
        Self::new(
            env::var("GOOGLE_MAPS_API_BASE").ok(),
            env::var("GOOGLE_MAPS_API_KEY").ok(),
        )
    }
}

#[async_trait]
impl RouteProvider for GoogleMaps {
    fn is_loaded(&self) -> bool {
        self.api_base.is_some() && self.key.is_some()
    }

    #[tracing::instrument(skip(self))]
    async fn get_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<ProviderRoute, Error> {
        let api_base = self.api_base.as_ref().ok_or_else(provider_unavailable_error)?;
        let key = self.key.as_ref().ok_or_else(provider_unavailable_error)?;

        let url = format!("https://{}/maps/api/directions/json", api_base);
        let origin: String = origin.into();
        let destination: String = destination.into();

        let res = self
            .client
            .get(url)
            .query(&[("key", key)])
            .query(&[("origin", origin)])
            .query(&[("destination", destination)])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if (400..500).contains(&status_code) {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        let data: Response = res.json().await?;

        route_from_response(data)
    }
}

fn route_from_response(data: Response) -> Result<ProviderRoute, Error> {
    if data.status != "OK" {
        tracing::warn!("directions request returned status {}", data.status);
        return Err(upstream_error());
    }

    let route = data.routes.into_iter().next().ok_or_else(upstream_error)?;

    let distances: Vec<f64> = route
        .legs
        .iter()
        .filter_map(|leg| leg.distance.as_ref().map(|d| d.value))
        .collect();

    let distance_meters = if distances.is_empty() {
        None
    } else {
        Some(distances.iter().sum())
    };

    Ok(ProviderRoute {
        polyline: route.overview_polyline.points,
        distance_meters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<ProviderRoute, Error> {
        route_from_response(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn reads_overview_polyline_and_sums_legs() {
        let route = parse(json!({
            "status": "OK",
            "routes": [{
                "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC" },
                "legs": [
                    { "distance": { "value": 1200.0 } },
                    { "distance": { "value": 800.0 } }
                ]
            }]
        }))
        .unwrap();

        assert_eq!(route.polyline, "_p~iF~ps|U_ulLnnqC");
        assert_eq!(route.distance_meters, Some(2000.0));
    }

    #[test]
    fn missing_legs_leave_distance_unknown() {
        let route = parse(json!({
            "status": "OK",
            "routes": [{ "overview_polyline": { "points": "abc" } }]
        }))
        .unwrap();

        assert_eq!(route.distance_meters, None);
    }

    #[test]
    fn non_ok_status_is_upstream_error() {
        let err = parse(json!({ "status": "ZERO_RESULTS", "routes": [] })).unwrap_err();
        assert_eq!(err, upstream_error());

        let err = parse(json!({ "status": "OK", "routes": [] })).unwrap_err();
        assert_eq!(err, upstream_error());
    }

    #[test]
    fn client_without_credentials_is_not_loaded() {
        let maps = GoogleMaps::new(Some("maps.googleapis.com".into()), None).unwrap();
        assert!(!maps.is_loaded());

        let err = tokio_test::block_on(
            maps.get_route(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 1.0)),
        )
        .unwrap_err();
        assert_eq!(err, provider_unavailable_error());
    }

    #[tokio::test]
    async fn silent_upstream_times_out() {
        // accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = vec![];
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let maps = GoogleMaps::with_timeout(
            Some(addr.to_string()),
            Some("key".into()),
            Duration::from_millis(200),
        )
        .unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            maps.get_route(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 1.0)),
        )
        .await
        .expect("request should give up on its own");

        // the client gave up, so the error comes from reqwest rather than the status mapping
        assert_eq!(result.unwrap_err().code, 3);
    }
}
