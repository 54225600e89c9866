use std::sync::{Arc, Mutex};
use std::time::Duration;

use waypoint::api::JourneyAPI;
use waypoint::config::JourneyConfig;
use waypoint::engine::{JourneyEngine, Phase, UpdateCallback};
use waypoint::entities::{Coordinates, PositionUpdate, Shipment, Status};
use waypoint::external::{google_maps::GoogleMaps, RouteService};

const LOS_ANGELES: Coordinates = Coordinates {
    latitude: 34.0522,
    longitude: -118.2437,
};

const CHICAGO: Coordinates = Coordinates {
    latitude: 41.8781,
    longitude: -87.6298,
};

fn engine() -> JourneyEngine {
    let routes = RouteService::new(Arc::new(GoogleMaps::new(None, None).unwrap()));
    JourneyEngine::new(JourneyConfig::default(), Arc::new(routes))
}

#[tokio::test(start_paused = true)]
async fn los_angeles_to_chicago_in_sixty_ticks() {
    let engine = engine();
    let updates: Arc<Mutex<Vec<PositionUpdate>>> = Arc::new(Mutex::new(vec![]));
    let sink = updates.clone();
    let callback: UpdateCallback = Arc::new(move |batch: Vec<PositionUpdate>| {
        assert_eq!(batch.len(), 1);
        sink.lock().unwrap().extend(batch);
    });

    let shipment = Shipment::new("SHP-000060".into(), LOS_ANGELES, CHICAGO);
    engine
        .initialize_journey(vec![shipment], callback)
        .await
        .unwrap();
    engine.start();

    tokio::time::sleep(Duration::from_secs(90)).await;

    let updates = updates.lock().unwrap();
    assert_eq!(updates.len(), 60);

    let first = &updates[0];
    assert!((first.progress_percentage - 100.0 / 60.0).abs() < 1e-9);
    assert_eq!(first.status, Status::InTransit);

    for pair in updates.windows(2) {
        let step = pair[1].progress_percentage - pair[0].progress_percentage;
        assert!(step >= 0.0);
        assert!(step < 1.7);
        // heading north-east the whole way along the fallback curve's index
        assert!(pair[1].longitude > pair[0].longitude);
    }

    let last = updates.last().unwrap();
    assert_eq!(last.progress_percentage, 100.0);
    assert_eq!(last.status, Status::Delivered);
    assert_eq!(last.latitude, CHICAGO.latitude);
    assert_eq!(last.longitude, CHICAGO.longitude);

    assert_eq!(engine.phase(), Phase::Completed);
    assert!(!engine.journey_status().unwrap().is_running);
}

#[tokio::test(start_paused = true)]
async fn destroy_then_reinitialize() {
    let engine = engine();
    let noop: UpdateCallback = Arc::new(|_: Vec<PositionUpdate>| {});

    engine
        .initialize_journey(
            vec![Shipment::new("SHP-000001".into(), LOS_ANGELES, CHICAGO)],
            noop.clone(),
        )
        .await
        .unwrap();
    engine.start();
    tokio::time::sleep(Duration::from_secs(3)).await;

    engine.destroy();
    engine.destroy();
    assert_eq!(engine.phase(), Phase::Idle);

    engine
        .initialize_journey(
            vec![Shipment::new("SHP-000002".into(), CHICAGO, LOS_ANGELES)],
            noop,
        )
        .await
        .unwrap();

    let status = engine.journey_status().unwrap();
    assert_eq!(status.progress, 0.0);
    assert_eq!(status.current_speed, 1.0);
    assert_eq!(engine.phase(), Phase::Ready);
}
