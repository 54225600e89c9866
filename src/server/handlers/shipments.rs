use axum::extract::{Json, Query};
use serde::{Deserialize, Serialize};

use crate::entities::Shipment;
use crate::generator::ShipmentGenerator;

const MAX_DEMO_SHIPMENTS: usize = 100;

#[derive(Serialize, Deserialize)]
pub struct DemoParams {
    seed: Option<u64>,
    count: Option<usize>,
    routes: Option<bool>,
}

pub async fn demo(Query(params): Query<DemoParams>) -> Json<Vec<Shipment>> {
    let count = params.count.unwrap_or(10).min(MAX_DEMO_SHIPMENTS);

    let mut generator = ShipmentGenerator::new(params.seed.unwrap_or_default());
    if params.routes.unwrap_or(false) {
        generator = generator.with_routes();
    }

    generator.generate(count).into()
}
