mod location;
mod route;
mod shipment;
mod update;

pub use location::Coordinates;
pub use route::{Route, RouteSource};
pub use shipment::{Shipment, Status};
pub use update::{JourneyStatus, PositionUpdate};
