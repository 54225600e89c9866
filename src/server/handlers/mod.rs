pub mod journey;
pub mod shipments;
