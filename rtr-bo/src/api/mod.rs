//! HTTP API handlers for rtr-bo

pub mod caller;
pub mod deliveries;
pub mod health;
pub mod releases;
pub mod royalties;

pub use deliveries::delivery_routes;
pub use health::health_routes;
pub use releases::release_routes;
pub use royalties::royalty_routes;
