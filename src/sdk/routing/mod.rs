pub mod coord;
pub mod error;
pub mod geocode;
pub mod provider;
pub mod route;
pub mod service;

#[cfg(test)]
pub(crate) mod fakes;

pub use coord::{Coordinate, RoutePolyline};
pub use error::RoutingError;
pub use geocode::{normalize_query, resolve_address, resolve_addresses};
pub use provider::MapboxProvider;
pub use route::{assemble_route, build_waypoints, waypoint_path};
pub use service::MapProvider;
