use super::coord::{Coordinate, RoutePolyline};
use super::error::RoutingError;

#[allow(async_fn_in_trait)]
pub trait MapProvider {
    /// Geocodes a free-text query to the coordinate of its best match.
    async fn geocode(&self, query: &str) -> Result<Coordinate, RoutingError>;

    /// Gets the driving route geometry through the waypoints, in order.
    async fn directions(&self, waypoints: &[Coordinate]) -> Result<RoutePolyline, RoutingError>;
}
