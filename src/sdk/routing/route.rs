use super::coord::{Coordinate, RoutePolyline};
use super::error::RoutingError;
use super::service::MapProvider;

/// Orders the waypoints as `[reference, d1, d2, ...]`.
pub fn build_waypoints(
    reference: Option<Coordinate>,
    destinations: &[Coordinate],
) -> Result<Vec<Coordinate>, RoutingError> {
    let reference = reference.ok_or(RoutingError::MissingReference)?;
    if destinations.is_empty() {
        return Err(RoutingError::NoDestinations);
    }

    let mut waypoints = Vec::with_capacity(destinations.len() + 1);
    waypoints.push(reference);
    waypoints.extend_from_slice(destinations);
    Ok(waypoints)
}

/// `lon,lat` pairs joined with `;`.
pub fn waypoint_path(waypoints: &[Coordinate]) -> String {
    waypoints
        .iter()
        .map(Coordinate::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

pub async fn assemble_route<P: MapProvider>(
    provider: &P,
    reference: Option<Coordinate>,
    destinations: &[Coordinate],
) -> Result<RoutePolyline, RoutingError> {
    let waypoints = build_waypoints(reference, destinations)?;
    log::info!("Requesting route through {} waypoints", waypoints.len());

    let polyline = provider.directions(&waypoints).await?;
    log::debug!("Route geometry has {} points", polyline.len());
    Ok(polyline)
}
