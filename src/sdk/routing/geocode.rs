use super::coord::Coordinate;
use super::error::RoutingError;
use super::service::MapProvider;
use futures_util::future::join_all;

/// Trims the query, returning `None` when nothing is left to look up.
pub fn normalize_query(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Resolves one address. Empty input fails with `EmptyQuery` without
/// touching the provider.
pub async fn resolve_address<P: MapProvider>(
    provider: &P,
    address: &str,
) -> Result<Coordinate, RoutingError> {
    let query = normalize_query(address).ok_or(RoutingError::EmptyQuery)?;
    provider.geocode(query).await
}

/// Resolves every address concurrently and returns the successes in input
/// order. Failed lookups are logged and dropped.
pub async fn resolve_addresses<P, S>(provider: &P, addresses: &[S]) -> Vec<Coordinate>
where
    P: MapProvider,
    S: AsRef<str>,
{
    let lookups = addresses
        .iter()
        .map(|address| resolve_address(provider, address.as_ref()));
    let results = join_all(lookups).await;

    let mut resolved = Vec::with_capacity(results.len());
    for (address, result) in addresses.iter().zip(results) {
        match result {
            Ok(coord) => resolved.push(coord),
            Err(RoutingError::EmptyQuery) => {
                log::debug!("Skipping empty address");
            }
            Err(err) => {
                log::warn!("Dropping address \"{}\": {}", address.as_ref(), err);
            }
        }
    }

    log::info!(
        "Resolved {} of {} addresses",
        resolved.len(),
        addresses.len()
    );
    resolved
}
