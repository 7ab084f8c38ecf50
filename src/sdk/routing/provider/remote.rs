use super::types::{DirectionsResponse, GeoResponse};
use crate::sdk::config::MapboxConfig;
use crate::sdk::routing::coord::{Coordinate, RoutePolyline};
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::route::waypoint_path;
use crate::sdk::routing::service::MapProvider;
use crate::sdk::util::rate_limit::RequestLimiter;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Hard limit on coordinates per directions request.
pub const MAX_WAYPOINTS: usize = 25;

// Same set as JavaScript's encodeURIComponent; `;` must not reach the
// geocoder raw, it separates batch queries.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub struct MapboxProvider {
    client: Client,
    access_token: String,
    base_url: Url,
    profile: String,
    limiter: RequestLimiter,
}

impl MapboxProvider {
    pub fn new(config: &MapboxConfig) -> Result<Self, RoutingError> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Self::with_client(config, client)
    }

    /// Same as `new` but with a caller-built HTTP client.
    pub fn with_client(config: &MapboxConfig, client: Client) -> Result<Self, RoutingError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| RoutingError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RoutingError::InvalidBaseUrl(config.base_url.clone()));
        }
        Ok(Self {
            client,
            access_token: config.access_token.clone(),
            base_url,
            profile: config.profile.clone(),
            limiter: RequestLimiter::per_minute(config.requests_per_minute),
        })
    }

    /// Appends an already-encoded `path` to the base URL's path.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", prefix, path));
        url
    }

    /// `{base}/geocoding/v5/mapbox.places/{query}.json`, the query
    /// percent-encoded as a single path segment.
    pub fn geocode_url(&self, query: &str) -> Url {
        let encoded = utf8_percent_encode(query, COMPONENT);
        let mut url = self.endpoint(&format!("geocoding/v5/mapbox.places/{}.json", encoded));
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token);
        url
    }

    pub fn directions_url(&self, waypoints: &[Coordinate]) -> Url {
        let profile = utf8_percent_encode(&self.profile, COMPONENT);
        let mut url = self.endpoint(&format!(
            "directions/v5/mapbox/{}/{}",
            profile,
            waypoint_path(waypoints)
        ));
        url.query_pairs_mut()
            .append_pair("geometries", "geojson")
            .append_pair("access_token", &self.access_token);
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, RoutingError> {
        self.limiter.acquire().await;

        let response = match self.client.get(url.clone()).send().await {
            Ok(resp) => resp,
            Err(e) => {
                // the URL carries the access token
                let e = e.without_url();
                log::error!("Failed to send {} request: {}", what, e);
                return Err(RoutingError::RequestError(e));
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|e| e.without_url())?;

        if !status.is_success() {
            log::debug!("{} returned HTTP {}: {}", what, status, text);
            return Err(RoutingError::from_response(status.as_u16(), text));
        }

        serde_json::from_str(&text).map_err(|e| {
            log::error!(
                "Failed to parse {} response. Path: {}\nError: {}. Body: {}",
                what,
                url.path(),
                e,
                text
            );
            RoutingError::ParseError(e)
        })
    }
}

impl MapProvider for MapboxProvider {
    async fn geocode(&self, query: &str) -> Result<Coordinate, RoutingError> {
        log::debug!("[PROVIDER] Calling geocode for: \"{}\"", query);
        let resp: GeoResponse = self.get_json(self.geocode_url(query), "geocode").await?;

        let feature = resp
            .features
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::NoResults(query.to_string()))?;
        if let Some(name) = &feature.place_name {
            log::debug!("[PROVIDER] \"{}\" matched \"{}\"", query, name);
        }
        Ok(Coordinate::from(feature.center))
    }

    async fn directions(&self, waypoints: &[Coordinate]) -> Result<RoutePolyline, RoutingError> {
        if waypoints.len() > MAX_WAYPOINTS {
            return Err(RoutingError::TooManyWaypoints {
                found: waypoints.len(),
                limit: MAX_WAYPOINTS,
            });
        }
        log::debug!(
            "[PROVIDER] Calling directions ({}) through {} waypoints",
            self.profile,
            waypoints.len()
        );
        let resp: DirectionsResponse = self
            .get_json(self.directions_url(waypoints), "directions")
            .await?;

        let route = resp.routes.into_iter().next().ok_or(RoutingError::NoRoute)?;
        if let (Some(distance), Some(duration)) = (route.distance, route.duration) {
            log::debug!(
                "[PROVIDER] Route is {:.1} km, {:.1} min",
                distance / 1000.0,
                duration / 60.0
            );
        }
        Ok(RoutePolyline(route.geometry.coordinates))
    }
}
