use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved geographic point. Longitude first, matching the order used by
/// the geocoding and directions payloads.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn as_pair(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

/// Renders as `lon,lat`, the waypoint form expected by the directions API.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.longitude, self.latitude)
    }
}

/// Route geometry exactly as returned by the directions service.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct RoutePolyline(pub Vec<[f64; 2]>);

impl RoutePolyline {
    pub fn points(&self) -> &[[f64; 2]] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
