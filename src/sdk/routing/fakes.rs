//! In-memory `MapProvider` for tests.

use super::coord::{Coordinate, RoutePolyline};
use super::error::RoutingError;
use super::service::MapProvider;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeProvider {
    places: HashMap<String, Coordinate>,
    delays: HashMap<String, Duration>,
    routes: Mutex<VecDeque<Result<RoutePolyline, RoutingError>>>,
    pub geocode_calls: Mutex<Vec<String>>,
    pub directions_calls: Mutex<Vec<Vec<Coordinate>>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, query: &str, coord: Coordinate) -> Self {
        self.places.insert(query.to_string(), coord);
        self
    }

    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    /// Queues the outcome of the next directions call.
    pub fn with_route(self, outcome: Result<RoutePolyline, RoutingError>) -> Self {
        self.routes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn geocode_count(&self) -> usize {
        self.geocode_calls.lock().unwrap().len()
    }

    pub fn directions_count(&self) -> usize {
        self.directions_calls.lock().unwrap().len()
    }

    pub fn last_waypoints(&self) -> Option<Vec<Coordinate>> {
        self.directions_calls.lock().unwrap().last().cloned()
    }
}

impl MapProvider for FakeProvider {
    async fn geocode(&self, query: &str) -> Result<Coordinate, RoutingError> {
        self.geocode_calls.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        self.places
            .get(query)
            .copied()
            .ok_or_else(|| RoutingError::NoResults(query.to_string()))
    }

    async fn directions(&self, waypoints: &[Coordinate]) -> Result<RoutePolyline, RoutingError> {
        self.directions_calls.lock().unwrap().push(waypoints.to_vec());
        self.routes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(RoutingError::NoRoute))
    }
}
