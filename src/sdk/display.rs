// Display data handed to the map-rendering surface, serialized as GeoJSON
use serde::Serialize;
use serde_json::{json, Value};
use std::{fs, path::Path};

use super::routing::{Coordinate, RoutePolyline, RoutingError};
use super::session::AppState;

pub const REFERENCE_LABEL: &str = "Ref Location";
pub const DEFAULT_ZOOM: f64 = 9.0;
pub const DEFAULT_STYLE: &str = "mapbox://styles/mapbox/streets-v11";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Camera {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub style: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct LineStyle {
    pub line_join: String,
    pub line_cap: String,
    pub line_color: String,
    pub line_width: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            line_join: "round".to_string(),
            line_cap: "round".to_string(),
            line_color: "#FF0000".to_string(),
            line_width: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMarker {
    pub coordinate: Coordinate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub markers: Vec<Coordinate>,
    pub reference: Option<ReferenceMarker>,
    pub route: Option<RoutePolyline>,
    pub line_style: LineStyle,
    pub camera: Camera,
}

impl MapView {
    /// `None` until at least one destination has resolved; the camera is
    /// centered on the first one.
    pub fn from_state(state: &AppState) -> Option<Self> {
        let first = state.destinations().first()?;

        Some(Self {
            markers: state.destinations().to_vec(),
            reference: state.reference().map(|coordinate| ReferenceMarker {
                coordinate,
                label: REFERENCE_LABEL.to_string(),
            }),
            route: state.route().filter(|r| !r.is_empty()).cloned(),
            line_style: LineStyle::default(),
            camera: Camera {
                longitude: first.longitude,
                latitude: first.latitude,
                zoom: DEFAULT_ZOOM,
                style: DEFAULT_STYLE.to_string(),
            },
        })
    }

    pub fn to_geojson(&self) -> Value {
        let mut features: Vec<Value> = self
            .markers
            .iter()
            .enumerate()
            .map(|(index, coord)| {
                json!({
                    "type": "Feature",
                    "properties": { "role": "destination", "index": index },
                    "geometry": { "type": "Point", "coordinates": coord.as_pair() },
                })
            })
            .collect();

        if let Some(reference) = &self.reference {
            features.push(json!({
                "type": "Feature",
                "properties": { "role": "reference", "label": reference.label },
                "geometry": { "type": "Point", "coordinates": reference.coordinate.as_pair() },
            }));
        }

        if let Some(route) = &self.route {
            let style = &self.line_style;
            features.push(json!({
                "type": "Feature",
                "properties": {
                    "role": "route",
                    "layout": { "line-join": style.line_join, "line-cap": style.line_cap },
                    "paint": { "line-color": style.line_color, "line-width": style.line_width },
                },
                "geometry": { "type": "LineString", "coordinates": route },
            }));
        }

        json!({
            "type": "FeatureCollection",
            "camera": self.camera,
            "features": features,
        })
    }

    pub fn write_geojson<P: AsRef<Path>>(&self, path: P) -> Result<(), RoutingError> {
        let data = serde_json::to_string_pretty(&self.to_geojson())?;
        fs::write(path, data)?;
        Ok(())
    }
}
