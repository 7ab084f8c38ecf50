use serde::Deserialize;

// --- Data Structures for parsing Mapbox responses ---

#[derive(Deserialize, Debug)]
pub struct GeoResponse {
    pub features: Vec<Feature>,
}
#[derive(Deserialize, Debug)]
pub struct Feature {
    pub center: [f64; 2],
    #[serde(default)]
    pub place_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct DirectionsResponse {
    pub routes: Vec<Route>,
}
#[derive(Deserialize, Debug)]
pub struct Route {
    pub geometry: Geometry,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
}
#[derive(Deserialize, Debug)]
pub struct Geometry {
    pub coordinates: Vec<[f64; 2]>,
}
