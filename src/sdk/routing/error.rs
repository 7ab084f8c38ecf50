use serde::Deserialize;
use thiserror::Error;

// Shape of the JSON error body returned by the Mapbox APIs
#[derive(Deserialize, Debug)]
pub struct MapboxErrorPayload {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("No geocode results for: {0}")]
    NoResults(String),

    #[error("No route found in directions response")]
    NoRoute,

    #[error("A route needs at least one destination")]
    NoDestinations,

    #[error("A route needs a reference location")]
    MissingReference,

    #[error("Too many waypoints: {found} (limit {limit})")]
    TooManyWaypoints { found: usize, limit: usize },

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("CSV has no `address` column")]
    MissingAddressColumn,

    // Structured error from the API
    #[error("API Error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    // Non-success response whose body isn't the expected JSON
    #[error("Unstructured API Error: {0}")]
    RawApiError(String),

    #[error("Underlying request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RoutingError {
    /// Builds the error for a non-success HTTP response, preferring the
    /// structured payload when the body carries one.
    pub fn from_response(status: u16, body: String) -> Self {
        match serde_json::from_str::<MapboxErrorPayload>(&body) {
            Ok(payload) => {
                let message = match payload.code {
                    Some(code) => format!("{} ({})", payload.message, code),
                    None => payload.message,
                };
                RoutingError::ApiError { status, message }
            }
            Err(_) => RoutingError::RawApiError(body),
        }
    }
}
