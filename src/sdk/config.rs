use crate::sdk::util::rate_limit::DEFAULT_REQUESTS_PER_MINUTE;
use anyhow::{Context, Result};
use std::env;
use std::num::NonZeroU32;

pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";
pub const DEFAULT_PROFILE: &str = "driving-traffic";

#[derive(Debug, Clone, PartialEq)]
pub struct MapboxConfig {
    pub access_token: String,
    pub base_url: String,
    pub profile: String,
    pub requests_per_minute: NonZeroU32,
}

impl MapboxConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            requests_per_minute: NonZeroU32::new(DEFAULT_REQUESTS_PER_MINUTE)
                .unwrap_or(NonZeroU32::MIN),
        }
    }

    /// Reads `MAPBOX_ACCESS_TOKEN` (required) plus the optional
    /// `MAPBOX_BASE_URL`, `MAPBOX_PROFILE` and `MAPBOX_REQUESTS_PER_MINUTE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("MAPBOX_ACCESS_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .context("MAPBOX_ACCESS_TOKEN is not set")?;
        let mut config = Self::new(token.trim());

        if let Some(base_url) = lookup("MAPBOX_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(profile) = lookup("MAPBOX_PROFILE") {
            config.profile = profile;
        }
        if let Some(raw) = lookup("MAPBOX_REQUESTS_PER_MINUTE") {
            config.requests_per_minute = raw
                .trim()
                .parse()
                .with_context(|| format!("MAPBOX_REQUESTS_PER_MINUTE must be a positive integer, got {raw:?}"))?;
        }
        Ok(config)
    }
}
