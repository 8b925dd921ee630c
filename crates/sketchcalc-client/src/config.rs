//! Client configuration.

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ClientConfig::api_url`].
pub const API_URL_ENV: &str = "SKETCHCALC_API_URL";

/// Service used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8900";

/// Settings for talking to the recognition service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL; requests go to `{api_url}/calculate`.
    pub api_url: String,
    /// Longest side of the submitted image, in pixels.
    pub max_image_dimension: u32,
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            max_image_dimension: 1024,
            jpeg_quality: 80,
        }
    }
}

impl ClientConfig {
    /// Defaults, with the API URL taken from `SKETCHCALC_API_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => config.api_url = url.trim().to_string(),
            _ => log::debug!("{} not set, using {}", API_URL_ENV, config.api_url),
        }
        config
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Full URL of the calculate endpoint.
    pub fn calculate_url(&self) -> String {
        format!("{}/calculate", self.api_url.trim_end_matches('/'))
    }
}
