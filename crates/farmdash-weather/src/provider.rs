//! OpenWeather current-conditions client.

use farmdash_core::WeatherConfig;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::types::{WeatherError, WeatherQuery};

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
        })
    }

    /// Whether an API key is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch current conditions. One request, no retries.
    ///
    /// # Errors
    /// `MissingApiKey` without a key, `Upstream` with the verbatim body on a
    /// non-success status, `Network`/`Parse` on transport or decoding failures.
    /// Transport errors are stripped of the request URL.
    #[instrument(skip(self), fields(lat = query.latitude, lon = query.longitude), level = "debug")]
    pub async fn fetch(&self, query: &WeatherQuery) -> Result<Value, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);
        let lat = query.latitude.to_string();
        let lon = query.longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", query.units.as_str()),
                ("lang", query.lang.as_str()),
                ("appid", api_key),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::warn!("Failed to read weather error body: {}", e.without_url());
                String::new()
            });
            tracing::warn!("Weather API returned status {}", status);
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| WeatherError::Parse(e.without_url().to_string()))
    }
}
