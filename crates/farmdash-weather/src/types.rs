use std::collections::HashMap;

use farmdash_core::{AppError, NetworkError, ReqwestErrorExt};
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

/// Unit system used when the caller does not pick one.
pub const DEFAULT_UNITS: &str = "metric";

/// Language used when the caller does not pick one.
pub const DEFAULT_LANG: &str = "en";

/// Cache hint sent with every successful weather reply.
pub const CACHE_CONTROL: &str = "public, max-age=30, stale-while-revalidate=120";

/// A parsed `/api/weather` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub units: String,
    pub lang: String,
}

impl WeatherQuery {
    /// Query with default units and language.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            units: DEFAULT_UNITS.to_string(),
            lang: DEFAULT_LANG.to_string(),
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Parse raw query-string parameters (`lat`, `lon`, `units`, `lang`).
    ///
    /// # Errors
    /// `MissingCoordinates` when `lat` or `lon` is absent or blank,
    /// `InvalidCoordinate` when either is not a finite number.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, WeatherError> {
        let present = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let (Some(lat), Some(lon)) = (present("lat"), present("lon")) else {
            return Err(WeatherError::MissingCoordinates);
        };

        let query = Self::new(parse_coordinate("lat", lat)?, parse_coordinate("lon", lon)?);
        let query = match present("units") {
            Some(units) => query.with_units(units),
            None => query,
        };
        Ok(match present("lang") {
            Some(lang) => query.with_lang(lang),
            None => query,
        })
    }

    /// Cache key for this query.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.latitude, self.longitude, &self.units, &self.lang)
    }
}

fn parse_coordinate(field: &'static str, raw: &str) -> Result<f64, WeatherError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(WeatherError::InvalidCoordinate {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Whether a reply was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value for the `X-Cache` response header.
    pub fn as_header(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

/// Upstream weather payload plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReply {
    pub payload: serde_json::Value,
    pub cache_status: CacheStatus,
}

impl WeatherReply {
    pub fn cache_control(&self) -> &'static str {
        CACHE_CONTROL
    }
}

/// Weather proxy errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("lat and lon query parameters are required")]
    MissingCoordinates,
    #[error("{field} must be a number, got: {value}")]
    InvalidCoordinate { field: &'static str, value: String },
    #[error("Missing required setting: OPENWEATHER_API_KEY")]
    MissingApiKey,
    #[error("Weather API returned status {status}")]
    Upstream { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<WeatherError> for AppError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::MissingCoordinates | WeatherError::InvalidCoordinate { .. } => {
                AppError::invalid_input(err.to_string())
            }
            WeatherError::MissingApiKey => AppError::missing_setting("OPENWEATHER_API_KEY"),
            WeatherError::Upstream { status, body } => AppError::Upstream {
                service: "weather",
                status,
                body,
            },
            WeatherError::Network(e) => AppError::Network(e.into_network_error()),
            WeatherError::Parse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
        }
    }
}
