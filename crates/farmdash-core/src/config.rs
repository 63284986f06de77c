use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "FARMDASH_CONFIG";

/// Prefix for layered environment overrides (`FARMDASH__SERVER__PORT`).
const ENV_PREFIX: &str = "FARMDASH";

/// Conventional environment variables read on top of every other source.
pub const PORT_ENV: &str = "PORT";
pub const WEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const CHAT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Weather proxy settings
    pub weather: WeatherConfig,

    /// Chat relay settings
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind (IP address)
    pub host: String,

    /// Listening port
    pub port: u16,

    /// Origins allowed to call the API from a browser. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid server host: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeather API key; the weather endpoint reports a configuration error without it
    pub api_key: Option<String>,

    /// Upstream base URL
    pub base_url: String,

    /// Server-side freshness window for cached payloads, in milliseconds
    pub cache_ttl_ms: u64,

    /// Maximum number of cached fingerprints
    pub cache_capacity: u64,

    /// Upstream request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org".to_string(),
            cache_ttl_ms: 60_000,
            cache_capacity: 1_000,
            timeout_secs: 10,
        }
    }
}

impl WeatherConfig {
    /// Check if an API key is configured (not empty)
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Gemini API key; the chat endpoint reports a configuration error without it
    pub api_key: Option<String>,

    /// Upstream base URL
    pub base_url: String,

    /// Model used for every chat request
    pub model: String,

    /// Upstream request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ChatConfig {
    /// Check if an API key is configured (not empty)
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the default file location and the process environment.
    ///
    /// A missing config file is not an error; defaults apply.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load configuration from an optional TOML file, `FARMDASH__*` variables and
    /// the conventional variables resolved through `lookup`.
    pub fn load_from<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            tracing::debug!("Reading config file {}", path.display());
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins"),
            )
            .build()
            .context("Failed to read configuration")?;

        let mut config: Config = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;

        config.apply_env_overrides(lookup)?;
        Ok(config)
    }

    /// Apply the conventional environment variables (`PORT`, API keys, origins).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got: {}", PORT_ENV, port))?;
        }

        if let Some(key) = lookup(WEATHER_API_KEY_ENV) {
            self.weather.api_key = Some(key);
        }

        if let Some(key) = lookup(CHAT_API_KEY_ENV) {
            self.chat.api_key = Some(key);
        }

        if let Some(origins) = lookup(ALLOWED_ORIGINS_ENV) {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(())
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        if self.server.host.parse::<IpAddr>().is_err() {
            result.add_error(
                "server.host",
                format!("Host must be an IP address, got: {}", self.server.host),
            );
        }

        for origin in &self.server.allowed_origins {
            self.validate_url(origin, "server.allowed_origins", &mut result);
        }

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(&self.chat.base_url, "chat.base_url", &mut result);

        if self.weather.cache_ttl_ms == 0 {
            result.add_error("weather.cache_ttl_ms", "Cache TTL must be greater than 0");
        }

        if self.weather.cache_capacity == 0 {
            result.add_error(
                "weather.cache_capacity",
                "Cache capacity must be greater than 0",
            );
        }

        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        }

        if self.chat.timeout_secs == 0 {
            result.add_error("chat.timeout_secs", "Timeout must be greater than 0");
        }

        if self.chat.model.trim().is_empty() {
            result.add_error("chat.model", "Model name cannot be empty");
        }

        // Missing keys only disable the dependent endpoint
        if !self.weather.is_configured() {
            result.add_warning(
                "weather.api_key",
                format!("{} not set - /api/weather will be unavailable", WEATHER_API_KEY_ENV),
            );
        }

        if !self.chat.is_configured() {
            result.add_warning(
                "chat.api_key",
                format!("{} not set - /api/gemini-chat will be unavailable", CHAT_API_KEY_ENV),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL '{}': {}", url_str, e));
            }
        }
    }

    /// Get the path to the configuration file
    fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        dirs::config_dir().map(|dir| dir.join("farmdash").join("config.toml"))
    }
}
