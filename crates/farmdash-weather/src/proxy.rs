//! Cache-fronted weather lookups.

use std::sync::Arc;
use std::time::Duration;

use farmdash_core::WeatherConfig;
use tracing::instrument;

use crate::cache::{CacheStore, Clock, InMemoryCacheStore, SystemClock};
use crate::provider::WeatherProvider;
use crate::types::{CacheStatus, WeatherError, WeatherQuery, WeatherReply};

/// Serves weather payloads from the cache while fresh, otherwise from upstream.
///
/// Check-then-fetch-then-store is not atomic: two concurrent misses on the
/// same fingerprint both go upstream and the later write wins.
pub struct WeatherProxy {
    provider: WeatherProvider,
    cache: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl WeatherProxy {
    /// Proxy with an in-memory cache sized and timed from `config`.
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`new`](Self::new) but with an explicit clock for timestamps and freshness.
    pub fn with_clock(config: &WeatherConfig, clock: Arc<dyn Clock>) -> Result<Self, WeatherError> {
        let cache = Arc::new(InMemoryCacheStore::with_clock(
            config.cache_capacity,
            clock.clone(),
        ));
        Ok(Self::with_parts(
            WeatherProvider::new(config)?,
            cache,
            clock,
            config.cache_ttl(),
        ))
    }

    /// Assemble from an arbitrary cache backend.
    pub fn with_parts(
        provider: WeatherProvider,
        cache: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            clock,
            ttl,
        }
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current weather for `query`.
    ///
    /// # Errors
    /// `MissingApiKey` before any cache or network access when unconfigured;
    /// upstream and transport errors from [`WeatherProvider::fetch`]. Failed
    /// fetches leave the cache untouched.
    #[instrument(skip(self), fields(fingerprint = tracing::field::Empty))]
    pub async fn current(&self, query: &WeatherQuery) -> Result<WeatherReply, WeatherError> {
        if !self.provider.is_configured() {
            return Err(WeatherError::MissingApiKey);
        }

        let fingerprint = query.fingerprint();
        tracing::Span::current().record("fingerprint", fingerprint.as_str());

        if let Some(entry) = self.cache.get(fingerprint.as_str()) {
            if entry.is_fresh(self.clock.now(), self.ttl) {
                tracing::debug!("Weather cache hit");
                return Ok(WeatherReply {
                    payload: entry.payload.clone(),
                    cache_status: CacheStatus::Hit,
                });
            }
            tracing::debug!("Weather cache entry stale, refreshing");
        } else {
            tracing::debug!("Weather cache miss");
        }

        let payload = self.provider.fetch(query).await?;
        self.cache.put(fingerprint.as_str(), payload.clone());

        Ok(WeatherReply {
            payload,
            cache_status: CacheStatus::Miss,
        })
    }
}
