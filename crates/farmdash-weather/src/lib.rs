//! Weather proxy for FarmDash
//!
//! Serves current conditions from OpenWeather through a short-lived,
//! fingerprint-keyed cache.

pub mod cache;
pub mod fingerprint;
pub mod provider;
pub mod proxy;
pub mod types;

pub use cache::{CacheEntry, CacheStore, Clock, InMemoryCacheStore, ManualClock, SystemClock};
pub use fingerprint::Fingerprint;
pub use provider::WeatherProvider;
pub use proxy::WeatherProxy;
pub use types::*;
