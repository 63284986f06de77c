//! Shared state handed to every route.

use std::sync::Arc;

use anyhow::Result;
use farmdash_chat::ChatRelay;
use farmdash_core::Config;
use farmdash_services::{Crop, InMemoryStore, ResourceStore, Todo};
use farmdash_weather::WeatherProxy;

#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherProxy>,
    pub crops: Arc<dyn ResourceStore<Crop>>,
    pub todos: Arc<dyn ResourceStore<Todo>>,
    pub chat: Arc<ChatRelay>,
}

impl AppState {
    /// Build the weather proxy and chat relay from `config`, with empty
    /// in-memory collections.
    pub fn from_config(config: &Config) -> Result<Self> {
        let weather = WeatherProxy::new(&config.weather)?;
        let chat = ChatRelay::new(&config.chat)?;

        if !config.weather.is_configured() {
            tracing::warn!("OPENWEATHER_API_KEY not set; /api/weather will fail");
        }
        if !config.chat.is_configured() {
            tracing::warn!("GEMINI_API_KEY not set; /api/gemini-chat will fail");
        }

        Ok(Self::new(weather, chat))
    }

    pub fn new(weather: WeatherProxy, chat: ChatRelay) -> Self {
        Self {
            weather: Arc::new(weather),
            crops: Arc::new(InMemoryStore::<Crop>::new()),
            todos: Arc::new(InMemoryStore::<Todo>::new()),
            chat: Arc::new(chat),
        }
    }
}
