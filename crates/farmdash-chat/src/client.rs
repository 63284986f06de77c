//! Gemini `generateContent` client.

use farmdash_core::ChatConfig;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

use crate::error::ChatError;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            model: config.model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send one user turn and return the raw response body.
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()), level = "debug")]
    pub async fn generate(&self, prompt: &str) -> Result<Value, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::MissingApiKey)?;

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::warn!("Failed to read Gemini error body: {}", e);
                String::new()
            });
            tracing::warn!("Gemini API returned status {}", status);
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))
    }
}
