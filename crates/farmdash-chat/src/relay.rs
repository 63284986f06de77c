//! Chat relay: prompt in, single reply out.

use farmdash_core::ChatConfig;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::GeminiClient;
use crate::error::ChatError;
use crate::extract::extract_reply;
use crate::prompt::{build_prompt, ChatRequest};

/// Body returned by `POST /api/gemini-chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Clone)]
pub struct ChatRelay {
    client: GeminiClient,
}

impl ChatRelay {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        Ok(Self {
            client: GeminiClient::new(config)?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    /// Relay one message. Stateless: no history is kept between calls.
    #[instrument(skip(self, request), fields(crop = ?request.crop), level = "info")]
    pub async fn reply(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        if !self.client.is_configured() {
            tracing::warn!("Chat requested without a Gemini API key");
            return Err(ChatError::MissingApiKey);
        }

        let prompt = build_prompt(request);
        let response = self.client.generate(&prompt).await?;

        Ok(ChatReply {
            reply: extract_reply(&response),
        })
    }
}
