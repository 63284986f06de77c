//! Chat-relay error types.

use farmdash_core::{AppError, NetworkError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Missing required setting: GEMINI_API_KEY")]
    MissingApiKey,

    #[error("Gemini API returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::MissingApiKey => AppError::missing_setting("GEMINI_API_KEY"),
            // Chat never forwards the upstream status; it is a plain server error.
            upstream @ ChatError::Upstream { .. } => AppError::Service(upstream.to_string()),
            ChatError::Network(e) => AppError::Network(e.into_network_error()),
            ChatError::Parse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
        }
    }
}
