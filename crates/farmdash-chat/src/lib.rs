//! Gemini-backed farm assistant.

pub mod client;
pub mod error;
pub mod extract;
pub mod prompt;
pub mod relay;

pub use client::GeminiClient;
pub use error::ChatError;
pub use extract::{extract_reply, ExtractStrategy, FALLBACK_REPLY, STRATEGIES};
pub use prompt::{build_prompt, ChatRequest, Coords, SYSTEM_PREAMBLE};
pub use relay::{ChatRelay, ChatReply};
