//! Reply extraction from Gemini responses.
//!
//! The reply text has lived in different places across API and SDK
//! versions. Each known location is a strategy; they run in order and the
//! first non-empty text wins.

use serde_json::Value;

/// Returned when no strategy finds any text.
pub const FALLBACK_REPLY: &str = "No reply.";

/// Pull reply text out of a raw response body.
pub type ExtractStrategy = fn(&Value) -> Option<String>;

/// Strategies in the order they are tried.
pub const STRATEGIES: &[(&str, ExtractStrategy)] = &[
    ("text", top_level_text),
    ("response.text", response_text),
    ("candidates", candidate_parts),
    ("response.candidates", response_candidate_parts),
];

/// First non-empty reply found by [`STRATEGIES`], else [`FALLBACK_REPLY`].
pub fn extract_reply(response: &Value) -> String {
    for (name, strategy) in STRATEGIES {
        if let Some(text) = strategy(response).filter(|t| !t.trim().is_empty()) {
            tracing::debug!(strategy = name, "Extracted chat reply");
            return text;
        }
    }

    tracing::warn!("No reply text found in Gemini response");
    FALLBACK_REPLY.to_string()
}

fn top_level_text(response: &Value) -> Option<String> {
    response.get("text")?.as_str().map(str::to_string)
}

fn response_text(response: &Value) -> Option<String> {
    top_level_text(response.get("response")?)
}

fn candidate_parts(response: &Value) -> Option<String> {
    let parts = response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    Some(text)
}

fn response_candidate_parts(response: &Value) -> Option<String> {
    candidate_parts(response.get("response")?)
}
