//! Prompt assembly for the farm assistant.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed instructions placed before any context.
pub const SYSTEM_PREAMBLE: &str = "You are FarmDash, a practical agronomy assistant. \
Answer the farmer's question concisely and use the context below when it is relevant.";

const SEPARATOR: &str = "\n";

/// Weather fields summarized by name, in output order.
const WEATHER_FIELDS: &[(&str, &str)] = &[
    ("description", ""),
    ("temp", "temp "),
    ("humidity", "humidity "),
    ("wind", "wind "),
];

/// Body of `POST /api/gemini-chat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
    pub crop: Option<String>,
    pub coords: Option<Coords>,
    /// Weather summary as shown in the dashboard; any JSON shape is accepted.
    pub weather: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lon: f64,
}

/// Build the prompt: preamble, present context lines, then the user's message.
pub fn build_prompt(request: &ChatRequest) -> String {
    let mut lines = vec![SYSTEM_PREAMBLE.to_string()];

    if let Some(crop) = request.crop.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        lines.push(format!("Crop: {}", crop));
    }

    if let Some(coords) = request.coords {
        lines.push(format!("Coords: {},{}", coords.lat, coords.lon));
    }

    if let Some(summary) = request.weather.as_ref().and_then(summarize_weather) {
        lines.push(format!("Weather: {}", summary));
    }

    lines.push(format!("User: {}", request.message));
    lines.join(SEPARATOR)
}

/// Short weather description, or `None` when there is nothing to say.
fn summarize_weather(weather: &Value) -> Option<String> {
    match weather {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Object(map) if map.is_empty() => None,
        Value::Object(map) => {
            let known: Vec<String> = WEATHER_FIELDS
                .iter()
                .filter_map(|(key, label)| {
                    map.get(*key)
                        .and_then(scalar)
                        .map(|value| format!("{}{}", label, value))
                })
                .collect();

            if known.is_empty() {
                Some(weather.to_string())
            } else {
                Some(known.join(", "))
            }
        }
        other => Some(other.to_string()),
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
