//! Cache keys for weather requests.
//!
//! Coordinates are rounded to three decimals (~110 m) so nearby requests
//! share one cached payload.

use std::fmt;

const SEPARATOR: char = '|';

/// Deterministic cache key: `lat|lon|units|lang`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(latitude: f64, longitude: f64, units: &str, lang: &str) -> Self {
        Self(format!(
            "{lat}{sep}{lon}{sep}{units}{sep}{lang}",
            lat = round_coordinate(latitude),
            lon = round_coordinate(longitude),
            sep = SEPARATOR,
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Round to three decimals. Adding 0.0 folds -0.0 into 0.0 so `-0.0001`
/// and `0.0001` share a key.
fn round_coordinate(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0 + 0.0;
    format!("{:.3}", rounded)
}
