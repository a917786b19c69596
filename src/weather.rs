//! Upstream weather provider client (OpenWeatherMap-compatible API).
//!
//! One GET per lookup, no retry, no caching. Failures are surfaced to the
//! caller as-is.

use crate::units::UnitSystem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The slice of the upstream document we relay to callers. Everything else
/// in the provider response is dropped on re-serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub main: TempBlock,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempBlock {
    pub temp: f64,
}

/// Weather provider errors.
#[derive(Debug)]
pub enum WeatherError {
    Network(String),
    InvalidResponse(String),
}

impl fmt::Display for WeatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "weather provider unreachable: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "invalid weather provider response: {}", msg),
        }
    }
}

impl std::error::Error for WeatherError {}

/// Client for the upstream provider. Cheap to clone; read-only after startup.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch current conditions for a location in the given unit system.
    pub fn fetch(&self, location: &str, units: UnitSystem) -> Result<WeatherReport, WeatherError> {
        let url = self.request_url(location, units);

        let response = ureq::get(&url)
            .set("User-Agent", "weathervane/0.3")
            .call()
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let body = response
            .into_string()
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        decode_report(&body)
    }

    fn request_url(&self, location: &str, units: UnitSystem) -> String {
        format!(
            "{}/weather?q={}&appid={}&units={}",
            self.base_url,
            urlencode(location),
            self.api_key,
            units.as_str(),
        )
    }
}

/// Decode the upstream body, keeping the decoder's message on failure so the
/// caller sees what was malformed.
fn decode_report(body: &str) -> Result<WeatherReport, WeatherError> {
    serde_json::from_str(body).map_err(|e| WeatherError::InvalidResponse(e.to_string()))
}

// ─── URL encoding (minimal, no extra dep) ───────────────────────

// Percent-encodes per UTF-8 byte; locations are arbitrary caller input.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ if b.is_ascii_alphanumeric() => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn decode_well_formed_report() {
        let body = r#"{"main":{"temp":281.4,"humidity":82},"name":"London","cod":200}"#;
        let report = decode_report(body).unwrap();
        assert_relative_eq!(report.main.temp, 281.4);
        assert_eq!(report.name, "London");
    }

    #[test]
    fn decode_failure_carries_parser_message() {
        let err = decode_report("<html>502 Bad Gateway</html>").unwrap_err();
        match err {
            WeatherError::InvalidResponse(msg) => assert!(!msg.is_empty()),
            other => panic!("expected InvalidResponse, got {:?}", other),
        }
    }

    #[test]
    fn decode_rejects_missing_fields() {
        assert!(decode_report(r#"{"name":"London"}"#).is_err());
        assert!(decode_report(r#"{"main":{}}"#).is_err());
    }

    #[test]
    fn relay_shape_is_normalized() {
        let body = r#"{"main":{"temp":12.0,"pressure":1012},"name":"Oslo","wind":{"speed":3.1}}"#;
        let report = decode_report(body).unwrap();
        let relayed = serde_json::to_value(&report).unwrap();
        assert_eq!(
            relayed,
            serde_json::json!({"main": {"temp": 12.0}, "name": "Oslo"})
        );
    }

    #[test]
    fn request_url_carries_resolved_units() {
        let client = WeatherClient::new("https://api.example.org/data/2.5", "k3y");
        let url = client.request_url("London", UnitSystem::Imperial);
        assert_eq!(
            url,
            "https://api.example.org/data/2.5/weather?q=London&appid=k3y&units=imperial"
        );

        let url = client.request_url("New York", UnitSystem::Metric);
        assert!(url.contains("q=New%20York"));
        assert!(url.ends_with("units=metric"));
    }

    #[test]
    fn urlencode_emits_utf8_bytes() {
        assert_eq!(urlencode("Zürich"), "Z%C3%BCrich");
        assert_eq!(urlencode("北京"), "%E5%8C%97%E4%BA%AC");
        assert_eq!(urlencode("São Paulo"), "S%C3%A3o%20Paulo");
        assert_eq!(urlencode("London"), "London");
        assert_eq!(urlencode("a&b=c+d"), "a%26b%3Dc%2Bd");
    }
}
