//! Remote feature-flag evaluation.
//!
//! The flag service answers one question: for a given flag name and target
//! identity, is the flag on? How the answer reaches a request handler varies
//! (per-request call, background poll, or not at all) and is hidden behind
//! [`FlagSource`] so the unit resolution never has to care.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;

/// Flag name controlling the default unit system.
pub const UNIT_FLAG: &str = "default_imperial";

/// The identity a flag is evaluated against.
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub identifier: String,
    pub name: String,
    pub attributes: TargetAttributes,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Target {
    /// The fixed service identity, used when no caller identity is supplied
    /// and by the background poller.
    pub fn service() -> Self {
        Self {
            identifier: "weathervane".into(),
            name: "Weathervane".into(),
            attributes: TargetAttributes {
                location: Some("emea".into()),
            },
        }
    }

    /// A per-caller identity derived from request metadata.
    pub fn caller(identifier: impl Into<String>, location: Option<String>) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.clone(),
            identifier,
            attributes: TargetAttributes { location },
        }
    }
}

/// Flag service errors.
#[derive(Debug)]
pub enum FlagError {
    Network(String),
    InvalidResponse(String),
}

impl fmt::Display for FlagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "flag service unreachable: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "invalid flag service response: {}", msg),
        }
    }
}

impl std::error::Error for FlagError {}

#[derive(Debug, Serialize)]
struct EvaluateRequest<'a> {
    flag: &'a str,
    target: &'a Target,
}

#[derive(Debug, Deserialize)]
struct EvaluateResponse {
    value: bool,
}

/// Client for the flag-evaluation service.
#[derive(Debug, Clone)]
pub struct FlagClient {
    base_url: String,
    api_key: String,
}

impl FlagClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Evaluate a boolean flag for the given target.
    pub fn evaluate(&self, flag: &str, target: &Target) -> Result<bool, FlagError> {
        let url = format!("{}/client/eval", self.base_url);

        let response = ureq::post(&url)
            .set("x-api-key", &self.api_key)
            .set("User-Agent", "weathervane/0.3")
            .send_json(EvaluateRequest { flag, target })
            .map_err(|e| FlagError::Network(e.to_string()))?;

        let decoded: EvaluateResponse = response
            .into_json()
            .map_err(|e| FlagError::InvalidResponse(e.to_string()))?;

        Ok(decoded.value)
    }
}

/// Where a request handler gets its flag decision from.
pub enum FlagSource {
    /// No flag service wired in; every decision is absent.
    Disabled,
    /// One synchronous evaluation per lookup, against the given target.
    PerRequest(FlagClient),
    /// Most recent value published by the background poller. Possibly
    /// stale, never blocks the request.
    Polled(watch::Receiver<Option<bool>>),
}

impl FlagSource {
    /// Obtain the decision for one lookup, or `None` when there is none.
    ///
    /// A failed per-request evaluation is logged and degrades to "no
    /// decision" so the lookup falls through to the default unit system
    /// instead of failing.
    pub fn decision(&self, target: &Target) -> Option<bool> {
        match self {
            Self::Disabled => None,
            Self::PerRequest(client) => match client.evaluate(UNIT_FLAG, target) {
                Ok(value) => Some(value),
                Err(e) => {
                    eprintln!(
                        "[{}] flag evaluation failed for '{}': {}",
                        Utc::now().format("%H:%M:%S"),
                        target.identifier,
                        e,
                    );
                    None
                }
            },
            Self::Polled(rx) => *rx.borrow(),
        }
    }
}

/// Spawn the background poller: evaluates the unit flag against the fixed
/// service identity on a fixed cadence and publishes into a watch channel.
/// Runs on its own thread, never touches request handling, and exits once
/// every receiver has been dropped.
pub fn spawn_poller(
    client: FlagClient,
    interval: Duration,
) -> watch::Receiver<Option<bool>> {
    let (tx, rx) = watch::channel(None);
    let target = Target::service();

    std::thread::spawn(move || {
        while !tx.is_closed() {
            match client.evaluate(UNIT_FLAG, &target) {
                Ok(value) => {
                    eprintln!(
                        "[{}] flag '{}' = {}",
                        Utc::now().format("%H:%M:%S"),
                        UNIT_FLAG,
                        value,
                    );
                    let _ = tx.send(Some(value));
                }
                Err(e) => {
                    // Keep the last good value.
                    eprintln!(
                        "[{}] flag poll failed: {}",
                        Utc::now().format("%H:%M:%S"),
                        e,
                    );
                }
            }
            std::thread::sleep(interval);
        }
    });

    rx
}
