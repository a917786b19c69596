//! Startup configuration.
//!
//! Credentials are read from the environment exactly once, into a plain
//! record that is passed into the server state. Nothing reads the
//! environment after startup.

use std::env;
use std::fmt;

const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct Config {
    pub weather_api_key: String,
    pub weather_base_url: String,
    pub flag_api_key: Option<String>,
    pub flag_base_url: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    /// The weather provider key is required unconditionally.
    MissingWeatherKey,
    /// The flag service credentials are required only when a flag mode
    /// that uses them was requested.
    MissingFlagCredentials,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingWeatherKey => {
                write!(f, "OPENWEATHERMAP_API_KEY is not set")
            }
            Self::MissingFlagCredentials => {
                write!(f, "FF_API_KEY and FF_BASE_URL must be set to use a flag mode")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load from the process environment.
    ///
    /// `OPENWEATHERMAP_API_KEY` — required.
    /// `OPENWEATHERMAP_BASE_URL` — optional override (tests, proxies).
    /// `FF_API_KEY`, `FF_BASE_URL` — required only for flag modes.
    pub fn from_env() -> Result<Self, ConfigError> {
        let weather_api_key = non_empty(env::var("OPENWEATHERMAP_API_KEY").ok())
            .ok_or(ConfigError::MissingWeatherKey)?;

        Ok(Self {
            weather_api_key,
            weather_base_url: non_empty(env::var("OPENWEATHERMAP_BASE_URL").ok())
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            flag_api_key: non_empty(env::var("FF_API_KEY").ok()),
            flag_base_url: non_empty(env::var("FF_BASE_URL").ok()),
        })
    }

    /// The flag service endpoint and key, or an error when either is absent.
    pub fn flag_credentials(&self) -> Result<(&str, &str), ConfigError> {
        match (&self.flag_base_url, &self.flag_api_key) {
            (Some(url), Some(key)) => Ok((url, key)),
            _ => Err(ConfigError::MissingFlagCredentials),
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_count_as_unset() {
        assert_eq!(non_empty(Some("".into())), None);
        assert_eq!(non_empty(Some("   ".into())), None);
        assert_eq!(non_empty(Some("abc".into())), Some("abc".to_string()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn flag_credentials_require_both() {
        let mut cfg = Config {
            weather_api_key: "k".into(),
            weather_base_url: DEFAULT_WEATHER_BASE_URL.into(),
            flag_api_key: Some("ff-key".into()),
            flag_base_url: None,
        };
        assert!(cfg.flag_credentials().is_err());

        cfg.flag_base_url = Some("https://flags.example.org".into());
        let (url, key) = cfg.flag_credentials().unwrap();
        assert_eq!(url, "https://flags.example.org");
        assert_eq!(key, "ff-key");
    }
}
