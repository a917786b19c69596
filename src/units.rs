//! Unit-system resolution.
//!
//! A lookup can name its unit system three ways, in strict priority order:
//! an explicit request header, a remote flag decision, or neither. The
//! resolver collapses those into exactly one of "imperial" or "metric".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Measurement convention for temperature values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Imperial,
    Metric,
}

impl UnitSystem {
    /// The literal forwarded to the upstream provider.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Imperial => "imperial",
            Self::Metric => "metric",
        }
    }

    /// Resolve the effective unit system for a single lookup.
    ///
    /// Priority: a valid explicit hint always wins; otherwise a flag
    /// decision maps true → imperial, false → metric; otherwise imperial.
    /// Any hint other than the two exact literals counts as absent.
    /// Total over its domain: never fails, never returns anything but the
    /// two variants.
    pub fn resolve(hint: Option<&str>, flag_decision: Option<bool>) -> Self {
        if let Some(hint) = hint {
            if let Ok(explicit) = hint.parse() {
                return explicit;
            }
        }
        match flag_decision {
            Some(true) => Self::Imperial,
            Some(false) => Self::Metric,
            None => Self::Imperial,
        }
    }
}

impl FromStr for UnitSystem {
    type Err = ();

    // Exact match only. "Imperial", "IMPERIAL" etc. are not valid hints.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imperial" => Ok(Self::Imperial),
            "metric" => Ok(Self::Metric),
            _ => Err(()),
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
