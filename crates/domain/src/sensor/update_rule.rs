//! Update rule — whether a sensor keeps a history log.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How accepted readings are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateRule {
    /// Snapshot and history.
    #[default]
    Normal,
    /// Snapshot only; actuator-style sensors.
    Control,
}

impl std::fmt::Display for UpdateRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::Control => f.write_str("control"),
        }
    }
}

/// Unrecognised update rule name.
#[derive(Debug, thiserror::Error)]
#[error("unknown update rule {0:?}")]
pub struct UnknownUpdateRule(pub String);

impl FromStr for UpdateRule {
    type Err = UnknownUpdateRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "control" => Ok(Self::Control),
            other => Err(UnknownUpdateRule(other.to_string())),
        }
    }
}
