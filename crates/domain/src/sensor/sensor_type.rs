//! Declared sensor type — selects validation and history storage.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of sensor kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    #[default]
    Number,
    Location,
    Kv,
    Onoff,
    Image,
    /// Declared by provisioning but not handled by this pipeline.
    #[serde(other)]
    Unknown,
}

impl SensorType {
    /// Whether readings for this type are accepted through the upload path.
    #[must_use]
    pub fn is_updatable(self) -> bool {
        matches!(self, Self::Number | Self::Location | Self::Kv | Self::Onoff)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Location => "location",
            Self::Kv => "kv",
            Self::Onoff => "onoff",
            Self::Image => "image",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorType {
    type Err = std::convert::Infallible;

    /// Unrecognised names map to [`SensorType::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "number" => Self::Number,
            "location" => Self::Location,
            "kv" => Self::Kv,
            "onoff" => Self::Onoff,
            "image" => Self::Image,
            _ => Self::Unknown,
        })
    }
}
