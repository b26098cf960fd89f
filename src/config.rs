//! Engine configuration.
//!
//! Hosts pass configuration as a JSON object; every key is optional and
//! falls back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::speed::SpeedModel;

/// Arles, France.
pub const DEFAULT_ORIGIN: Coordinate = Coordinate::new(43.6768, 4.6278);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where planning starts when the host has no position fix.
    pub default_origin: Coordinate,
    pub speed: SpeedModel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_origin: DEFAULT_ORIGIN,
            speed: SpeedModel::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.default_origin.is_valid() {
            return Err(Error::InvalidConfig(format!(
                "default_origin out of range (lat {}, lon {})",
                self.default_origin.lat, self.default_origin.lon
            )));
        }
        self.speed.validate()
    }

    /// The reported position, or the default origin if there is none.
    pub fn origin_or_default(&self, position: Option<Coordinate>) -> Coordinate {
        position.unwrap_or(self.default_origin)
    }
}
