//! Walking-speed model.
//!
//! Maps a leg's straight-line distance to an estimated walking time
//! using three pace tiers. The tiers are not smoothed: crossing a
//! threshold switches pace abruptly, so duration may step down at a
//! bucket edge.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Piecewise walking pace, in meters per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedModel {
    /// Legs strictly shorter than this use `short_speed_mps`.
    pub short_threshold_m: f64,
    /// Legs strictly longer than this use `long_speed_mps`.
    pub long_threshold_m: f64,
    pub short_speed_mps: f64,
    pub base_speed_mps: f64,
    pub long_speed_mps: f64,
}

/// ~4.5 km/h: short hops with frequent starts and crossings.
pub const SHORT_SPEED_MPS: f64 = 1.25;
/// ~5.0 km/h.
pub const BASE_SPEED_MPS: f64 = 1.39;
/// ~5.5 km/h: sustained pace on long stretches.
pub const LONG_SPEED_MPS: f64 = 1.53;

impl Default for SpeedModel {
    fn default() -> Self {
        Self {
            short_threshold_m: 200.0,
            long_threshold_m: 1000.0,
            short_speed_mps: SHORT_SPEED_MPS,
            base_speed_mps: BASE_SPEED_MPS,
            long_speed_mps: LONG_SPEED_MPS,
        }
    }
}

impl SpeedModel {
    /// Rejects paces that would give infinite or negative durations and
    /// thresholds in the wrong order.
    pub fn validate(&self) -> Result<()> {
        for (name, speed) in [
            ("short_speed_mps", self.short_speed_mps),
            ("base_speed_mps", self.base_speed_mps),
            ("long_speed_mps", self.long_speed_mps),
        ] {
            if !(speed.is_finite() && speed > 0.0) {
                return Err(Error::InvalidConfig(format!("{name} must be positive, got {speed}")));
            }
        }
        for (name, threshold) in [
            ("short_threshold_m", self.short_threshold_m),
            ("long_threshold_m", self.long_threshold_m),
        ] {
            if !(threshold.is_finite() && threshold >= 0.0) {
                return Err(Error::InvalidConfig(format!("{name} must be non-negative, got {threshold}")));
            }
        }
        if self.short_threshold_m > self.long_threshold_m {
            return Err(Error::InvalidConfig(format!(
                "short_threshold_m {} exceeds long_threshold_m {}",
                self.short_threshold_m, self.long_threshold_m
            )));
        }
        Ok(())
    }

    /// Walking speed used for a leg of the given length.
    pub fn speed_for(&self, distance_m: f64) -> f64 {
        if distance_m < self.short_threshold_m {
            self.short_speed_mps
        } else if distance_m > self.long_threshold_m {
            self.long_speed_mps
        } else {
            self.base_speed_mps
        }
    }

    /// Estimated walking time in seconds.
    pub fn estimate_duration(&self, distance_m: f64) -> f64 {
        distance_m / self.speed_for(distance_m)
    }
}

/// Estimated walking time in seconds with the default pace tiers.
pub fn estimate_duration(distance_m: f64) -> f64 {
    SpeedModel::default().estimate_duration(distance_m)
}
