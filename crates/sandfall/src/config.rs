//! Startup parameters.

use serde::{Deserialize, Serialize};

use crate::cell::CellId;
use crate::error::ConfigError;

/// Grid size and movement rates.
///
/// Rates marked `per_sec` are scaled by [`SimConfig::tick_scale`] before
/// being rolled, so they can be tuned independently of the update rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Simulation ticks per second
    pub updates_per_second: f64,
    /// Chance to slip sideways when the cell below is taken
    pub chance_move_to_side_per_sec: f64,
    /// Chance that a lighter cell below gets a displacement attempt
    pub chance_replace_per_sec: f64,
    /// Extra displacement chance per unit of weight difference
    pub chance_replace_per_weight: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            // 800x640 canvas at 5 px per cell
            width: 160,
            height: 128,
            updates_per_second: 40.0,
            chance_move_to_side_per_sec: 5.0,
            chance_replace_per_sec: 30.0,
            chance_replace_per_weight: 10.0,
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input, or any error from
    /// [`SimConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty or oversized grid, a
    /// non-positive update rate, or a negative or non-finite rate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        self.area()?;
        if !(self.updates_per_second.is_finite() && self.updates_per_second > 0.0) {
            return Err(ConfigError::UpdateRate(self.updates_per_second));
        }
        for (name, value) in [
            ("chance_move_to_side_per_sec", self.chance_move_to_side_per_sec),
            ("chance_replace_per_sec", self.chance_replace_per_sec),
            ("chance_replace_per_weight", self.chance_replace_per_weight),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Probability { name, value });
            }
        }
        Ok(())
    }

    /// Number of grid slots.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::GridTooLarge`] if `width * height` overflows,
    /// or the occupancy index for that many slots could not be allocated.
    pub fn area(&self) -> Result<usize, ConfigError> {
        let slot_bytes = std::mem::size_of::<Option<CellId>>();
        self.width
            .checked_mul(self.height)
            .filter(|&area| {
                area.checked_mul(slot_bytes)
                    .is_some_and(|bytes| isize::try_from(bytes).is_ok())
            })
            .ok_or(ConfigError::GridTooLarge {
                width: self.width,
                height: self.height,
            })
    }

    /// Converts a per-second probability into a per-tick one.
    #[must_use]
    pub fn tick_scale(&self) -> f64 {
        self.updates_per_second.recip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.tick_scale() - 0.025).abs() < 1e-12);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = SimConfig::from_json(r#"{ "width": 32, "updates_per_second": 60 }"#).unwrap();
        assert_eq!(config.width, 32);
        assert_eq!(config.height, 128);
        assert!((config.updates_per_second - 60.0).abs() < f64::EPSILON);
        assert!((config.chance_replace_per_sec - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn json_round_trip() {
        let config = SimConfig {
            width: 10,
            height: 20,
            ..SimConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(SimConfig::from_json("{ width: "), Err(ConfigError::Json(_))));
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        let err = SimConfig::from_json(r#"{ "height": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyGrid { width: 160, height: 0 }));
    }

    #[test]
    fn overflowing_grid_is_rejected() {
        let err = SimConfig::from_json(r#"{ "width": 18446744073709551615, "height": 2 }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::GridTooLarge { height: 2, .. }), "{err}");

        let config = SimConfig {
            width: usize::MAX / 2 + 1,
            height: 2,
            ..SimConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::GridTooLarge { .. })));
        assert!(matches!(config.area(), Err(ConfigError::GridTooLarge { .. })));

        // Fits in usize, but the index would not fit in the address space.
        let config = SimConfig {
            width: usize::MAX / 4,
            height: 1,
            ..SimConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::GridTooLarge { .. })));
    }

    #[test]
    fn area_is_width_times_height() {
        let config = SimConfig {
            width: 7,
            height: 3,
            ..SimConfig::default()
        };
        assert_eq!(config.area().unwrap(), 21);
    }

    #[test]
    fn bad_update_rate_is_rejected() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = SimConfig {
                updates_per_second: rate,
                ..SimConfig::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::UpdateRate(_))));
        }
    }

    #[test]
    fn negative_probability_is_rejected() {
        let config = SimConfig {
            chance_replace_per_weight: -0.5,
            ..SimConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "chance_replace_per_weight must be a non-negative finite number, got -0.5"
        );
    }
}
