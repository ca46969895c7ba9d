//! Game configuration supplied at construction time.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{grid::FieldSize, CellCoord};

/// Tunables describing the field, the snake and the cookie supply.
///
/// Every field falls back to its default when omitted from a TOML document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of columns in the field.
    pub field_width: u32,
    /// Number of rows in the field.
    pub field_height: u32,
    /// Edge length of a rendered cell in screen units.
    pub cell_size: f32,
    /// Number of segments a freshly spawned snake carries.
    pub start_length: u32,
    /// Milliseconds the snake waits between discrete steps.
    pub step_interval_ms: u64,
    /// Number of cookies kept on the field.
    pub cookie_count: u32,
    /// Milliseconds a dead snake lingers before the field resets.
    pub respawn_delay_ms: u64,
    /// Seed for the cookie placement generator.
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: 40,
            field_height: 30,
            cell_size: 16.0,
            start_length: 15,
            step_interval_ms: 150,
            cookie_count: 25,
            respawn_delay_ms: 1_000,
            rng_seed: 0x5eed_c00c_1e5a_a7e5,
        }
    }
}

impl GameConfig {
    /// Rejects configurations the simulation cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field_width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.field_height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if u64::from(self.field_width) * u64::from(self.field_height) > u64::from(u32::MAX) {
            return Err(ConfigError::FieldTooLarge {
                width: self.field_width,
                height: self.field_height,
            });
        }
        if self.start_length == 0 {
            return Err(ConfigError::ZeroLength);
        }
        if self.start_length > self.field_width {
            return Err(ConfigError::LengthExceedsField {
                length: self.start_length,
                width: self.field_width,
            });
        }
        if self.step_interval_ms == 0 {
            return Err(ConfigError::ZeroStepInterval);
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }

    /// Field dimensions described by the configuration.
    #[must_use]
    pub const fn field(&self) -> FieldSize {
        FieldSize::new(self.field_width, self.field_height)
    }

    /// Simulated time between two discrete snake steps.
    #[must_use]
    pub const fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    /// Simulated time a dead snake lingers before the field resets.
    #[must_use]
    pub const fn respawn_delay(&self) -> Duration {
        Duration::from_millis(self.respawn_delay_ms)
    }

    /// Cell the head of a freshly spawned snake occupies: the field centre.
    #[must_use]
    pub fn spawn_cell(&self) -> CellCoord {
        let column = self.field_width.div_ceil(2).min(self.field_width.saturating_sub(1));
        let row = self.field_height.div_ceil(2).min(self.field_height.saturating_sub(1));
        CellCoord::new(column, row)
    }
}

/// Reasons a [`GameConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The field has no columns.
    #[error("field width must be positive")]
    ZeroWidth,
    /// The field has no rows.
    #[error("field height must be positive")]
    ZeroHeight,
    /// The field holds more cells than a cell identifier can address.
    #[error("field of {width}x{height} cells exceeds the addressable cell range")]
    FieldTooLarge {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// The snake would spawn without segments.
    #[error("start length must be positive")]
    ZeroLength,
    /// The straight spawn layout would overlap itself after wrapping.
    #[error("start length {length} does not fit a field {width} cells wide")]
    LengthExceedsField {
        /// Requested start length.
        length: u32,
        /// Available columns.
        width: u32,
    },
    /// The snake would step on every frame without bound.
    #[error("step interval must be positive")]
    ZeroStepInterval,
    /// Cell size is zero, negative or not a number.
    #[error("cell size {0} must be a positive finite number")]
    InvalidCellSize(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.spawn_cell(), CellCoord::new(20, 15));
        assert_eq!(config.step_interval(), Duration::from_millis(150));
    }

    #[test]
    fn malformed_dimensions_are_rejected() {
        let config = GameConfig {
            field_width: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWidth));

        let config = GameConfig {
            field_height: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroHeight));

        let config = GameConfig {
            field_width: 4,
            start_length: 5,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::LengthExceedsField {
                length: 5,
                width: 4
            })
        );
    }

    #[test]
    fn spawn_cell_stays_inside_tiny_fields() {
        let config = GameConfig {
            field_width: 1,
            field_height: 1,
            start_length: 1,
            ..GameConfig::default()
        };
        assert_eq!(config.spawn_cell(), CellCoord::new(0, 0));
    }

    #[test]
    fn partial_toml_documents_fall_back_to_defaults() {
        let config: GameConfig =
            toml::from_str("field_width = 12\nstep_interval_ms = 90\n").expect("parse");
        assert_eq!(config.field_width, 12);
        assert_eq!(config.step_interval_ms, 90);
        assert_eq!(config.field_height, GameConfig::default().field_height);
    }
}
