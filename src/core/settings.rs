//! Landscape configuration surface.
//!
//! Settings are loaded once, before streaming starts, and validated against the
//! bounds in [`crate::core::constants::landscape`]. Nothing past this point
//! re-checks them: the mesh synthesizer and the enumerator assume valid input.

use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use crate::core::constants::landscape::*;
use crate::core::error::ConfigError;

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LandscapeSettings {
    /// Chunks whose center lies within this distance are requested
    pub load_radius: f32,
    /// Loaded chunks beyond this distance are evicted
    pub unload_radius: f32,
    /// Edge length of one chunk in world units
    pub chunk_size: f32,
    /// Grid resolution (quads per chunk edge)
    pub steps_per_chunk: u32,
    pub horizontal_noise_scale: f32,
    pub vertical_scale: f32,
    pub noise_seed: u32,
}

impl Default for LandscapeSettings {
    fn default() -> Self {
        Self {
            load_radius: DEFAULT_LOAD_RADIUS,
            unload_radius: DEFAULT_UNLOAD_RADIUS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            steps_per_chunk: DEFAULT_STEPS_PER_CHUNK,
            horizontal_noise_scale: DEFAULT_HORIZONTAL_NOISE_SCALE,
            vertical_scale: DEFAULT_VERTICAL_SCALE,
            noise_seed: DEFAULT_NOISE_SEED,
        }
    }
}

impl LandscapeSettings {
    /// Parse and validate settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject values outside the documented bounds.
    ///
    /// `unload_radius < load_radius` is allowed but warned about: chunks in the
    /// gap would be generated and evicted over and over.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("load_radius", self.load_radius, MIN_RADIUS, MAX_RADIUS)?;
        check_range("unload_radius", self.unload_radius, MIN_RADIUS, MAX_RADIUS)?;
        check_range("chunk_size", self.chunk_size, MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)?;
        check_range(
            "horizontal_noise_scale",
            self.horizontal_noise_scale,
            MIN_HORIZONTAL_NOISE_SCALE,
            MAX_HORIZONTAL_NOISE_SCALE,
        )?;
        check_range(
            "vertical_scale",
            self.vertical_scale,
            -MAX_VERTICAL_SCALE,
            MAX_VERTICAL_SCALE,
        )?;

        if !(MIN_STEPS_PER_CHUNK..=MAX_STEPS_PER_CHUNK).contains(&self.steps_per_chunk) {
            return Err(ConfigError::OutOfRange {
                field: "steps_per_chunk",
                value: self.steps_per_chunk as f64,
                min: MIN_STEPS_PER_CHUNK as f64,
                max: MAX_STEPS_PER_CHUNK as f64,
            });
        }

        if self.unload_radius < self.load_radius {
            warn!(
                "unload_radius ({:.1}) is smaller than load_radius ({:.1}); chunks between them will reload every tick",
                self.unload_radius, self.load_radius
            );
        }

        Ok(())
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value: value as f64,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(LandscapeSettings::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings = LandscapeSettings::from_toml_str("chunk_size = 250.0\nsteps_per_chunk = 8\n").unwrap();
        assert_eq!(settings.chunk_size, 250.0);
        assert_eq!(settings.steps_per_chunk, 8);
        assert_eq!(settings.load_radius, DEFAULT_LOAD_RADIUS);
        assert_eq!(settings.noise_seed, DEFAULT_NOISE_SEED);
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let err = LandscapeSettings::from_toml_str("steps_per_chunk = 0").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "steps_per_chunk", .. }));
    }

    #[test]
    fn resolution_above_255_is_rejected() {
        let settings = LandscapeSettings {
            steps_per_chunk: 256,
            ..default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn oversized_radius_is_rejected() {
        let settings = LandscapeSettings {
            load_radius: 20_000_000.0,
            ..default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::OutOfRange { field: "load_radius", .. })
        ));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let settings = LandscapeSettings {
            chunk_size: f32::NAN,
            ..default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::NotFinite { field: "chunk_size" })
        ));
    }

    #[test]
    fn inverted_hysteresis_is_allowed() {
        let settings = LandscapeSettings {
            load_radius: 2000.0,
            unload_radius: 1500.0,
            ..default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = LandscapeSettings::from_toml_str("chunk_size = \"big\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
