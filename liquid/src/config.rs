//! Liquid configuration.
//!
//! A [`LiquidConfig`] is what a scene or a `.ron` file describes. It is turned
//! into a validated [`SimulationDomain`] and [`WaveParameters`] when the
//! simulator is built, and is immutable afterwards apart from the wave speed /
//! viscosity pair.

use std::fs;
use std::path::{Path, PathBuf};

use bevy::math::Vec3;
use bevy_ecs::resource::Resource;
use ron::de::from_str;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FIXED_TIMESTEP, DEFAULT_MAX_TARGET_TEXELS};
use crate::domain::SimulationDomain;
use crate::error::{require_positive, LiquidError};
use crate::stability::{self, WaveParameters};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidConfig {
    /// Centre of the liquid surface.
    pub position: Vec3,
    pub width: f32,
    pub length: f32,
    pub depth: f32,
    /// Surface mesh subdivision size.
    pub cell_size: f32,
    /// Height field samples per axis.
    pub resolution: usize,
    /// Fraction of the largest stable wave velocity, in `(0, 1]`.
    pub wave_speed: f32,
    pub viscosity: f32,
    pub force_factor: f32,
    pub fixed_timestep: f32,
    /// Optional image limiting where forcing reaches the surface.
    pub mask: Option<PathBuf>,
    /// Texel budget of the offscreen target pool.
    pub max_target_texels: usize,
}

impl Default for LiquidConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            width: 10.0,
            length: 10.0,
            depth: 2.0,
            cell_size: 0.1,
            resolution: 128,
            wave_speed: 0.5,
            viscosity: 0.5,
            force_factor: 1.0,
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            mask: None,
            max_target_texels: DEFAULT_MAX_TARGET_TEXELS,
        }
    }
}

impl LiquidConfig {
    /// Reads a `.ron` liquid description. Fields left out take their defaults.
    pub fn load(path: &Path) -> Result<Self, LiquidError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            LiquidError::configuration("config", path.display(), err.to_string())
        })?;
        Self::from_ron_str(&contents)
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, LiquidError> {
        from_str(contents)
            .map_err(|err| LiquidError::configuration("config", "<ron>", err.to_string()))
    }

    /// Checks the volume description, in the order cell size, width and
    /// length, depth, resolution.
    pub fn domain(&self) -> Result<SimulationDomain, LiquidError> {
        require_positive("cell_size", self.cell_size)?;
        require_positive("width", self.width)?;
        require_positive("length", self.length)?;
        require_positive("depth", self.depth)?;
        if self.resolution == 0 {
            return Err(LiquidError::configuration(
                "resolution",
                self.resolution,
                "must be at least 1",
            ));
        }
        if !self.position.is_finite() {
            return Err(LiquidError::configuration(
                "position",
                self.position,
                "must be finite",
            ));
        }

        Ok(SimulationDomain {
            position: self.position,
            width: self.width,
            length: self.length,
            depth: self.depth,
            resolution: self.resolution,
            cell_size: self.cell_size,
        })
    }

    /// Full validation without acquiring any resources.
    pub fn validate(&self) -> Result<(SimulationDomain, WaveParameters), LiquidError> {
        let domain = self.domain()?;
        if !(self.force_factor.is_finite() && self.force_factor >= 0.0) {
            return Err(LiquidError::configuration(
                "force_factor",
                self.force_factor,
                "must be a finite value of at least 0",
            ));
        }
        let params = stability::solve(
            self.wave_speed,
            self.viscosity,
            domain.sample_spacing(),
            self.fixed_timestep,
        )?;
        Ok((domain, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let (domain, params) = LiquidConfig::default().validate().unwrap();
        assert_eq!(domain.resolution, 128);
        assert!((params.sample_spacing - 1.0 / 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_validation_order() {
        let config = LiquidConfig {
            cell_size: 0.0,
            width: -1.0,
            depth: 0.0,
            resolution: 0,
            ..Default::default()
        };
        assert_eq!(config.domain().unwrap_err().parameter(), Some("cell_size"));

        let config = LiquidConfig {
            length: 0.0,
            depth: 0.0,
            ..Default::default()
        };
        assert_eq!(config.domain().unwrap_err().parameter(), Some("length"));

        let config = LiquidConfig {
            depth: 0.0,
            resolution: 0,
            ..Default::default()
        };
        assert_eq!(config.domain().unwrap_err().parameter(), Some("depth"));

        let config = LiquidConfig {
            resolution: 0,
            ..Default::default()
        };
        assert_eq!(config.domain().unwrap_err().parameter(), Some("resolution"));
    }

    #[test]
    fn test_domain_checked_before_wave_parameters() {
        let config = LiquidConfig {
            depth: 0.0,
            wave_speed: 5.0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().parameter(), Some("depth"));
    }

    #[test]
    fn test_rejects_negative_force_factor() {
        let config = LiquidConfig {
            force_factor: -1.0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().parameter(), Some("force_factor"));
    }

    #[test]
    fn test_unstable_speed_is_stability_error() {
        let config = LiquidConfig {
            wave_speed: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            LiquidError::Stability { .. }
        ));
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = LiquidConfig::from_ron_str("(width: 4.0, resolution: 32)").unwrap();
        assert_eq!(config.width, 4.0);
        assert_eq!(config.resolution, 32);
        assert_eq!(config.length, 10.0);
        assert_eq!(config.mask, None);
    }

    #[test]
    fn test_reads_position_and_mask() {
        let config =
            LiquidConfig::from_ron_str("(position: (1.0, 2.0, 3.0), mask: Some(\"mask.png\"))")
                .unwrap();
        assert_eq!(config.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.mask, Some(PathBuf::from("mask.png")));
    }

    #[test]
    fn test_unreadable_file_is_configuration_error() {
        let err = LiquidConfig::load(Path::new("/nonexistent/liquid.ron")).unwrap_err();
        assert_eq!(err.parameter(), Some("config"));
    }

    #[test]
    fn test_malformed_ron_is_configuration_error() {
        let err = LiquidConfig::from_ron_str("(width: )").unwrap_err();
        assert_eq!(err.parameter(), Some("config"));
    }
}
