//! Error types for the liquid simulation.

use std::fmt::Display;

use thiserror::Error;

/// Everything that can stop the liquid simulation from starting or from
/// accepting new parameters. None of these are retried; the caller has to
/// supply corrected configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiquidError {
    /// A configuration value is out of its valid range or cannot be read.
    #[error("invalid liquid configuration: `{parameter}` = {value} ({reason})")]
    Configuration {
        parameter: &'static str,
        value: String,
        reason: String,
    },

    /// The wave speed / viscosity pair cannot be integrated at the fixed timestep.
    #[error(
        "unstable wave parameters: wave speed {wave_speed} with viscosity {viscosity} \
         allows a maximum timestep of {bound}s, but the fixed timestep is {timestep}s"
    )]
    Stability {
        wave_speed: f32,
        viscosity: f32,
        bound: f32,
        timestep: f32,
    },

    /// An offscreen target could not be acquired.
    #[error("liquid resource `{resource}` unavailable: {reason}")]
    ResourceUnavailable {
        resource: &'static str,
        reason: String,
    },
}

impl LiquidError {
    pub fn configuration(
        parameter: &'static str,
        value: impl Display,
        reason: impl Into<String>,
    ) -> Self {
        LiquidError::Configuration {
            parameter,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn resource(resource: &'static str, reason: impl Into<String>) -> Self {
        LiquidError::ResourceUnavailable {
            resource,
            reason: reason.into(),
        }
    }

    /// Name of the offending configuration parameter, if any.
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            LiquidError::Configuration { parameter, .. } => Some(parameter),
            _ => None,
        }
    }
}

/// Rejects anything that is not a finite, strictly positive number.
pub(crate) fn require_positive(parameter: &'static str, value: f32) -> Result<f32, LiquidError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LiquidError::configuration(
            parameter,
            value,
            "must be a finite value greater than 0",
        ))
    }
}
