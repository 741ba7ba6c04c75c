//! Integration coefficients for the damped 2D wave equation.
//!
//! The surface is advanced with the explicit scheme
//!
//! ```text
//! z(i,j,k+1) = k1 * (z(i-1,j,k) + z(i+1,j,k) + z(i,j-1,k) + z(i,j+1,k))
//!            + k2 * z(i,j,k-1)
//!            + k3 * z(i,j,k)
//! ```
//!
//! obtained by discretising `d2z/dt2 = c^2 * laplacian(z) - mu * dz/dt` with
//! spacing `d` and timestep `t`:
//!
//! ```text
//! k1 = 2 c^2 t^2 / d^2 / (mu t + 2)
//! k2 = (mu t - 2) / (mu t + 2)
//! k3 = (4 - 8 c^2 t^2 / d^2) / (mu t + 2)
//! ```
//!
//! The scheme stays bounded only while `t` is below the smaller positive root
//! of the quadratic `(8 c^2 / d^2) t^2 - 2 mu t - 4 = 0`.
//! The wave speed handed in by callers is a fraction of the largest velocity
//! that is stable for the given spacing, viscosity and timestep.

use bevy::math::Vec4;
use serde::{Deserialize, Serialize};

use crate::constants::STABILITY_TOLERANCE;
use crate::error::{require_positive, LiquidError};

/// Coefficients of the wave stencil plus the inputs they were derived from.
///
/// Always produced as a whole by [`solve`]; there is no way to patch a single
/// coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParameters {
    /// Weight of the 4-neighbour sum.
    pub k1: f32,
    /// Weight of the previous height.
    pub k2: f32,
    /// Weight of the current height.
    pub k3: f32,
    pub sample_spacing: f32,
    pub wave_speed: f32,
    pub viscosity: f32,
    pub timestep: f32,
    /// Largest timestep for which these coefficients remain stable.
    pub stability_bound: f32,
}

impl WaveParameters {
    /// Evaluates the stencil for one texel.
    #[inline(always)]
    pub fn apply(&self, neighbour_sum: f32, previous: f32, current: f32) -> f32 {
        self.k1 * neighbour_sum + self.k2 * previous + self.k3 * current
    }

    /// Packed as `(k1, k2, k3, sample_spacing)`.
    pub fn to_vec4(&self) -> Vec4 {
        Vec4::new(self.k1, self.k2, self.k3, self.sample_spacing)
    }
}

/// Largest propagation velocity the grid can carry: `d / (2t) * sqrt(mu t + 2)`.
pub fn max_stable_velocity(sample_spacing: f64, viscosity: f64, timestep: f64) -> f64 {
    sample_spacing / (2.0 * timestep) * (viscosity * timestep + 2.0).sqrt()
}

/// Maximum stable timestep for an absolute velocity: the smaller positive root.
pub fn stability_bound(velocity: f64, viscosity: f64, sample_spacing: f64) -> f64 {
    let velocity_sq = velocity * velocity;
    let spacing_sq = sample_spacing * sample_spacing;
    let disc = (viscosity * viscosity + 32.0 * velocity_sq / spacing_sq).sqrt();
    let den = 8.0 * velocity_sq / spacing_sq;

    let upper = (viscosity + disc) / den;
    let lower = (viscosity - disc) / den;
    if lower > 0.0 && lower < upper {
        lower
    } else {
        upper
    }
}

/// Derives the stencil coefficients, rejecting unstable combinations.
pub fn solve(
    wave_speed: f32,
    viscosity: f32,
    sample_spacing: f32,
    fixed_timestep: f32,
) -> Result<WaveParameters, LiquidError> {
    require_positive("wave_speed", wave_speed)?;
    require_positive("viscosity", viscosity)?;
    require_positive("sample_spacing", sample_spacing)?;
    require_positive("fixed_timestep", fixed_timestep)?;

    let mu = viscosity as f64;
    let d = sample_spacing as f64;
    let t = fixed_timestep as f64;

    let velocity = max_stable_velocity(d, mu, t) * wave_speed as f64;
    let bound = stability_bound(velocity, mu, d);
    if bound < t * (1.0 - STABILITY_TOLERANCE) {
        return Err(LiquidError::Stability {
            wave_speed,
            viscosity,
            bound: bound as f32,
            timestep: fixed_timestep,
        });
    }

    let fac = velocity * velocity * t * t / (d * d);
    let damping = mu * t;
    let den = damping + 2.0;

    Ok(WaveParameters {
        k1: (2.0 * fac / den) as f32,
        k2: ((damping - 2.0) / den) as f32,
        k3: ((4.0 - 8.0 * fac) / den) as f32,
        sample_spacing,
        wave_speed,
        viscosity,
        timestep: fixed_timestep,
        stability_bound: bound as f32,
    })
}
