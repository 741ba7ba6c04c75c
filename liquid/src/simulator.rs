//! Per-frame coordination of the liquid passes.
//!
//! ```text
//!  submissions ──> ForceInjectionPass ──> HeightFieldIntegrator ──> NormalFieldGenerator
//!                   (clear, draw, mask)     (inject, stencil, rotate)        │
//!                                                   │                        │
//!                                                   └──────> ShadingGlobals <┘
//! ```
//!
//! A frame either runs the whole chain or is skipped; there is no partial
//! frame.

use bevy_ecs::resource::Resource;
use bevy_log::{debug, info, warn};

use crate::config::LiquidConfig;
use crate::constants::{
    LIQUID_AREA, LIQUID_FORCE, LIQUID_HEIGHT_MAP, LIQUID_NORMAL_MAP, TARGET_FORCE,
    TARGET_HEIGHT_CURRENT, TARGET_HEIGHT_NEXT, TARGET_HEIGHT_PREVIOUS, TARGET_NORMALS,
};
use crate::domain::{LiquidAreaRect, SimulationDomain};
use crate::error::LiquidError;
use crate::force::{ForceBuffer, ForceInjectionPass};
use crate::integrator::{HeightField, HeightFieldIntegrator};
use crate::mask::ForceMask;
use crate::normals::{NormalField, NormalFieldGenerator};
use crate::registry::ForceSubmitter;
use crate::shading::{GlobalTexture, ShadingFrame, ShadingGlobals};
use crate::stability::{self, WaveParameters};
use crate::targets::RenderTargetPool;

/// One simulated liquid body.
///
/// Owns every offscreen target it uses; dropping the simulator hands them back
/// to the pool.
#[derive(Resource)]
pub struct LiquidSimulator {
    domain: SimulationDomain,
    area: LiquidAreaRect,
    params: WaveParameters,
    force_factor: f32,
    force_pass: ForceInjectionPass,
    integrator: HeightFieldIntegrator,
    normals: NormalFieldGenerator,
    submitter: ForceSubmitter,
    frame: u64,
}

impl LiquidSimulator {
    /// Validates `config`, loads its mask and acquires the offscreen targets.
    pub fn new(config: &LiquidConfig, pool: &RenderTargetPool) -> Result<Self, LiquidError> {
        let (domain, params) = config.validate()?;
        let mask = match &config.mask {
            Some(path) => Some(ForceMask::load(path, domain.resolution)?),
            None => None,
        };
        Self::build(domain, params, config.force_factor, mask, pool)
    }

    /// Builds from already validated parts.
    pub fn build(
        domain: SimulationDomain,
        params: WaveParameters,
        force_factor: f32,
        mask: Option<ForceMask>,
        pool: &RenderTargetPool,
    ) -> Result<Self, LiquidError> {
        let n = domain.resolution;
        if let Some(mask) = &mask {
            if mask.size() != n {
                return Err(LiquidError::configuration(
                    "mask",
                    mask.size(),
                    format!("mask must be resampled to the resolution {n}"),
                ));
            }
        }

        // Targets acquired so far are released again if a later one fails.
        let force_target = pool.acquire(TARGET_FORCE, n)?;
        let previous = pool.acquire(TARGET_HEIGHT_PREVIOUS, n)?;
        let current = pool.acquire(TARGET_HEIGHT_CURRENT, n)?;
        let next = pool.acquire(TARGET_HEIGHT_NEXT, n)?;
        let normal_target = pool.acquire(TARGET_NORMALS, n)?;

        let (cells_x, cells_z) = domain.mesh_cells();
        info!(
            "Liquid simulator ready: {}x{} m, depth {} m, {}x{} samples, {}x{} surface cells",
            domain.width, domain.length, domain.depth, n, n, cells_x, cells_z
        );
        info!(
            "Liquid wave coefficients k = ({:.5}, {:.5}, {:.5}), stable up to {:.5}s",
            params.k1,
            params.k2,
            params.k3,
            params.stability_bound
        );

        Ok(Self {
            area: domain.area(),
            force_pass: ForceInjectionPass::new(force_target, force_factor, mask),
            integrator: HeightFieldIntegrator::new(previous, current, next),
            normals: NormalFieldGenerator::new(normal_target, domain.texel_size()),
            domain,
            params,
            force_factor,
            submitter: ForceSubmitter::new(),
            frame: 0,
        })
    }

    /// Runs force pass, integration, normal generation and publication for
    /// one frame.
    pub fn render_frame(&mut self, globals: &mut ShadingGlobals) {
        self.force_pass.begin_frame();
        let draws = self.submitter.drain();
        self.force_pass.consume(&self.domain, &draws);
        let force = self.force_pass.finish();

        self.integrator.step(force, &self.params);
        self.normals.generate(self.integrator.heights());

        self.publish(globals);
        self.frame += 1;
    }

    /// Drops this frame's submissions without advancing the surface.
    pub fn skip_frame(&mut self) {
        let dropped = self.submitter.drain().len();
        if dropped > 0 {
            debug!("Skipped liquid frame, discarded {} force draws", dropped);
        }
    }

    fn publish(&self, globals: &mut ShadingGlobals) {
        globals.publish(
            ShadingFrame::new(self.frame)
                .with_texture(
                    LIQUID_HEIGHT_MAP,
                    GlobalTexture::Scalar(self.integrator.heights().clone()),
                )
                .with_texture(LIQUID_NORMAL_MAP, GlobalTexture::Rgba(self.normals.encoded()))
                .with_vector(LIQUID_AREA, self.area.to_vec4())
                .with_scalar(LIQUID_FORCE, self.force_factor),
        );
    }

    /// Re-derives the coefficients for a new wave speed and viscosity. On
    /// error the current coefficients stay in place.
    pub fn set_wave_parameters(
        &mut self,
        wave_speed: f32,
        viscosity: f32,
    ) -> Result<&WaveParameters, LiquidError> {
        match stability::solve(
            wave_speed,
            viscosity,
            self.domain.sample_spacing(),
            self.params.timestep,
        ) {
            Ok(params) => {
                info!(
                    "Liquid wave parameters updated: speed {} viscosity {} (k = {:.5}, {:.5}, {:.5})",
                    wave_speed, viscosity, params.k1, params.k2, params.k3
                );
                self.params = params;
                Ok(&self.params)
            }
            Err(err) => {
                warn!("Rejected liquid wave parameters: {}", err);
                Err(err)
            }
        }
    }

    /// Returns the surface to rest.
    pub fn reset(&mut self) {
        self.submitter.drain();
        self.integrator.reset();
        self.force_pass.begin_frame();
        self.frame = 0;
    }

    pub fn domain(&self) -> &SimulationDomain {
        &self.domain
    }

    pub fn area(&self) -> LiquidAreaRect {
        self.area
    }

    pub fn wave_parameters(&self) -> &WaveParameters {
        &self.params
    }

    pub fn wave_speed(&self) -> f32 {
        self.params.wave_speed
    }

    pub fn viscosity(&self) -> f32 {
        self.params.viscosity
    }

    pub fn force_factor(&self) -> f32 {
        self.force_factor
    }

    pub fn heights(&self) -> &HeightField {
        self.integrator.heights()
    }

    pub fn normals(&self) -> &NormalField {
        self.normals.normals()
    }

    /// The force buffer of the most recent frame.
    pub fn force(&self) -> &ForceBuffer {
        self.force_pass.buffer()
    }

    /// Number of frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Handle for queueing geometry into this liquid's next force pass.
    pub fn submitter(&self) -> ForceSubmitter {
        self.submitter.clone()
    }
}
