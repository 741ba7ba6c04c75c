//! Bevy plugin driving the liquid surface once per frame.

use std::sync::Arc;

use bevy::prelude::*;
use bevy_log::{error, info};

use crate::config::LiquidConfig;
use crate::constants::MAX_TARGET_DIMENSION;
use crate::force::{ForceMesh, Renderable};
use crate::registry::{LiquidHandle, LiquidRegistry};
use crate::sets::LiquidSet;
use crate::shading::ShadingGlobals;
use crate::simulator::LiquidSimulator;
use crate::targets::RenderTargetPool;

/// Plugin that adds a simulated liquid body to the app.
///
/// This plugin:
/// - Builds the [`LiquidSimulator`] from its [`LiquidConfig`] at startup
/// - Queues every [`LiquidForceEmitter`] into the force pass each frame
/// - Steps the surface and publishes [`ShadingGlobals`]
///
/// When the configuration is invalid or the offscreen targets cannot be
/// acquired, the error is logged and the liquid stays inactive for the whole
/// session.
#[derive(Default)]
pub struct LiquidPlugin {
    pub config: LiquidConfig,
}

impl Plugin for LiquidPlugin {
    fn build(&self, app: &mut App) {
        let pool = RenderTargetPool::new(self.config.max_target_texels, MAX_TARGET_DIMENSION);

        app.init_resource::<LiquidSettings>()
            .register_type::<LiquidSettings>()
            .init_resource::<ShadingGlobals>()
            .init_resource::<LiquidRegistry>()
            .insert_resource(LiquidTargets(pool))
            .insert_resource(self.config.clone())
            .add_event::<SetWaveParameters>()
            .configure_sets(
                Update,
                (LiquidSet::Submit, LiquidSet::Simulate, LiquidSet::Publish).chain(),
            )
            .add_systems(Startup, start_liquid)
            .add_systems(
                Update,
                (detach_removed_liquid, submit_force_emitters)
                    .chain()
                    .in_set(LiquidSet::Submit),
            )
            .add_systems(
                Update,
                (apply_wave_parameters, render_liquid_frame)
                    .chain()
                    .in_set(LiquidSet::Simulate),
            )
            .add_systems(Update, report_liquid_stats.in_set(LiquidSet::Publish));
    }
}

/// Runtime switches for the liquid.
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct LiquidSettings {
    /// Whether frames are simulated. Submissions are discarded while disabled.
    pub enabled: bool,

    /// Log height statistics every this many frames; 0 turns it off.
    pub stats_interval: u64,
}

impl Default for LiquidSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            stats_interval: 60,
        }
    }
}

/// Pool the simulator's offscreen targets are leased from.
#[derive(Resource, Clone, Debug)]
pub struct LiquidTargets(pub RenderTargetPool);

/// Registry handle of the liquid built by [`LiquidPlugin`].
#[derive(Resource, Clone, Copy, Debug)]
pub struct ActiveLiquid(pub LiquidHandle);

/// Geometry that pushes the liquid wherever it is submerged.
#[derive(Component, Clone, Debug)]
pub struct LiquidForceEmitter {
    pub mesh: Arc<ForceMesh>,
    pub visible: bool,
}

impl LiquidForceEmitter {
    pub fn new(mesh: ForceMesh) -> Self {
        Self {
            mesh: Arc::new(mesh),
            visible: true,
        }
    }
}

/// Requests new wave speed and viscosity. Rejected pairs leave the running
/// coefficients untouched.
#[derive(Event, Debug, Clone, Copy)]
pub struct SetWaveParameters {
    pub wave_speed: f32,
    pub viscosity: f32,
}

fn start_liquid(
    mut commands: Commands,
    config: Res<LiquidConfig>,
    targets: Res<LiquidTargets>,
    mut registry: ResMut<LiquidRegistry>,
) {
    match LiquidSimulator::new(&config, &targets.0) {
        Ok(simulator) => {
            let handle = registry.register(simulator.submitter());
            commands.insert_resource(ActiveLiquid(handle));
            commands.insert_resource(simulator);
        }
        Err(err) => {
            error!("Liquid simulation disabled: {}", err);
        }
    }
}

/// Unregisters the liquid once its simulator resource is gone, so routed
/// submissions stop piling up in a queue nobody drains.
fn detach_removed_liquid(
    mut commands: Commands,
    active: Option<Res<ActiveLiquid>>,
    simulator: Option<Res<LiquidSimulator>>,
    mut registry: ResMut<LiquidRegistry>,
    mut globals: ResMut<ShadingGlobals>,
) {
    let Some(active) = active else {
        return;
    };
    if simulator.is_some() {
        return;
    }
    if let Some(submitter) = registry.unregister(active.0) {
        submitter.drain();
    }
    globals.clear();
    commands.remove_resource::<ActiveLiquid>();
    info!("Liquid {:?} removed, no longer receiving force draws", active.0);
}

fn submit_force_emitters(
    registry: Res<LiquidRegistry>,
    emitters: Query<(&LiquidForceEmitter, &Transform)>,
) {
    for (emitter, transform) in emitters.iter() {
        registry.submit_renderable(Renderable {
            mesh: Arc::clone(&emitter.mesh),
            transform: transform.compute_matrix(),
            visible: emitter.visible,
        });
    }
}

fn apply_wave_parameters(
    mut events: EventReader<SetWaveParameters>,
    simulator: Option<ResMut<LiquidSimulator>>,
) {
    let Some(mut simulator) = simulator else {
        events.clear();
        return;
    };
    for event in events.read() {
        // Errors are logged by the simulator.
        let _ = simulator.set_wave_parameters(event.wave_speed, event.viscosity);
    }
}

fn render_liquid_frame(
    settings: Res<LiquidSettings>,
    simulator: Option<ResMut<LiquidSimulator>>,
    mut globals: ResMut<ShadingGlobals>,
) {
    let Some(mut simulator) = simulator else {
        return;
    };
    if settings.enabled {
        simulator.render_frame(&mut globals);
    } else {
        simulator.skip_frame();
    }
}

fn report_liquid_stats(settings: Res<LiquidSettings>, simulator: Option<Res<LiquidSimulator>>) {
    let Some(simulator) = simulator else {
        return;
    };
    let frame = simulator.frame();
    if settings.stats_interval == 0 || frame == 0 || frame % settings.stats_interval != 0 {
        return;
    }
    let heights = simulator.heights();
    let (min, max) = heights.min_max();
    info!(
        "Liquid frame {}: height range [{:.4}, {:.4}], peak {:.4}",
        frame,
        min,
        max,
        heights.max_abs()
    );
}
