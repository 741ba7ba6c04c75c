use crate::demo::{self, DemoClock, Raindrops};
use crate::dump::dump_shading_inputs;
use bevy::prelude::*;
use bevy_app::PluginsState;
use bevy_log::{error, info};
use liquid::{LiquidConfig, LiquidPlugin, LiquidSettings, LiquidSimulator, ShadingGlobals};
use std::path::PathBuf;

/// How the headless host drives the liquid.
#[derive(Debug, Clone)]
pub struct HostOptions {
    pub frames: u32,
    /// Raindrops released per frame on average.
    pub drops_per_frame: f32,
    pub seed: u64,
    /// Directory receiving PNG dumps of the final frame.
    pub dump: Option<PathBuf>,
    /// Frames between height statistics logs; 0 turns them off.
    pub stats_interval: u64,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            frames: 600,
            drops_per_frame: 0.5,
            seed: 0,
            dump: None,
            stats_interval: 60,
        }
    }
}

/// Builds the app without a log subscriber, ready for manual updates.
pub fn build_app(config: LiquidConfig, options: &HostOptions) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);

    app.insert_resource(DemoClock::new(config.fixed_timestep));
    app.insert_resource(Raindrops::new(options.seed, options.drops_per_frame));
    app.insert_resource(LiquidSettings {
        stats_interval: options.stats_interval,
        ..Default::default()
    });
    app.add_plugins(LiquidPlugin { config });

    demo::register_systems(&mut app);

    app
}

/// Advances the app by `frames` updates, finishing plugin setup first if
/// that has not happened yet.
pub fn run_frames(app: &mut App, frames: u32) {
    if app.plugins_state() == PluginsState::Ready {
        app.finish();
        app.cleanup();
    }
    for _ in 0..frames {
        app.update();
    }
}

pub fn init(config: LiquidConfig, options: HostOptions) {
    let mut app = build_app(config, &options);
    app.add_plugins(bevy_log::LogPlugin::default());

    info!(
        "Starting liquid host: {} frames, {} drops per frame, seed {}",
        options.frames, options.drops_per_frame, options.seed
    );

    run_frames(&mut app, options.frames);

    let world = app.world();
    match world.get_resource::<LiquidSimulator>() {
        Some(simulator) => info!(
            "Liquid host finished after {} frames, peak height {:.4}",
            simulator.frame(),
            simulator.heights().max_abs()
        ),
        None => error!("Liquid host finished without an active liquid"),
    }

    if let Some(dir) = &options.dump {
        let globals = world.resource::<ShadingGlobals>();
        if let Err(err) = dump_shading_inputs(globals, dir) {
            error!("Could not dump liquid maps to {} : {}", dir.display(), err);
        }
    }
}
