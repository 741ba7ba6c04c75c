//! Scene driving the headless liquid: a few bobbing boxes and random raindrops.

use bevy::prelude::*;
use bevy_ecs::system::{Res, ResMut};
use bevy_log::info;
use liquid::{
    ForceMesh, LiquidConfig, LiquidForceEmitter, LiquidRegistry, LiquidSet, LiquidSimulator,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic scene time, advanced by one fixed timestep per update.
#[derive(Resource, Debug, Clone, Default)]
pub struct DemoClock {
    pub frame: u64,
    pub timestep: f32,
}

impl DemoClock {
    pub fn new(timestep: f32) -> Self {
        Self { frame: 0, timestep }
    }

    pub fn elapsed(&self) -> f32 {
        self.frame as f32 * self.timestep
    }
}

/// Moves an emitter up and down through the surface.
#[derive(Component, Debug, Clone)]
pub struct Bobbing {
    pub anchor: Vec3,
    pub amplitude: f32,
    /// Oscillations per second.
    pub frequency: f32,
    pub phase: f32,
}

impl Bobbing {
    pub fn offset_at(&self, time: f32) -> f32 {
        self.amplitude * (std::f32::consts::TAU * self.frequency * time + self.phase).sin()
    }
}

#[derive(Resource, Debug)]
pub struct Raindrops {
    rng: StdRng,
    /// Expected drops per frame; fractional rates carry over.
    pub per_frame: f32,
    pub radius: f32,
    pub scale: f32,
    carry: f32,
}

impl Raindrops {
    pub fn new(seed: u64, per_frame: f32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            per_frame,
            radius: 0.15,
            scale: 0.3,
            carry: 0.0,
        }
    }

    /// Number of drops to release this frame.
    fn drops_this_frame(&mut self) -> u32 {
        self.carry += self.per_frame;
        let count = self.carry.floor();
        self.carry -= count;
        count as u32
    }
}

pub fn register_systems(app: &mut App) {
    app.add_systems(Startup, spawn_emitters)
        .add_systems(
            Update,
            (advance_clock, bob_emitters)
                .chain()
                .before(LiquidSet::Submit),
        )
        .add_systems(Update, release_raindrops.in_set(LiquidSet::Submit));
}

fn spawn_emitters(mut commands: Commands, config: Res<LiquidConfig>) {
    let Ok(domain) = config.domain() else {
        return;
    };
    let area = domain.area();
    let centre = Vec3::new(
        (area.min_x + area.max_x) * 0.5,
        domain.surface_y(),
        (area.min_z + area.max_z) * 0.5,
    );
    let span = (area.max_x - area.min_x).min(area.max_z - area.min_z);

    let emitters = [
        (Vec3::new(-0.25, 0.0, -0.2), Vec3::splat(0.06), 0.35, 0.7, 0.0),
        (Vec3::new(0.2, 0.0, 0.15), Vec3::new(0.1, 0.05, 0.04), 0.25, 0.45, 1.3),
        (Vec3::new(0.05, 0.0, -0.3), Vec3::splat(0.04), 0.3, 1.1, 2.1),
    ];
    for (offset, half_extents, amplitude, frequency, phase) in emitters {
        let anchor = centre + offset * span;
        commands.spawn((
            LiquidForceEmitter::new(ForceMesh::cuboid(half_extents * span)),
            Bobbing {
                anchor,
                amplitude: amplitude * domain.depth,
                frequency,
                phase,
            },
            Transform::from_translation(anchor),
        ));
    }
    info!("Spawned {} bobbing liquid emitters", emitters.len());
}

fn advance_clock(mut clock: ResMut<DemoClock>) {
    clock.frame += 1;
}

fn bob_emitters(clock: Res<DemoClock>, mut emitters: Query<(&Bobbing, &mut Transform)>) {
    let time = clock.elapsed();
    for (bobbing, mut transform) in emitters.iter_mut() {
        transform.translation = bobbing.anchor + Vec3::Y * bobbing.offset_at(time);
    }
}

fn release_raindrops(
    mut raindrops: ResMut<Raindrops>,
    registry: Res<LiquidRegistry>,
    simulator: Option<Res<LiquidSimulator>>,
) {
    let Some(simulator) = simulator else {
        return;
    };
    let area = simulator.area();
    let surface = simulator.domain().surface_y();
    let drops = raindrops.drops_this_frame();
    for _ in 0..drops {
        let x = raindrops.rng.gen_range(area.min_x..area.max_x);
        let z = raindrops.rng.gen_range(area.min_z..area.max_z);
        let (radius, scale) = (raindrops.radius, raindrops.scale);
        registry.submit_point(Vec3::new(x, surface, z), radius, scale);
    }
    if drops > 0 {
        log::debug!("Released {} raindrops", drops);
    }
}
