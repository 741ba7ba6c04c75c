use std::sync::Arc;

use bevy::math::{Mat4, Vec3, Vec4};
use liquid::{
    decode_normal, GlobalTexture, LiquidConfig, LiquidError, LiquidSimulator, RenderTargetPool,
    ShadingGlobals, LIQUID_AREA, LIQUID_FORCE, LIQUID_HEIGHT_MAP, LIQUID_NORMAL_MAP,
};

fn ripple_config() -> LiquidConfig {
    LiquidConfig {
        position: Vec3::ZERO,
        width: 10.0,
        length: 10.0,
        depth: 2.0,
        resolution: 64,
        wave_speed: 1.0,
        viscosity: 0.5,
        force_factor: 1.0,
        fixed_timestep: 1.0 / 60.0,
        ..Default::default()
    }
}

#[test]
fn test_point_impulse_spreads_and_decays() {
    let pool = RenderTargetPool::default();
    let mut simulator = LiquidSimulator::new(&ripple_config(), &pool).unwrap();
    let mut globals = ShadingGlobals::default();

    // Cone of radius 0.3 around the origin covers texels 30..=33 on each axis.
    simulator
        .submitter()
        .submit_point(Vec3::ZERO, 0.3, 1.0);

    let mut centre = Vec::new();
    let mut peak = Vec::new();
    let mut ring = Vec::new();
    for _ in 0..11 {
        simulator.render_frame(&mut globals);
        let heights = simulator.heights();
        centre.push(heights.get(32, 32).abs());
        peak.push(heights.max_abs());
        ring.push(heights.get(36, 32));
        // Nothing travels faster than one texel per step.
        assert_eq!(heights.get(45, 32), 0.0);
        assert_eq!(heights.get(32, 45), 0.0);
        assert_eq!(heights.get(0, 0), 0.0);
    }

    assert!(centre[0] > 0.5);
    for pair in centre.windows(2) {
        assert!(pair[1] < pair[0], "centre grew: {centre:?}");
    }
    for pair in peak.windows(2) {
        assert!(pair[1] <= pair[0], "peak grew: {peak:?}");
    }

    assert_eq!(ring[0], 0.0);
    assert_eq!(ring[1], 0.0);
    assert!(ring[2].abs() > 1e-3);
    assert!(ring.iter().skip(2).all(|h| *h != 0.0));
}

#[test]
fn test_ripple_is_symmetric() {
    let pool = RenderTargetPool::default();
    let mut simulator = LiquidSimulator::new(&ripple_config(), &pool).unwrap();
    let mut globals = ShadingGlobals::default();
    simulator.submitter().submit_point(Vec3::ZERO, 0.3, 1.0);
    for _ in 0..6 {
        simulator.render_frame(&mut globals);
    }

    let heights = simulator.heights();
    for offset in 0..8 {
        let left = heights.get(31 - offset, 31);
        let right = heights.get(32 + offset, 31);
        let down = heights.get(31, 31 - offset);
        assert!((left - right).abs() < 1e-5);
        assert!((left - down).abs() < 1e-5);
    }
}

#[test]
fn test_zero_depth_is_rejected() {
    let pool = RenderTargetPool::default();
    let config = LiquidConfig {
        depth: 0.0,
        ..ripple_config()
    };
    let err = LiquidSimulator::new(&config, &pool).err().unwrap();
    assert!(matches!(
        err,
        LiquidError::Configuration {
            parameter: "depth",
            ..
        }
    ));
    assert_eq!(pool.live_targets(), 0);
}

#[test]
fn test_unstable_speed_is_rejected() {
    let pool = RenderTargetPool::default();
    let config = LiquidConfig {
        wave_speed: 1.2,
        ..ripple_config()
    };
    let err = LiquidSimulator::new(&config, &pool).err().unwrap();
    match err {
        LiquidError::Stability {
            wave_speed,
            bound,
            timestep,
            ..
        } => {
            assert_eq!(wave_speed, 1.2);
            assert!(bound < timestep);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_rest_surface_stays_flat() {
    let pool = RenderTargetPool::default();
    let mut simulator = LiquidSimulator::new(&ripple_config(), &pool).unwrap();
    let mut globals = ShadingGlobals::default();
    for _ in 0..120 {
        simulator.render_frame(&mut globals);
    }
    assert_eq!(simulator.heights().max_abs(), 0.0);
    assert!(simulator
        .normals()
        .iter()
        .all(|n| (*n - Vec3::Y).length() < 1e-6));
}

#[test]
fn test_submerged_box_pushes_surface() {
    let pool = RenderTargetPool::default();
    let mut simulator = LiquidSimulator::new(&ripple_config(), &pool).unwrap();
    let mut globals = ShadingGlobals::default();

    let cube = Arc::new(liquid::ForceMesh::cuboid(Vec3::splat(0.5)));
    // Bottom face one metre below the surface: half the liquid depth.
    let transform = Mat4::from_translation(Vec3::new(2.0, -0.5, -1.0));
    simulator.submitter().submit_mesh(cube.clone(), transform);
    // Entirely above the surface: contributes nothing.
    simulator
        .submitter()
        .submit_mesh(cube, Mat4::from_translation(Vec3::new(-2.0, 3.0, 0.0)));
    simulator.render_frame(&mut globals);

    let force = simulator.force();
    let (x, z) = simulator.domain().texel_at(2.0, -1.0).unwrap();
    assert!((force.get(x, z) - 0.5).abs() < 1e-5);
    let (x, z) = simulator.domain().texel_at(-2.0, 0.0).unwrap();
    assert_eq!(force.get(x, z), 0.0);
}

#[test]
fn test_published_frame_is_consistent() {
    let pool = RenderTargetPool::default();
    let mut simulator = LiquidSimulator::new(&ripple_config(), &pool).unwrap();
    let mut globals = ShadingGlobals::default();

    simulator.submitter().submit_point(Vec3::ZERO, 0.3, 1.0);
    simulator.render_frame(&mut globals);
    let first = globals.snapshot().unwrap();
    simulator.render_frame(&mut globals);
    let second = globals.snapshot().unwrap();

    assert_eq!(first.frame, 0);
    assert_eq!(second.frame, 1);

    let height = |frame: &liquid::ShadingFrame| match &frame.textures[LIQUID_HEIGHT_MAP] {
        GlobalTexture::Scalar(grid) => grid.get(32, 32),
        GlobalTexture::Rgba(_) => panic!("height map must be scalar"),
    };
    assert_ne!(height(first.as_ref()), height(second.as_ref()));

    // The earlier snapshot still pairs its own heights with its own normals.
    let normals = first.textures[LIQUID_NORMAL_MAP].as_rgba().unwrap();
    let heights = first.textures[LIQUID_HEIGHT_MAP].as_scalar().unwrap();
    let texel = 10.0 / 64.0;
    let dx = heights.get(34, 32) - heights.get(32, 32);
    let dz = heights.get(33, 33) - heights.get(33, 31);
    let expected =
        Vec3::new(-2.0 * texel * dx, 4.0 * texel * texel, -2.0 * texel * dz).normalize();
    let n = decode_normal(normals.get(33, 32));
    assert!((n - expected).length() < 1e-5);

    assert_eq!(
        globals.vector(LIQUID_AREA),
        Some(Vec4::new(-5.0, -5.0, 5.0, 5.0))
    );
    assert_eq!(globals.scalar(LIQUID_FORCE), Some(1.0));
}

#[test]
fn test_mask_file_blocks_forcing() {
    let path = std::env::temp_dir().join(format!("liquid_mask_{}.png", std::process::id()));
    let image = image::RgbaImage::from_fn(2, 1, |x, _| {
        if x == 0 {
            image::Rgba([255, 255, 255, 0])
        } else {
            image::Rgba([255, 255, 255, 255])
        }
    });
    image.save(&path).unwrap();

    let pool = RenderTargetPool::default();
    let config = LiquidConfig {
        mask: Some(path.clone()),
        ..ripple_config()
    };
    let mut simulator = LiquidSimulator::new(&config, &pool).unwrap();
    std::fs::remove_file(&path).unwrap();
    let mut globals = ShadingGlobals::default();

    let floor = Arc::new(liquid::ForceMesh::quad(5.0, 5.0));
    simulator
        .submitter()
        .submit_mesh(floor, Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)));
    simulator.render_frame(&mut globals);

    let force = simulator.force();
    for z in [0, 31, 63] {
        assert_eq!(force.get(10, z), 0.0);
        assert_eq!(force.get(31, z), 0.0);
        assert!((force.get(32, z) - 0.5).abs() < 1e-5);
        assert!((force.get(60, z) - 0.5).abs() < 1e-5);
    }
}

#[test]
fn test_missing_mask_is_configuration_error() {
    let pool = RenderTargetPool::default();
    let config = LiquidConfig {
        mask: Some("/nonexistent/liquid_mask.png".into()),
        ..ripple_config()
    };
    let err = LiquidSimulator::new(&config, &pool).err().unwrap();
    assert_eq!(err.parameter(), Some("mask"));
    assert_eq!(pool.live_targets(), 0);
}

#[test]
fn test_targets_returned_on_drop() {
    let pool = RenderTargetPool::default();
    {
        let mut simulator = LiquidSimulator::new(&ripple_config(), &pool).unwrap();
        let mut globals = ShadingGlobals::default();
        simulator.render_frame(&mut globals);
        assert_eq!(pool.texels_in_use(), 5 * 64 * 64);
    }
    assert_eq!(pool.texels_in_use(), 0);
    assert_eq!(pool.live_targets(), 0);
}

#[test]
fn test_rejected_runtime_update_keeps_coefficients() {
    let pool = RenderTargetPool::default();
    let mut simulator = LiquidSimulator::new(&ripple_config(), &pool).unwrap();
    let before = *simulator.wave_parameters();

    let err = simulator.set_wave_parameters(1.5, 0.5).err().unwrap();
    assert!(matches!(err, LiquidError::Stability { .. }));
    assert_eq!(*simulator.wave_parameters(), before);

    let updated = *simulator.set_wave_parameters(0.5, 0.5).unwrap();
    assert!(updated.k1 < before.k1);
    assert!((4.0 * updated.k1 + updated.k2 + updated.k3 - 1.0).abs() < 1e-5);
}
