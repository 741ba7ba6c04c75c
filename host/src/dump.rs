//! PNG snapshots of the published shading inputs.
//!
//! Image row 0 is the +Z edge of the liquid, matching how force masks are read.

use std::fs;
use std::path::{Path, PathBuf};

use bevy::math::Vec4;
use bevy_log::info;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use liquid::{Grid, ShadingGlobals, LIQUID_HEIGHT_MAP, LIQUID_NORMAL_MAP};

pub const HEIGHT_FILE: &str = "liquid_height.png";
pub const NORMAL_FILE: &str = "liquid_normal.png";

/// Heights mapped symmetrically around mid grey, so the flat surface is 128.
pub fn height_image(heights: &Grid<f32>) -> GrayImage {
    let size = heights.size() as u32;
    let peak = heights.max_abs();
    let scale = if peak > 0.0 { 0.5 / peak } else { 0.0 };
    GrayImage::from_fn(size, size, |x, y| {
        let h = heights.get(x as usize, (size - 1 - y) as usize);
        Luma([to_byte(0.5 + h * scale)])
    })
}

/// Encoded normals written as they would be sampled from the texture.
pub fn normal_image(normals: &Grid<Vec4>) -> RgbaImage {
    let size = normals.size() as u32;
    RgbaImage::from_fn(size, size, |x, y| {
        let n = normals.get(x as usize, (size - 1 - y) as usize);
        Rgba([to_byte(n.x), to_byte(n.y), to_byte(n.z), to_byte(n.w)])
    })
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Writes the published height and normal maps into `dir`. Returns the
/// written paths; nothing is written while no liquid has published.
pub fn dump_shading_inputs(
    globals: &ShadingGlobals,
    dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let Some(frame) = globals.snapshot() else {
        info!("No liquid frame published, nothing to dump");
        return Ok(Vec::new());
    };
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    if let Some(heights) = frame
        .textures
        .get(LIQUID_HEIGHT_MAP)
        .and_then(|texture| texture.as_scalar())
    {
        let path = dir.join(HEIGHT_FILE);
        height_image(heights).save(&path)?;
        written.push(path);
    }
    if let Some(normals) = frame
        .textures
        .get(LIQUID_NORMAL_MAP)
        .and_then(|texture| texture.as_rgba())
    {
        let path = dir.join(NORMAL_FILE);
        normal_image(normals).save(&path)?;
        written.push(path);
    }

    info!(
        "Dumped liquid frame {} to {}",
        frame.frame,
        dir.display()
    );
    Ok(written)
}
