//! World-space extents of a liquid body and the mapping onto its texel grid.
//!
//! The surface plane sits at `position.y`, the volume extends `depth` units
//! below it, and the X/Z extents are centred on `position`.

use bevy::math::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Validated, immutable description of the simulated volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationDomain {
    pub position: Vec3,
    pub width: f32,
    pub length: f32,
    pub depth: f32,
    /// Height field samples along each axis.
    pub resolution: usize,
    /// Subdivision size of the visual surface mesh.
    pub cell_size: f32,
}

impl SimulationDomain {
    /// Y coordinate of the undisturbed surface.
    #[inline]
    pub fn surface_y(&self) -> f32 {
        self.position.y
    }

    /// Texel spacing in normalised texture space, `1 / N`.
    #[inline]
    pub fn sample_spacing(&self) -> f32 {
        1.0 / self.resolution as f32
    }

    /// World-space size of one texel along X and Z.
    #[inline]
    pub fn texel_size(&self) -> Vec2 {
        Vec2::new(
            self.width / self.resolution as f32,
            self.length / self.resolution as f32,
        )
    }

    pub fn area(&self) -> LiquidAreaRect {
        LiquidAreaRect::from_domain(self)
    }

    /// World X/Z of the centre of texel `(x, z)`.
    pub fn texel_center(&self, x: usize, z: usize) -> Vec2 {
        let area = self.area();
        let texel = self.texel_size();
        Vec2::new(
            area.min_x + (x as f32 + 0.5) * texel.x,
            area.min_z + (z as f32 + 0.5) * texel.y,
        )
    }

    /// Continuous texel coordinates of a world X/Z point; texel centres land
    /// on whole numbers.
    pub fn world_to_texel(&self, world_x: f32, world_z: f32) -> Vec2 {
        let area = self.area();
        let texel = self.texel_size();
        Vec2::new(
            (world_x - area.min_x) / texel.x - 0.5,
            (world_z - area.min_z) / texel.y - 0.5,
        )
    }

    /// Texel containing the world X/Z point, if it lies inside the domain.
    pub fn texel_at(&self, world_x: f32, world_z: f32) -> Option<(usize, usize)> {
        if !self.area().contains(world_x, world_z) {
            return None;
        }
        let t = self.world_to_texel(world_x, world_z) + Vec2::splat(0.5);
        let last = self.resolution - 1;
        Some(((t.x as usize).min(last), (t.y as usize).min(last)))
    }

    /// Number of surface mesh cells along X and Z.
    pub fn mesh_cells(&self) -> (usize, usize) {
        (
            (self.width / self.cell_size).ceil().max(1.0) as usize,
            (self.length / self.cell_size).ceil().max(1.0) as usize,
        )
    }
}

/// Axis-aligned X/Z bounds of the liquid, published as `_LiquidArea`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidAreaRect {
    pub min_x: f32,
    pub min_z: f32,
    pub max_x: f32,
    pub max_z: f32,
}

impl LiquidAreaRect {
    pub fn from_domain(domain: &SimulationDomain) -> Self {
        let half_width = domain.width * 0.5;
        let half_length = domain.length * 0.5;
        Self {
            min_x: domain.position.x - half_width,
            min_z: domain.position.z - half_length,
            max_x: domain.position.x + half_width,
            max_z: domain.position.z + half_length,
        }
    }

    #[inline]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    /// Packed as `(min_x, min_z, max_x, max_z)`.
    pub fn to_vec4(&self) -> Vec4 {
        Vec4::new(self.min_x, self.min_z, self.max_x, self.max_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> SimulationDomain {
        SimulationDomain {
            position: Vec3::new(5.0, 1.0, -2.0),
            width: 10.0,
            length: 4.0,
            depth: 2.0,
            resolution: 8,
            cell_size: 0.3,
        }
    }

    #[test]
    fn test_area_is_centred_on_position() {
        let area = domain().area();
        assert_eq!(area.to_vec4(), Vec4::new(0.0, -4.0, 10.0, 0.0));
        assert!(area.contains(5.0, -2.0));
        assert!(!area.contains(10.5, -2.0));
    }

    #[test]
    fn test_texel_centers_map_to_whole_numbers() {
        let d = domain();
        let c = d.texel_center(3, 6);
        let t = d.world_to_texel(c.x, c.y);
        assert!((t.x - 3.0).abs() < 1e-5);
        assert!((t.y - 6.0).abs() < 1e-5);
        assert_eq!(d.texel_at(c.x, c.y), Some((3, 6)));
    }

    #[test]
    fn test_texel_at_edges() {
        let d = domain();
        assert_eq!(d.texel_at(10.0, 0.0), Some((7, 7)));
        assert_eq!(d.texel_at(0.0, -4.0), Some((0, 0)));
        assert_eq!(d.texel_at(-0.1, -2.0), None);
    }

    #[test]
    fn test_mesh_cells_round_up() {
        assert_eq!(domain().mesh_cells(), (34, 14));
    }
}
