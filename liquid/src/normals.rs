//! Surface normals from the height field.
//!
//! ```text
//!            h[i, j+1]
//!               |
//!  h[i-1, j] -- x -- h[i+1, j]      Tx = (2 sx, h[i+1,j] - h[i-1,j], 0)
//!               |                   Tz = (0, h[i,j+1] - h[i,j-1], 2 sz)
//!            h[i, j-1]              n  = normalize(Tz x Tx)
//! ```
//!
//! `sx` and `sz` are the world-space texel sizes, so slopes are measured in
//! world units. Missing neighbours at the border take the edge value.

use bevy::math::{Vec2, Vec3, Vec4};

use crate::grid::Grid;
use crate::integrator::HeightField;
use crate::targets::RenderTarget;

/// Unit surface normal per texel.
pub type NormalField = Grid<Vec3>;

/// Packs a unit normal into the `[0, 1]` colour range, alpha 1.
#[inline]
pub fn encode_normal(normal: Vec3) -> Vec4 {
    (normal * 0.5 + Vec3::splat(0.5)).extend(1.0)
}

/// Inverse of [`encode_normal`].
#[inline]
pub fn decode_normal(encoded: Vec4) -> Vec3 {
    encoded.truncate() * 2.0 - Vec3::ONE
}

pub struct NormalFieldGenerator {
    target: RenderTarget<Vec3>,
    texel_size: Vec2,
}

impl NormalFieldGenerator {
    pub fn new(target: RenderTarget<Vec3>, texel_size: Vec2) -> Self {
        let mut generator = Self { target, texel_size };
        generator.target.fill(Vec3::Y);
        generator
    }

    /// Recomputes every normal from `heights`.
    pub fn generate(&mut self, heights: &HeightField) -> &NormalField {
        debug_assert_eq!(heights.size(), self.target.size());

        let size = heights.size();
        let span_x = 2.0 * self.texel_size.x;
        let span_z = 2.0 * self.texel_size.y;
        for z in 0..size {
            for x in 0..size {
                let [left, right, down, up] = heights.neighbours(x, z);
                let tangent_x = Vec3::new(span_x, right - left, 0.0);
                let tangent_z = Vec3::new(0.0, up - down, span_z);
                let normal = tangent_z.cross(tangent_x).normalize_or(Vec3::Y);
                self.target.set(x, z, normal);
            }
        }

        &self.target
    }

    pub fn normals(&self) -> &NormalField {
        &self.target
    }

    /// The field in texture encoding.
    pub fn encoded(&self) -> Grid<Vec4> {
        self.target.map(encode_normal)
    }

    pub fn texel_size(&self) -> Vec2 {
        self.texel_size
    }
}
