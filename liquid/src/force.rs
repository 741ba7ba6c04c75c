//! Force injection pass.
//!
//! Geometry intersecting the liquid volume is rasterised into an `N x N`
//! target by an orthographic capture looking straight down onto the surface.
//! The near plane is the undisturbed surface and the far plane sits `depth`
//! units below it. Each covered texel receives the fragment's immersion depth,
//! normalised by the liquid depth and scaled by the force factor.
//!
//! Fragments are blended with `max`, so the result never depends on the order
//! in which draws were submitted.

use std::sync::Arc;

use bevy::math::{Mat4, Vec2, Vec3};

use crate::domain::SimulationDomain;
use crate::grid::Grid;
use crate::mask::ForceMask;
use crate::targets::RenderTarget;

/// Per-frame forcing signal consumed by the integrator.
pub type ForceBuffer = Grid<f32>;

/// Triangle list used for force rasterisation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForceMesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl ForceMesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// Axis-aligned box centred on the origin.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let positions = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // -z
            4, 5, 6, 4, 6, 7, // +z
            0, 1, 5, 0, 5, 4, // -y
            3, 7, 6, 3, 6, 2, // +y
            0, 4, 7, 0, 7, 3, // -x
            1, 2, 6, 1, 6, 5, // +x
        ];
        Self { positions, indices }
    }

    /// Horizontal quad in the XZ plane, centred on the origin.
    pub fn quad(half_x: f32, half_z: f32) -> Self {
        Self {
            positions: vec![
                Vec3::new(-half_x, 0.0, -half_z),
                Vec3::new(half_x, 0.0, -half_z),
                Vec3::new(half_x, 0.0, half_z),
                Vec3::new(-half_x, 0.0, half_z),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    /// True when the mesh cannot produce a single triangle or indexes out of
    /// bounds.
    pub fn is_degenerate(&self) -> bool {
        self.indices.len() < 3
            || self.indices.len() % 3 != 0
            || self
                .indices
                .iter()
                .any(|&i| i as usize >= self.positions.len())
            || self.positions.iter().any(|p| !p.is_finite())
    }
}

/// A host renderable surface that should push the liquid.
#[derive(Debug, Clone)]
pub struct Renderable {
    pub mesh: Arc<ForceMesh>,
    /// Local to world transform.
    pub transform: Mat4,
    /// Invisible renderables are not drawn.
    pub visible: bool,
}

/// One draw scheduled for the force pass.
#[derive(Debug, Clone)]
pub enum ForceDraw {
    Renderable(Renderable),
    Mesh { mesh: Arc<ForceMesh>, transform: Mat4 },
    /// Impulse with a linear falloff around `position` (the Y coordinate is
    /// ignored; the impulse acts on the surface below or above the point).
    Point { position: Vec3, radius: f32, scale: f32 },
}

impl ForceDraw {
    /// Whether the draw can contribute anything at all. Invalid draws are
    /// dropped without error.
    pub fn is_valid(&self) -> bool {
        match self {
            ForceDraw::Renderable(r) => {
                r.visible && r.transform.is_finite() && !r.mesh.is_degenerate()
            }
            ForceDraw::Mesh { mesh, transform } => transform.is_finite() && !mesh.is_degenerate(),
            ForceDraw::Point {
                position,
                radius,
                scale,
            } => position.is_finite() && radius.is_finite() && *radius > 0.0 && scale.is_finite(),
        }
    }
}

/// Offscreen pass turning submitted geometry into the per-frame force buffer.
pub struct ForceInjectionPass {
    target: RenderTarget<f32>,
    force_scale: f32,
    mask: Option<ForceMask>,
    draws_this_frame: usize,
    finished: bool,
}

impl ForceInjectionPass {
    pub fn new(target: RenderTarget<f32>, force_scale: f32, mask: Option<ForceMask>) -> Self {
        debug_assert!(mask.as_ref().map_or(true, |m| m.size() == target.size()));
        Self {
            target,
            force_scale,
            mask,
            draws_this_frame: 0,
            finished: false,
        }
    }

    /// Clears the target. Must run before any draw of the frame.
    pub fn begin_frame(&mut self) {
        self.target.clear();
        self.draws_this_frame = 0;
        self.finished = false;
    }

    /// Rasterises one draw. Returns false when the draw was ignored.
    pub fn draw(&mut self, domain: &SimulationDomain, draw: &ForceDraw) -> bool {
        if !draw.is_valid() {
            return false;
        }
        match draw {
            ForceDraw::Renderable(r) => self.draw_mesh(domain, &r.mesh, &r.transform),
            ForceDraw::Mesh { mesh, transform } => self.draw_mesh(domain, mesh, transform),
            ForceDraw::Point {
                position,
                radius,
                scale,
            } => self.draw_point(domain, *position, *radius, *scale),
        }
        self.draws_this_frame += 1;
        true
    }

    /// Rasterises every queued draw, returning how many were drawn.
    pub fn consume<'a>(
        &mut self,
        domain: &SimulationDomain,
        draws: impl IntoIterator<Item = &'a ForceDraw>,
    ) -> usize {
        draws
            .into_iter()
            .filter(|draw| self.draw(domain, draw))
            .count()
    }

    /// Applies the mask and hands out the finished buffer. The mask is applied
    /// once per frame; later calls return the same buffer.
    pub fn finish(&mut self) -> &ForceBuffer {
        if self.finished {
            return &self.target;
        }
        self.finished = true;
        if let Some(mask) = &self.mask {
            mask.apply(&mut self.target);
        }
        if self.draws_this_frame > 0 {
            log::debug!(
                "Force pass drew {} objects, peak force {:.4}",
                self.draws_this_frame,
                self.target.max_abs()
            );
        }
        &self.target
    }

    pub fn buffer(&self) -> &ForceBuffer {
        &self.target
    }

    fn draw_mesh(&mut self, domain: &SimulationDomain, mesh: &ForceMesh, transform: &Mat4) {
        let world: Vec<Vec3> = mesh
            .positions
            .iter()
            .map(|p| transform.transform_point3(*p))
            .collect();

        for tri in mesh.indices.chunks_exact(3) {
            let a = world[tri[0] as usize];
            let b = world[tri[1] as usize];
            let c = world[tri[2] as usize];
            self.rasterise_triangle(domain, [a, b, c]);
        }
    }

    fn rasterise_triangle(&mut self, domain: &SimulationDomain, verts: [Vec3; 3]) {
        let n = domain.resolution;
        let [a, b, c] = verts.map(|v| domain.world_to_texel(v.x, v.z));

        let area = edge(a, b, c);
        if area.abs() <= f32::EPSILON {
            return;
        }

        let lo = a.min(b).min(c);
        let hi = a.max(b).max(c);
        if hi.x < 0.0 || hi.y < 0.0 || lo.x > (n - 1) as f32 || lo.y > (n - 1) as f32 {
            return;
        }
        let x0 = lo.x.ceil().max(0.0) as usize;
        let z0 = lo.y.ceil().max(0.0) as usize;
        let x1 = (hi.x.floor() as usize).min(n - 1);
        let z1 = (hi.y.floor() as usize).min(n - 1);

        let surface = domain.surface_y();
        let inv_depth = 1.0 / domain.depth;

        for z in z0..=z1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32, z as f32);
                // Normalised barycentrics; the sign of `area` absorbs winding.
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let y = w0 * verts[0].y + w1 * verts[1].y + w2 * verts[2].y;
                let immersion = surface - y;
                if !(0.0..=domain.depth).contains(&immersion) {
                    continue;
                }

                let value = immersion * inv_depth * self.force_scale;
                let texel = self.target.get_mut(x, z);
                *texel = texel.max(value);
            }
        }
    }

    fn draw_point(&mut self, domain: &SimulationDomain, position: Vec3, radius: f32, scale: f32) {
        let n = domain.resolution;
        let texel = domain.texel_size();
        let centre = domain.world_to_texel(position.x, position.z);
        let reach = Vec2::new(radius / texel.x, radius / texel.y);

        let lo = centre - reach;
        let hi = centre + reach;
        if hi.x < 0.0 || hi.y < 0.0 || lo.x > (n - 1) as f32 || lo.y > (n - 1) as f32 {
            return;
        }
        let x0 = lo.x.ceil().max(0.0) as usize;
        let z0 = lo.y.ceil().max(0.0) as usize;
        let x1 = (hi.x.floor() as usize).min(n - 1);
        let z1 = (hi.y.floor() as usize).min(n - 1);

        let strength = scale * self.force_scale;
        for z in z0..=z1 {
            for x in x0..=x1 {
                let world = domain.texel_center(x, z);
                let distance = world.distance(Vec2::new(position.x, position.z));
                if distance >= radius {
                    continue;
                }
                let value = strength * (1.0 - distance / radius);
                let out = self.target.get_mut(x, z);
                *out = out.max(value);
            }
        }
    }
}

/// Twice the signed area of `(a, b, p)`.
#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
