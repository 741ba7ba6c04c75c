//! Routing of force geometry to liquid bodies.
//!
//! Every simulator owns a [`ForceSubmitter`] queue. Scene code either keeps a
//! submitter handle for a specific liquid or goes through [`LiquidRegistry`],
//! which forwards to whichever liquid is currently active.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bevy::math::{Mat4, Vec3};
use bevy_ecs::resource::Resource;
use bevy_log::info;

use crate::force::{ForceDraw, ForceMesh, Renderable};

/// Cloneable handle to one liquid's pending force draws.
#[derive(Debug, Clone, Default)]
pub struct ForceSubmitter {
    queue: Arc<Mutex<Vec<ForceDraw>>>,
}

impl ForceSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a draw for the next force pass. Draws that cannot contribute
    /// are dropped here. Returns whether the draw was queued.
    pub fn submit(&self, draw: ForceDraw) -> bool {
        if !draw.is_valid() {
            log::debug!("Ignoring invalid liquid force draw");
            return false;
        }
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(draw);
        true
    }

    pub fn submit_renderable(&self, renderable: Renderable) -> bool {
        self.submit(ForceDraw::Renderable(renderable))
    }

    pub fn submit_mesh(&self, mesh: Arc<ForceMesh>, transform: Mat4) -> bool {
        self.submit(ForceDraw::Mesh { mesh, transform })
    }

    pub fn submit_point(&self, position: Vec3, radius: f32, scale: f32) -> bool {
        self.submit(ForceDraw::Point {
            position,
            radius,
            scale,
        })
    }

    /// Takes everything queued so far.
    pub fn drain(&self) -> Vec<ForceDraw> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiquidHandle(pub u32);

/// Known liquid bodies and the one currently receiving routed submissions.
#[derive(Resource, Debug, Default)]
pub struct LiquidRegistry {
    domains: HashMap<LiquidHandle, ForceSubmitter>,
    active: Option<LiquidHandle>,
    next_id: u32,
}

impl LiquidRegistry {
    /// Registers a liquid. The first registered liquid becomes active.
    pub fn register(&mut self, submitter: ForceSubmitter) -> LiquidHandle {
        let handle = LiquidHandle(self.next_id);
        self.next_id += 1;
        self.domains.insert(handle, submitter);
        if self.active.is_none() {
            self.active = Some(handle);
        }
        info!("Registered liquid {:?}", handle);
        handle
    }

    pub fn unregister(&mut self, handle: LiquidHandle) -> Option<ForceSubmitter> {
        let removed = self.domains.remove(&handle);
        if self.active == Some(handle) {
            self.active = None;
        }
        removed
    }

    /// Makes `handle` the routing target. Unknown handles are refused.
    pub fn set_active(&mut self, handle: LiquidHandle) -> bool {
        if self.domains.contains_key(&handle) {
            self.active = Some(handle);
            true
        } else {
            false
        }
    }

    pub fn active(&self) -> Option<LiquidHandle> {
        self.active
    }

    pub fn submitter(&self, handle: LiquidHandle) -> Option<&ForceSubmitter> {
        self.domains.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    fn active_submitter(&self) -> Option<&ForceSubmitter> {
        self.active.and_then(|handle| self.domains.get(&handle))
    }

    /// Routes to the active liquid. A no-op without one.
    pub fn submit(&self, draw: ForceDraw) -> bool {
        self.active_submitter()
            .is_some_and(|submitter| submitter.submit(draw))
    }

    pub fn submit_renderable(&self, renderable: Renderable) -> bool {
        self.submit(ForceDraw::Renderable(renderable))
    }

    pub fn submit_mesh(&self, mesh: Arc<ForceMesh>, transform: Mat4) -> bool {
        self.submit(ForceDraw::Mesh { mesh, transform })
    }

    pub fn submit_point(&self, position: Vec3, radius: f32, scale: f32) -> bool {
        self.submit(ForceDraw::Point {
            position,
            radius,
            scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submitter_drops_invalid_draws() {
        let submitter = ForceSubmitter::new();
        assert!(submitter.submit_point(Vec3::ZERO, 1.0, 1.0));
        assert!(!submitter.submit_point(Vec3::ZERO, 0.0, 1.0));
        assert!(!submitter.submit_mesh(Arc::new(ForceMesh::default()), Mat4::IDENTITY));
        assert!(!submitter.submit_renderable(Renderable {
            mesh: Arc::new(ForceMesh::cuboid(Vec3::ONE)),
            transform: Mat4::IDENTITY,
            visible: false,
        }));
        assert_eq!(submitter.pending(), 1);
        assert_eq!(submitter.drain().len(), 1);
        assert_eq!(submitter.pending(), 0);
    }

    #[test]
    fn test_clones_share_queue() {
        let submitter = ForceSubmitter::new();
        let other = submitter.clone();
        other.submit_point(Vec3::ZERO, 1.0, 1.0);
        assert_eq!(submitter.pending(), 1);
    }

    #[test]
    fn test_no_active_domain_is_noop() {
        let registry = LiquidRegistry::default();
        assert!(!registry.submit_point(Vec3::ZERO, 1.0, 1.0));
    }

    #[test]
    fn test_routes_to_active_domain() {
        let mut registry = LiquidRegistry::default();
        let first = ForceSubmitter::new();
        let second = ForceSubmitter::new();
        let a = registry.register(first.clone());
        let b = registry.register(second.clone());
        assert_eq!(registry.active(), Some(a));

        registry.submit_point(Vec3::ZERO, 1.0, 1.0);
        assert!(registry.set_active(b));
        registry.submit_mesh(Arc::new(ForceMesh::quad(1.0, 1.0)), Mat4::IDENTITY);
        assert_eq!(first.pending(), 1);
        assert_eq!(second.pending(), 1);

        registry.unregister(b);
        assert_eq!(registry.active(), None);
        assert!(!registry.set_active(b));
        assert_eq!(registry.len(), 1);
    }
}
