//! Offscreen target allocation.
//!
//! Every texel grid the simulation renders into is leased from a
//! [`RenderTargetPool`]. A lease is returned to the pool when its
//! [`RenderTarget`] is dropped, whichever path tears the simulation down.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bevy_log::debug;

use crate::constants::{DEFAULT_MAX_TARGET_TEXELS, MAX_TARGET_DIMENSION};
use crate::error::LiquidError;
use crate::grid::Grid;

#[derive(Debug)]
struct PoolState {
    budget_texels: usize,
    max_dimension: usize,
    texels_in_use: AtomicUsize,
    live_targets: AtomicUsize,
}

/// Shared texel budget for offscreen targets. Cloning yields another handle to
/// the same pool.
#[derive(Debug, Clone)]
pub struct RenderTargetPool {
    state: Arc<PoolState>,
}

impl Default for RenderTargetPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TARGET_TEXELS, MAX_TARGET_DIMENSION)
    }
}

impl RenderTargetPool {
    pub fn new(budget_texels: usize, max_dimension: usize) -> Self {
        Self {
            state: Arc::new(PoolState {
                budget_texels,
                max_dimension,
                texels_in_use: AtomicUsize::new(0),
                live_targets: AtomicUsize::new(0),
            }),
        }
    }

    /// Leases a zero-cleared `size x size` target.
    pub fn acquire<T: Copy + Default>(
        &self,
        name: &'static str,
        size: usize,
    ) -> Result<RenderTarget<T>, LiquidError> {
        if size == 0 {
            return Err(LiquidError::resource(name, "target size must be non-zero"));
        }
        if size > self.state.max_dimension {
            return Err(LiquidError::resource(
                name,
                format!(
                    "{size}x{size} exceeds the maximum target dimension {}",
                    self.state.max_dimension
                ),
            ));
        }

        let texels = size * size;
        let budget = self.state.budget_texels;
        self.state
            .texels_in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(texels).filter(|total| *total <= budget)
            })
            .map_err(|used| {
                LiquidError::resource(
                    name,
                    format!("{texels} texels requested, {used} of {budget} already in use"),
                )
            })?;
        self.state.live_targets.fetch_add(1, Ordering::AcqRel);

        debug!("Acquired liquid target {} ({}x{})", name, size, size);

        Ok(RenderTarget {
            grid: Grid::new(size),
            _lease: Lease {
                state: Arc::clone(&self.state),
                texels,
            },
        })
    }

    pub fn texels_in_use(&self) -> usize {
        self.state.texels_in_use.load(Ordering::Acquire)
    }

    pub fn live_targets(&self) -> usize {
        self.state.live_targets.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct Lease {
    state: Arc<PoolState>,
    texels: usize,
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.state
            .texels_in_use
            .fetch_sub(self.texels, Ordering::AcqRel);
        self.state.live_targets.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A leased texel grid. Dereferences to its [`Grid`].
#[derive(Debug)]
pub struct RenderTarget<T> {
    grid: Grid<T>,
    _lease: Lease,
}

impl<T: Copy + Default> RenderTarget<T> {
    /// Resets every texel to `T::default()`.
    pub fn clear(&mut self) {
        self.grid.fill(T::default());
    }
}

impl<T> Deref for RenderTarget<T> {
    type Target = Grid<T>;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}

impl<T> DerefMut for RenderTarget<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.grid
    }
}
