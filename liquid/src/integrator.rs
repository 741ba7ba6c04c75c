//! Height field integration.
//!
//! Three buffers rotate through the roles previous / current / next. A step
//! adds the frame's force to the current buffer, evaluates the wave stencil
//! into the next buffer and then rotates: the forced current becomes previous,
//! next becomes current. Nothing is reallocated.

use std::mem;

use crate::force::ForceBuffer;
use crate::grid::Grid;
use crate::stability::WaveParameters;
use crate::targets::RenderTarget;

/// Scalar surface displacement per texel.
pub type HeightField = Grid<f32>;

pub struct HeightFieldIntegrator {
    previous: RenderTarget<f32>,
    current: RenderTarget<f32>,
    next: RenderTarget<f32>,
    steps: u64,
}

impl HeightFieldIntegrator {
    /// Takes ownership of three zero-cleared targets of equal size.
    pub fn new(
        previous: RenderTarget<f32>,
        current: RenderTarget<f32>,
        next: RenderTarget<f32>,
    ) -> Self {
        debug_assert!(previous.size() == current.size() && current.size() == next.size());
        Self {
            previous,
            current,
            next,
            steps: 0,
        }
    }

    /// Advances the surface by one fixed timestep.
    ///
    /// `params` must come from a successful [`crate::stability::solve`].
    pub fn step(&mut self, force: &ForceBuffer, params: &WaveParameters) -> &HeightField {
        debug_assert_eq!(force.size(), self.current.size());

        // Force perturbs the current state before the stencil runs, so an
        // impulse is damped from the step it is applied in.
        for (height, f) in self.current.as_mut_slice().iter_mut().zip(force.iter()) {
            *height += f;
        }

        let size = self.current.size();
        for z in 0..size {
            for x in 0..size {
                let [left, right, down, up] = self.current.neighbours(x, z);
                let value = params.apply(
                    left + right + down + up,
                    self.previous.get(x, z),
                    self.current.get(x, z),
                );
                self.next.set(x, z, value);
            }
        }

        mem::swap(&mut self.previous, &mut self.current);
        mem::swap(&mut self.current, &mut self.next);
        self.steps += 1;

        &self.current
    }

    /// The latest height field.
    pub fn heights(&self) -> &HeightField {
        &self.current
    }

    /// The field from one step earlier, including the force injected then.
    pub fn previous(&self) -> &HeightField {
        &self.previous
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Returns the liquid to rest.
    pub fn reset(&mut self) {
        self.previous.clear();
        self.current.clear();
        self.next.clear();
        self.steps = 0;
    }
}
