//! Global shading inputs.
//!
//! Each frame the simulator publishes one [`ShadingFrame`] holding every named
//! input. Publication replaces the whole frame, so a reader always sees height
//! and normal maps from the same step.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::math::Vec4;
use bevy_ecs::resource::Resource;

use crate::grid::Grid;

/// A texture-valued shading input.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalTexture {
    Scalar(Grid<f32>),
    Rgba(Grid<Vec4>),
}

impl GlobalTexture {
    pub fn size(&self) -> usize {
        match self {
            GlobalTexture::Scalar(grid) => grid.size(),
            GlobalTexture::Rgba(grid) => grid.size(),
        }
    }

    pub fn as_scalar(&self) -> Option<&Grid<f32>> {
        match self {
            GlobalTexture::Scalar(grid) => Some(grid),
            GlobalTexture::Rgba(_) => None,
        }
    }

    pub fn as_rgba(&self) -> Option<&Grid<Vec4>> {
        match self {
            GlobalTexture::Rgba(grid) => Some(grid),
            GlobalTexture::Scalar(_) => None,
        }
    }
}

/// Everything published for one simulated frame.
#[derive(Debug, Clone, Default)]
pub struct ShadingFrame {
    pub frame: u64,
    pub textures: HashMap<&'static str, GlobalTexture>,
    pub vectors: HashMap<&'static str, Vec4>,
    pub scalars: HashMap<&'static str, f32>,
}

impl ShadingFrame {
    pub fn new(frame: u64) -> Self {
        Self {
            frame,
            ..Default::default()
        }
    }

    pub fn with_texture(mut self, name: &'static str, texture: GlobalTexture) -> Self {
        self.textures.insert(name, texture);
        self
    }

    pub fn with_vector(mut self, name: &'static str, value: Vec4) -> Self {
        self.vectors.insert(name, value);
        self
    }

    pub fn with_scalar(mut self, name: &'static str, value: f32) -> Self {
        self.scalars.insert(name, value);
        self
    }
}

/// Name-keyed store read by the shading pipeline. Empty until a liquid
/// publishes; readers fall back to flat defaults on `None`.
#[derive(Resource, Debug, Clone, Default)]
pub struct ShadingGlobals {
    current: Option<Arc<ShadingFrame>>,
}

impl ShadingGlobals {
    /// Replaces the published frame as a whole.
    pub fn publish(&mut self, frame: ShadingFrame) {
        self.current = Some(Arc::new(frame));
    }

    /// A handle to the published frame that stays consistent even if a newer
    /// frame is published afterwards.
    pub fn snapshot(&self) -> Option<Arc<ShadingFrame>> {
        self.current.clone()
    }

    pub fn is_published(&self) -> bool {
        self.current.is_some()
    }

    pub fn frame(&self) -> Option<u64> {
        self.current.as_ref().map(|f| f.frame)
    }

    pub fn texture(&self, name: &str) -> Option<&GlobalTexture> {
        self.current.as_ref()?.textures.get(name)
    }

    pub fn vector(&self, name: &str) -> Option<Vec4> {
        self.current.as_ref()?.vectors.get(name).copied()
    }

    pub fn scalar(&self, name: &str) -> Option<f32> {
        self.current.as_ref()?.scalars.get(name).copied()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
