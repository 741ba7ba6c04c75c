//! Real-time liquid surface simulation.
//!
//! A damped 2D wave equation is integrated over an `N x N` height field. Scene
//! geometry dipping below the surface is rasterised into a force buffer that
//! perturbs the field, a normal field is derived from the heights, and both are
//! published as global shading inputs every frame.

pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod force;
pub mod grid;
pub mod integrator;
pub mod mask;
pub mod normals;
pub mod plugin;
pub mod registry;
pub mod sets;
pub mod shading;
pub mod simulator;
pub mod stability;
pub mod targets;

pub use config::LiquidConfig;
pub use constants::*;
pub use domain::{LiquidAreaRect, SimulationDomain};
pub use error::LiquidError;
pub use force::{ForceBuffer, ForceDraw, ForceInjectionPass, ForceMesh, Renderable};
pub use grid::Grid;
pub use integrator::{HeightField, HeightFieldIntegrator};
pub use mask::ForceMask;
pub use normals::{decode_normal, encode_normal, NormalField, NormalFieldGenerator};
pub use plugin::{
    ActiveLiquid, LiquidForceEmitter, LiquidPlugin, LiquidSettings, LiquidTargets,
    SetWaveParameters,
};
pub use registry::{ForceSubmitter, LiquidHandle, LiquidRegistry};
pub use sets::LiquidSet;
pub use shading::{GlobalTexture, ShadingFrame, ShadingGlobals};
pub use simulator::LiquidSimulator;
pub use stability::{solve, WaveParameters};
pub use targets::{RenderTarget, RenderTargetPool};
