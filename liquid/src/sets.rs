use bevy::prelude::*;

/// Per-frame ordering of the liquid systems, chained in declaration order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiquidSet {
    /// Scene geometry is queued for the force pass.
    Submit,
    /// Force pass, integration and normal generation.
    Simulate,
    /// Shading inputs are published and may be read afterwards.
    Publish,
}
