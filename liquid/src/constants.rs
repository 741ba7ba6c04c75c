/// Global binding holding the height field of the active liquid.
pub const LIQUID_HEIGHT_MAP: &str = "_LiquidHeightMap";
/// Global binding holding the encoded normal field of the active liquid.
pub const LIQUID_NORMAL_MAP: &str = "_LiquidNormalMap";
/// Global vector binding `(min_x, min_z, max_x, max_z)` of the liquid domain.
pub const LIQUID_AREA: &str = "_LiquidArea";
/// Global scalar binding carrying the force scale factor.
pub const LIQUID_FORCE: &str = "internal_Force";

pub const DEFAULT_FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Relative slack on the stability comparison. At a wave speed of exactly 1.0
/// the bound equals the timestep analytically, so rounding must not flip it.
pub const STABILITY_TOLERANCE: f64 = 1e-4;

/// Largest edge length accepted for an offscreen target.
pub const MAX_TARGET_DIMENSION: usize = 8192;
/// Default texel budget shared by all targets of one pool.
pub const DEFAULT_MAX_TARGET_TEXELS: usize = 16 * 2048 * 2048;

pub const TARGET_FORCE: &str = "liquid.force";
pub const TARGET_HEIGHT_PREVIOUS: &str = "liquid.height.previous";
pub const TARGET_HEIGHT_CURRENT: &str = "liquid.height.current";
pub const TARGET_HEIGHT_NEXT: &str = "liquid.height.next";
pub const TARGET_NORMALS: &str = "liquid.normals";
