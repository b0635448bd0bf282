//! Shared widths and limits for every codec layer.

/// Widest scalar axis after bit-source resolution. Explicit bit counts above
/// this are clamped.
pub const MAX_SCALAR_BITS: u32 = 32;

/// Width of a half-float axis (IEEE-754 binary16).
pub const HALF_FLOAT_BITS: u32 = 16;

/// Smallest accepted smallest-three rotation budget.
pub const MIN_ROTATION_BITS: u32 = 16;

/// Largest accepted smallest-three rotation budget.
pub const MAX_ROTATION_BITS: u32 = 64;

/// Bits spent on the index of the dropped quaternion component.
pub const ROTATION_INDEX_BITS: u32 = 2;

/// Capacity of the single-register convenience path.
pub const REGISTER_BITS: u32 = 64;

/// Number of culling levels, `NoCulling` through `Level3`.
pub const CULLING_LEVELS: usize = 4;

/// World bounds at or below this size on any axis trigger a warning.
pub const DEGENERATE_BOUNDS_SIZE: f32 = 1.0;
