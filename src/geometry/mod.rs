pub mod hit_testing;
pub mod transform;

pub use transform::{Reprojection, bounding_box, rect_to_native, selection_outline, to_native};

/// Layers and crop boxes never get smaller than this many workspace pixels on either axis
pub const MIN_LAYER_SIZE: f32 = 20.0;

/// Values within this distance are treated as equal when checking geometric invariants
pub const GEOMETRY_EPSILON: f32 = 1e-3;
