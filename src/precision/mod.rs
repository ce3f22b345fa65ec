//! Double-precision emulation for vertex math far from the origin.
//!
//! World positions are stored once as a [`SplitCoordinate`] (two `f32`
//! triples). Every frame, the camera's split position is subtracted
//! component-wise before anything is summed, so intermediate values stay in
//! the camera's neighbourhood where single precision is enough.

pub mod rte;
pub mod split;

pub use rte::{camera_relative_delta, rte_view_matrix, step, RteTransform, HIGH_DIFF_THRESHOLD};
pub use split::SplitCoordinate;
