//! Relative-to-eye (RTE) transform shared by every vertex stage.

use glam::{Mat4, Vec3, Vec4};

use super::SplitCoordinate;

/// High-part differences shorter than this are dropped by the step mask.
pub const HIGH_DIFF_THRESHOLD: f32 = 1.0;

/// GLSL `step(edge, x)`.
#[inline(always)]
pub fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

/// Camera-relative delta `(posHigh - eyeHigh)·mask + (posLow - eyeLow)`.
///
/// The mask zeroes the high difference when it is shorter than one unit,
/// leaving the fine detail to the low residuals alone.
#[inline]
pub fn camera_relative_delta(position: &SplitCoordinate, eye: &SplitCoordinate) -> Vec3 {
    let high_diff = position.high - eye.high;
    let high_diff = high_diff * step(HIGH_DIFF_THRESHOLD, high_diff.length());
    let low_diff = position.low - eye.low;
    high_diff + low_diff
}

/// Copy of `view` with its translation column reset to `(0, 0, 0, 1)`.
#[inline]
pub fn rte_view_matrix(view: &Mat4) -> Mat4 {
    let mut rte = *view;
    rte.w_axis = Vec4::W;
    rte
}

/// Per-frame RTE state: the translation-free view matrix, the projection and
/// the camera's split position. Built once per frame and shared read-only by
/// every vertex so that neighbouring points are transformed consistently.
#[derive(Copy, Clone, Debug)]
pub struct RteTransform {
    pub view_rte: Mat4,
    pub projection: Mat4,
    pub eye: SplitCoordinate,
}

impl RteTransform {
    pub fn new(view: &Mat4, projection: &Mat4, eye: SplitCoordinate) -> Self {
        Self {
            view_rte: rte_view_matrix(view),
            projection: *projection,
            eye,
        }
    }

    /// Camera-relative delta of a split position against this frame's eye.
    #[inline]
    pub fn relative(&self, position: &SplitCoordinate) -> Vec3 {
        camera_relative_delta(position, &self.eye)
    }

    /// View-space position of an already camera-relative point.
    #[inline]
    pub fn relative_to_view(&self, relative: Vec3) -> Vec4 {
        self.view_rte * relative.extend(1.0)
    }

    /// View-space position of a split position.
    #[inline]
    pub fn view_position(&self, position: &SplitCoordinate) -> Vec4 {
        self.relative_to_view(self.relative(position))
    }

    /// Clip-space position of an already camera-relative point.
    #[inline]
    pub fn relative_to_clip(&self, relative: Vec3) -> Vec4 {
        self.projection * self.relative_to_view(relative)
    }
}
