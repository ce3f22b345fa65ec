/// Planet-scale camera and the per-frame snapshot derived from it.
///
/// The eye position lives in double precision; everything handed to the
/// vertex stages is single precision, with the eye carried as a split
/// coordinate so positions can be made camera-relative before use.
use glam::{DMat4, DVec3, Mat4};

use crate::precision::{RteTransform, SplitCoordinate};

pub struct GlobeCamera {
    pub position: DVec3,
    /// Unit view direction.
    pub forward: DVec3,
    /// Unit up vector, orthogonal to `forward`.
    pub up: DVec3,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect_ratio: f32,
}

impl GlobeCamera {
    pub fn new(position: DVec3, aspect_ratio: f32) -> Self {
        Self {
            position,
            forward: DVec3::NEG_Z,
            up: DVec3::Y,
            fov: 45.0f32.to_radians(),
            near: 1.0,
            far: 1.0e8,
            aspect_ratio,
        }
    }

    /// Point the camera at `target`. `up` only needs to be non-parallel to
    /// the view direction; it is re-orthogonalized here.
    pub fn look_at(&mut self, target: DVec3, up: DVec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward == DVec3::ZERO {
            return;
        }
        let right = forward.cross(up).normalize_or_zero();
        let right = if right == DVec3::ZERO {
            // `up` parallel to the view direction; pick any perpendicular.
            forward.any_orthonormal_vector()
        } else {
            right
        };
        self.forward = forward;
        self.up = right.cross(forward);
    }

    /// Get right direction vector
    pub fn right(&self) -> DVec3 {
        self.forward.cross(self.up)
    }

    /// View matrix. Computed in double precision; its translation is
    /// meaningless at planetary distances once cast, which is fine because
    /// the RTE path discards it.
    pub fn view_matrix(&self) -> Mat4 {
        DMat4::look_to_rh(self.position, self.forward, self.up).as_mat4()
    }

    /// OpenGL-convention projection (NDC depth in [-1, 1]).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Update aspect ratio (call when the viewport resizes)
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Snapshot for one frame, with entities split relative to the world origin.
    pub fn frame(&self) -> CameraFrame {
        self.frame_relative_to(DVec3::ZERO)
    }

    /// Snapshot for one frame, with entities split relative to `rtc_center`.
    pub fn frame_relative_to(&self, rtc_center: DVec3) -> CameraFrame {
        CameraFrame::new(
            self.view_matrix(),
            self.projection_matrix(),
            self.position,
            rtc_center,
        )
    }
}

/// Camera state for a single frame. Written once by the renderer and shared
/// read-only by every vertex of that frame.
#[derive(Copy, Clone, Debug)]
pub struct CameraFrame {
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
    /// Absolute eye position.
    pub eye_position: SplitCoordinate,
    /// Eye position relative to the relative-to-center origin; this is the
    /// one subtracted from entity positions.
    pub rtc_eye_position: SplitCoordinate,
    pub rte: RteTransform,
}

impl CameraFrame {
    pub fn new(view_matrix: Mat4, projection_matrix: Mat4, eye: DVec3, rtc_center: DVec3) -> Self {
        let eye_position = SplitCoordinate::from_dvec3(eye);
        let rtc_eye_position = SplitCoordinate::from_dvec3_relative(eye, rtc_center);
        Self::from_split(view_matrix, projection_matrix, eye_position, rtc_eye_position)
    }

    pub fn from_split(
        view_matrix: Mat4,
        projection_matrix: Mat4,
        eye_position: SplitCoordinate,
        rtc_eye_position: SplitCoordinate,
    ) -> Self {
        Self {
            view_matrix,
            projection_matrix,
            eye_position,
            rtc_eye_position,
            rte: RteTransform::new(&view_matrix, &projection_matrix, rtc_eye_position),
        }
    }
}
