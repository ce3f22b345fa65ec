/// Immutable per-frame context handed to every vertex and fragment stage.
///
/// Stages are pure functions of (attributes, frame context, draw uniforms);
/// nothing in here may change while a frame is being drawn.
use glam::{DVec3, Vec2, Vec3};

use crate::camera::{CameraFrame, GlobeCamera};

#[derive(Copy, Clone, Debug)]
pub struct FrameContext {
    pub camera: CameraFrame,
    /// Viewport size in pixels.
    pub viewport: Vec2,
    /// Sun position (world orientation); the light direction is its
    /// normalized value.
    pub sun_position: Vec3,
}

impl FrameContext {
    pub fn new(camera: CameraFrame, viewport: Vec2) -> Self {
        Self {
            camera,
            viewport,
            sun_position: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Capture the camera and size the viewport in one go.
    pub fn from_camera(camera: &GlobeCamera, width: usize, height: usize) -> Self {
        Self::new(camera.frame(), Vec2::new(width as f32, height as f32))
    }

    pub fn from_camera_relative_to(
        camera: &GlobeCamera,
        rtc_center: DVec3,
        width: usize,
        height: usize,
    ) -> Self {
        Self::new(
            camera.frame_relative_to(rtc_center),
            Vec2::new(width as f32, height as f32),
        )
    }

    pub fn with_sun_position(mut self, sun_position: Vec3) -> Self {
        self.sun_position = sun_position;
        self
    }

    /// Camera position in the relative-to-center frame, summed in single
    /// precision.
    #[inline]
    pub fn rtc_camera_position(&self) -> Vec3 {
        self.camera.rtc_eye_position.to_vec3()
    }
}
