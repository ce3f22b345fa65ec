/// Horizon culling of polyline fragments against a sphere.
use glam::{Vec3, Vec4};

/// Fragments whose camera direction and sphere-normal direction agree more
/// than this are on the far side of the sphere.
pub const VISIBILITY_DOT_THRESHOLD: f32 = 0.11;

/// Culling sphere; a zero radius disables the test.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VisibleSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl VisibleSphere {
    pub const DISABLED: Self = Self {
        center: Vec3::ZERO,
        radius: 0.0,
    };

    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.radius != 0.0
    }

    /// Packed as the `visibleSphere` uniform.
    #[inline]
    pub fn as_vec4(&self) -> Vec4 {
        self.center.extend(self.radius)
    }

    /// Whether a fragment at `position` survives, seen from `camera`.
    /// Both points share the sphere's coordinate frame.
    #[inline]
    pub fn keeps(&self, position: Vec3, camera: Vec3) -> bool {
        if !self.is_enabled() {
            return true;
        }
        let cam_dir = (position - camera).normalize_or_zero();
        let sphere_dir = (position - self.center).normalize_or_zero();
        cam_dir.dot(sphere_dir) <= VISIBILITY_DOT_THRESHOLD
    }
}
