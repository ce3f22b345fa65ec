/// Distance-adaptive scaling.
///
/// `scale(d) = scaleAtMax * clamp(d, dMin, dMax) / dMin`
///
/// Nearby objects (closer than `dMin`) keep `scaleAtMax`; the factor then
/// grows linearly with distance so far objects stay visible, and stops
/// growing past `dMax`.
use crate::error::{RenderError, Result};
use glam::Vec3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceScaleLaw {
    pub d_min: f32,
    pub d_max: f32,
    pub scale_at_max: f32,
}

impl Default for DistanceScaleLaw {
    fn default() -> Self {
        // Unbounded linear growth: constant on-screen size.
        Self {
            d_min: 1.0,
            d_max: f32::MAX,
            scale_at_max: 1.0,
        }
    }
}

impl DistanceScaleLaw {
    pub fn new(d_min: f32, d_max: f32, scale_at_max: f32) -> Result<Self> {
        let valid = d_min.is_finite() && d_min > 0.0 && !d_max.is_nan() && d_max >= d_min;
        if !valid {
            return Err(RenderError::InvalidScaleLaw { d_min, d_max });
        }
        Ok(Self {
            d_min,
            d_max,
            scale_at_max,
        })
    }

    /// Fixed-size law: the factor is always `scale`.
    pub fn constant(scale: f32) -> Self {
        Self {
            d_min: 1.0,
            d_max: 1.0,
            scale_at_max: scale,
        }
    }

    /// Evaluate the law for a view-space distance.
    #[inline]
    pub fn scale(&self, look_length: f32) -> f32 {
        // GLSL clamp: min(max(x, lo), hi)
        let clamped = look_length.max(self.d_min).min(self.d_max);
        self.scale_at_max * clamped / self.d_min
    }

    /// Packed as the `uScaleByDistance` uniform.
    #[inline]
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.d_min, self.d_max, self.scale_at_max)
    }
}
