use glam::{DVec3, Vec3};

/// A double-precision position carried as two single-precision triples.
///
/// `high` holds the value rounded to whole units (then to `f32`) and `low`
/// holds the residual, so `high + low` reconstructs the original to
/// near-double precision. Because `high` never has a fractional part, the
/// difference of two `high` triples is either zero or at least one unit long,
/// which is what the step mask in [`camera_relative_delta`] relies on.
///
/// [`camera_relative_delta`]: super::camera_relative_delta
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SplitCoordinate {
    pub high: Vec3,
    pub low: Vec3,
}

impl SplitCoordinate {
    pub const ZERO: Self = Self {
        high: Vec3::ZERO,
        low: Vec3::ZERO,
    };

    #[inline]
    pub const fn new(high: Vec3, low: Vec3) -> Self {
        Self { high, low }
    }

    /// Split a world position.
    #[inline]
    pub fn from_dvec3(value: DVec3) -> Self {
        let high = value.round().as_vec3();
        let low = (value - high.as_dvec3()).as_vec3();
        Self { high, low }
    }

    /// Split a world position relative to a relative-to-center origin.
    #[inline]
    pub fn from_dvec3_relative(value: DVec3, center: DVec3) -> Self {
        Self::from_dvec3(value - center)
    }

    /// Reconstruct in double precision.
    #[inline]
    pub fn to_dvec3(self) -> DVec3 {
        self.high.as_dvec3() + self.low.as_dvec3()
    }

    /// Reconstruct with a single-precision addition (what a shader sees when
    /// it sums the two halves).
    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        self.high + self.low
    }
}

impl From<DVec3> for SplitCoordinate {
    fn from(value: DVec3) -> Self {
        Self::from_dvec3(value)
    }
}
