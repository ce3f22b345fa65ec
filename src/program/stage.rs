/// Stage traits: the two "shader bodies" of a program.
use glam::{Vec2, Vec3, Vec4};

use super::{AttributeType, UniformBindings};
use crate::frame::FrameContext;

/// Per-vertex or per-instance record read by a vertex stage. `ATTRIBUTES`
/// names the attribute streams the record stands for.
pub trait AttributeRecord {
    const ATTRIBUTES: &'static [(&'static str, AttributeType)];
}

impl AttributeRecord for () {
    const ATTRIBUTES: &'static [(&'static str, AttributeType)] = &[];
}

/// Varyings interpolated between vertices (clipping) and across triangles
/// (rasterization).
pub trait Interpolate: Copy {
    fn lerp(&self, other: &Self, t: f32) -> Self;
    /// Weighted sum; weights add up to one.
    fn blend3(a: &Self, b: &Self, c: &Self, weights: [f32; 3]) -> Self;
}

impl Interpolate for () {
    #[inline]
    fn lerp(&self, _other: &Self, _t: f32) -> Self {}

    #[inline]
    fn blend3(_a: &Self, _b: &Self, _c: &Self, _weights: [f32; 3]) -> Self {}
}

macro_rules! impl_interpolate_linear {
    ($($ty:ty),*) => {
        $(
            impl Interpolate for $ty {
                #[inline]
                fn lerp(&self, other: &Self, t: f32) -> Self {
                    *self + (*other - *self) * t
                }

                #[inline]
                fn blend3(a: &Self, b: &Self, c: &Self, weights: [f32; 3]) -> Self {
                    *a * weights[0] + *b * weights[1] + *c * weights[2]
                }
            }
        )*
    };
}

impl_interpolate_linear!(f32, Vec2, Vec3, Vec4);

/// Vertex stage output: clip-space position plus varyings.
#[derive(Copy, Clone, Debug)]
pub struct VertexOutput<V> {
    pub position: Vec4,
    pub varying: V,
}

/// Fragment stage output. `secondary` targets the second attachment when a
/// program writes two outputs at once.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FragmentOutput {
    pub color: Vec4,
    pub secondary: Option<Vec4>,
}

impl FragmentOutput {
    #[inline]
    pub fn color(color: Vec4) -> Self {
        Self {
            color,
            secondary: None,
        }
    }

    #[inline]
    pub fn with_secondary(color: Vec4, secondary: Vec4) -> Self {
        Self {
            color,
            secondary: Some(secondary),
        }
    }
}

pub trait VertexStage: Sync {
    type Vertex: AttributeRecord + Sync;
    /// Per-instance record; `()` for non-instanced programs.
    type Instance: AttributeRecord + Sync;
    type Varying: Interpolate + Send + Sync;

    fn write_uniforms(&self, frame: &FrameContext, bindings: &mut UniformBindings);

    fn run(
        &self,
        frame: &FrameContext,
        vertex: &Self::Vertex,
        instance: &Self::Instance,
    ) -> VertexOutput<Self::Varying>;
}

pub trait FragmentStage<V>: Sync {
    fn write_uniforms(&self, frame: &FrameContext, bindings: &mut UniformBindings);

    /// `frag_coord` is (pixel x, pixel y, window depth in [0, 1]).
    /// Returning `None` discards the fragment.
    fn run(&self, frame: &FrameContext, varying: &V, frag_coord: Vec3) -> Option<FragmentOutput>;
}
