//! Polyline colour and picking programs.

use glam::{Vec3, Vec4};

use super::geometry::PolylineVertexWindow;
use super::tessellator::{tessellate_vertex, TessellationParams};
use super::visibility::VisibleSphere;
use crate::frame::FrameContext;
use crate::program::{
    AttributeDecl, AttributeType, FragmentOutput, FragmentStage, Interpolate, Program,
    UniformBindings, UniformType, UniformValue, VertexOutput, VertexStage,
};

/// Draw settings for polyline programs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PolylineStyle {
    /// Half-width of the ribbon in pixels.
    pub thickness: f32,
    pub opacity: f32,
    /// Added to clip-space z.
    pub depth_offset: f32,
    pub visible_sphere: VisibleSphere,
    /// Flat colour of the picking pass.
    pub picking_color: Vec4,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            thickness: 1.5,
            opacity: 1.0,
            depth_offset: 0.0,
            visible_sphere: VisibleSphere::DISABLED,
            picking_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

impl PolylineStyle {
    pub fn tessellation(&self, frame: &FrameContext) -> TessellationParams {
        TessellationParams {
            thickness: self.thickness,
            depth_offset: self.depth_offset,
            viewport: frame.viewport,
        }
    }
}

/// Varyings of both polyline passes.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PolylineVarying {
    pub color: Vec4,
    /// Unclipped `current` in the relative-to-center frame.
    pub position: Vec3,
}

impl Interpolate for PolylineVarying {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            color: Interpolate::lerp(&self.color, &other.color, t),
            position: Interpolate::lerp(&self.position, &other.position, t),
        }
    }

    fn blend3(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self {
        Self {
            color: Vec4::blend3(&a.color, &b.color, &c.color, w),
            position: Vec3::blend3(&a.position, &b.position, &c.position, w),
        }
    }
}

fn write_camera_uniforms(frame: &FrameContext, bindings: &mut UniformBindings) {
    let camera = &frame.camera;
    bindings.set("viewport", UniformValue::Vec2(frame.viewport));
    bindings.set("proj", UniformValue::Mat4(camera.projection_matrix));
    bindings.set("view", UniformValue::Mat4(camera.view_matrix));
    bindings.set("rtcEyePositionHigh", UniformValue::Vec3(camera.rtc_eye_position.high));
    bindings.set("rtcEyePositionLow", UniformValue::Vec3(camera.rtc_eye_position.low));
}

fn ribbon_vertex(
    frame: &FrameContext,
    window: &PolylineVertexWindow,
    style: &PolylineStyle,
    color: Vec4,
) -> VertexOutput<PolylineVarying> {
    let params = style.tessellation(frame);
    let tessellated = tessellate_vertex(&frame.camera.rte, window, &params);
    VertexOutput {
        position: tessellated.clip_position,
        varying: PolylineVarying {
            color,
            position: window.current.to_vec3(),
        },
    }
}

/// Colour pass: per-vertex colour with the global opacity applied.
pub struct PolylineVertexStage {
    pub style: PolylineStyle,
}

impl VertexStage for PolylineVertexStage {
    type Vertex = PolylineVertexWindow;
    type Instance = ();
    type Varying = PolylineVarying;

    fn write_uniforms(&self, frame: &FrameContext, bindings: &mut UniformBindings) {
        write_camera_uniforms(frame, bindings);
        bindings.set("thickness", UniformValue::Float(self.style.thickness));
        bindings.set("opacity", UniformValue::Float(self.style.opacity));
        bindings.set("depthOffset", UniformValue::Float(self.style.depth_offset));
    }

    fn run(&self, frame: &FrameContext, window: &PolylineVertexWindow, _: &()) -> VertexOutput<PolylineVarying> {
        let color = window.color.truncate().extend(window.color.w * self.style.opacity);
        ribbon_vertex(frame, window, &self.style, color)
    }
}

/// Picking pass: the per-draw picking colour, no opacity.
pub struct PolylinePickingVertexStage {
    pub style: PolylineStyle,
}

impl VertexStage for PolylinePickingVertexStage {
    type Vertex = PolylineVertexWindow;
    type Instance = ();
    type Varying = PolylineVarying;

    fn write_uniforms(&self, frame: &FrameContext, bindings: &mut UniformBindings) {
        write_camera_uniforms(frame, bindings);
        bindings.set("color", UniformValue::Vec4(self.style.picking_color));
        bindings.set("thickness", UniformValue::Float(self.style.thickness));
        bindings.set("depthOffset", UniformValue::Float(self.style.depth_offset));
    }

    fn run(&self, frame: &FrameContext, window: &PolylineVertexWindow, _: &()) -> VertexOutput<PolylineVarying> {
        ribbon_vertex(frame, window, &self.style, self.style.picking_color)
    }
}

/// Shared fragment stage: visibility-sphere discard, then the varying colour.
pub struct PolylineFragmentStage {
    pub visible_sphere: VisibleSphere,
}

impl FragmentStage<PolylineVarying> for PolylineFragmentStage {
    fn write_uniforms(&self, _frame: &FrameContext, bindings: &mut UniformBindings) {
        bindings.set("visibleSphere", UniformValue::Vec4(self.visible_sphere.as_vec4()));
    }

    fn run(&self, frame: &FrameContext, varying: &PolylineVarying, _frag_coord: Vec3) -> Option<FragmentOutput> {
        if !self.visible_sphere.keeps(varying.position, frame.rtc_camera_position()) {
            return None;
        }
        Some(FragmentOutput::color(varying.color))
    }
}

pub type PolylineProgram = Program<PolylineVertexStage, PolylineFragmentStage>;
pub type PolylinePickingProgram = Program<PolylinePickingVertexStage, PolylineFragmentStage>;

const CAMERA_UNIFORMS: [(&str, UniformType); 5] = [
    ("viewport", UniformType::Vec2),
    ("proj", UniformType::Mat4),
    ("view", UniformType::Mat4),
    ("rtcEyePositionHigh", UniformType::Vec3),
    ("rtcEyePositionLow", UniformType::Vec3),
];

const WINDOW_ATTRIBUTES: [(&str, AttributeDecl); 7] = [
    ("prevHigh", AttributeDecl::per_vertex(AttributeType::Vec3)),
    ("currentHigh", AttributeDecl::per_vertex(AttributeType::Vec3)),
    ("nextHigh", AttributeDecl::per_vertex(AttributeType::Vec3)),
    ("prevLow", AttributeDecl::per_vertex(AttributeType::Vec3)),
    ("currentLow", AttributeDecl::per_vertex(AttributeType::Vec3)),
    ("nextLow", AttributeDecl::per_vertex(AttributeType::Vec3)),
    ("order", AttributeDecl::per_vertex(AttributeType::Float)),
];

pub fn polyline_screen(style: &PolylineStyle) -> PolylineProgram {
    let uniforms = CAMERA_UNIFORMS.into_iter().chain([
        ("thickness", UniformType::Float),
        ("opacity", UniformType::Float),
        ("depthOffset", UniformType::Float),
        ("visibleSphere", UniformType::Vec4),
    ]);
    let attributes = WINDOW_ATTRIBUTES
        .into_iter()
        .chain([("color", AttributeDecl::per_vertex(AttributeType::Vec4))]);
    Program::new(
        "polyline_screen",
        uniforms,
        attributes,
        PolylineVertexStage { style: *style },
        PolylineFragmentStage {
            visible_sphere: style.visible_sphere,
        },
    )
}

pub fn polyline_picking(style: &PolylineStyle) -> PolylinePickingProgram {
    let uniforms = CAMERA_UNIFORMS.into_iter().chain([
        ("color", UniformType::Vec4),
        ("thickness", UniformType::Float),
        ("depthOffset", UniformType::Float),
        ("visibleSphere", UniformType::Vec4),
    ]);
    Program::new(
        "polyline_picking",
        uniforms,
        WINDOW_ATTRIBUTES,
        PolylinePickingVertexStage { style: *style },
        PolylineFragmentStage {
            visible_sphere: style.visible_sphere,
        },
    )
}
