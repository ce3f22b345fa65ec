//! The three geo object passes: colour, picking and depth.

use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};

use super::instance::GeoObjectInstance;
use super::material::{self, Material};
use super::mesh::MeshVertex;
use super::transform::{q_rotate, transform_vertex, DISPOSED_CLIP_POSITION};
use crate::count_call;
use crate::frame::FrameContext;
use crate::program::{
    AttributeDecl, AttributeType, FragmentOutput, FragmentStage, Interpolate, Program,
    UniformBindings, UniformType, UniformValue, VertexOutput, VertexStage,
};
use crate::rendering::Texture;
use crate::scale_law::DistanceScaleLaw;

/// Draw settings shared by the three geo object programs.
#[derive(Clone, Debug)]
pub struct GeoObjectStyle {
    pub scale_law: DistanceScaleLaw,
    /// Enlarges hit areas in the picking pass.
    pub picking_scale: Vec3,
    pub material: Material,
    pub use_lighting: bool,
    pub texture: Option<Arc<Texture>>,
    /// Marker written to the depth pass's first output.
    pub frustum_picking_color: f32,
}

impl Default for GeoObjectStyle {
    fn default() -> Self {
        Self {
            scale_law: DistanceScaleLaw::default(),
            picking_scale: Vec3::ONE,
            material: Material::default(),
            use_lighting: true,
            texture: None,
            frustum_picking_color: 1.0,
        }
    }
}

fn write_camera_uniforms(frame: &FrameContext, bindings: &mut UniformBindings) {
    let camera = &frame.camera;
    bindings.set("viewMatrix", UniformValue::Mat4(camera.view_matrix));
    bindings.set("projectionMatrix", UniformValue::Mat4(camera.projection_matrix));
    bindings.set("rtcEyePositionHigh", UniformValue::Vec3(camera.rtc_eye_position.high));
    bindings.set("rtcEyePositionLow", UniformValue::Vec3(camera.rtc_eye_position.low));
}

/// Varyings of the colour pass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GeoObjectVarying {
    pub color: Vec4,
    /// Normal rotated by the instance quaternion.
    pub normal: Vec3,
    pub tex_coord: Vec2,
    /// Camera-relative vertex position.
    pub position: Vec3,
}

impl Interpolate for GeoObjectVarying {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            color: Interpolate::lerp(&self.color, &other.color, t),
            normal: Interpolate::lerp(&self.normal, &other.normal, t),
            tex_coord: Interpolate::lerp(&self.tex_coord, &other.tex_coord, t),
            position: Interpolate::lerp(&self.position, &other.position, t),
        }
    }

    fn blend3(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self {
        Self {
            color: Vec4::blend3(&a.color, &b.color, &c.color, w),
            normal: Vec3::blend3(&a.normal, &b.normal, &c.normal, w),
            tex_coord: Vec2::blend3(&a.tex_coord, &b.tex_coord, &c.tex_coord, w),
            position: Vec3::blend3(&a.position, &b.position, &c.position, w),
        }
    }
}

pub struct GeoObjectVertexStage {
    pub scale_law: DistanceScaleLaw,
}

impl VertexStage for GeoObjectVertexStage {
    type Vertex = MeshVertex;
    type Instance = GeoObjectInstance;
    type Varying = GeoObjectVarying;

    fn write_uniforms(&self, frame: &FrameContext, bindings: &mut UniformBindings) {
        write_camera_uniforms(frame, bindings);
        bindings.set("uScaleByDistance", UniformValue::Vec3(self.scale_law.as_vec3()));
        bindings.set("eyePositionHigh", UniformValue::Vec3(frame.camera.eye_position.high));
        bindings.set("eyePositionLow", UniformValue::Vec3(frame.camera.eye_position.low));
    }

    fn run(
        &self,
        frame: &FrameContext,
        vertex: &MeshVertex,
        instance: &GeoObjectInstance,
    ) -> VertexOutput<GeoObjectVarying> {
        match transform_vertex(&frame.camera.rte, instance, &self.scale_law, vertex.position, Vec3::ONE) {
            Some(transformed) => VertexOutput {
                position: transformed.clip_position,
                varying: GeoObjectVarying {
                    color: instance.color,
                    normal: q_rotate(instance.rotation, vertex.normal),
                    tex_coord: vertex.tex_coord,
                    position: transformed.relative,
                },
            },
            None => {
                count_call!(crate::perf::FUNCTION_COUNTERS.disposed_vertices_skipped);
                VertexOutput {
                    position: DISPOSED_CLIP_POSITION,
                    varying: GeoObjectVarying::default(),
                }
            }
        }
    }
}

pub struct GeoObjectFragmentStage {
    pub material: Material,
    pub use_lighting: bool,
    pub texture: Option<Arc<Texture>>,
}

impl FragmentStage<GeoObjectVarying> for GeoObjectFragmentStage {
    fn write_uniforms(&self, frame: &FrameContext, bindings: &mut UniformBindings) {
        let flag = |on: bool| UniformValue::Float(if on { 1.0 } else { 0.0 });
        bindings.set("sunPosition", UniformValue::Vec3(frame.sun_position));
        bindings.set("materialParams", UniformValue::Vec3Array(self.material.params()));
        bindings.set("materialShininess", UniformValue::Float(self.material.shininess));
        bindings.set("uTexture", UniformValue::Sampler2d(self.texture.is_some()));
        bindings.set("uUseTexture", flag(self.texture.is_some()));
        bindings.set("useLighting", flag(self.use_lighting));
    }

    fn run(
        &self,
        frame: &FrameContext,
        varying: &GeoObjectVarying,
        _frag_coord: Vec3,
    ) -> Option<FragmentOutput> {
        let rgb = varying.color.truncate();
        let weighting = if self.use_lighting {
            let light_dir = frame.sun_position.normalize_or_zero();
            // The eye sits at the camera-relative origin.
            let view_dir = (-varying.position).normalize_or_zero();
            self.material.light(rgb, varying.normal, light_dir, view_dir)
        } else {
            rgb
        };
        let texel = material::sample(self.texture.as_deref(), varying.tex_coord);
        Some(FragmentOutput::color(material::compose(
            weighting,
            varying.color.w,
            texel,
        )))
    }
}

/// Vertex stage of the picking pass; the varying is the picking colour.
pub struct GeoObjectPickingVertexStage {
    pub scale_law: DistanceScaleLaw,
    pub picking_scale: Vec3,
}

impl VertexStage for GeoObjectPickingVertexStage {
    type Vertex = MeshVertex;
    type Instance = GeoObjectInstance;
    type Varying = Vec3;

    fn write_uniforms(&self, frame: &FrameContext, bindings: &mut UniformBindings) {
        write_camera_uniforms(frame, bindings);
        bindings.set("uScaleByDistance", UniformValue::Vec3(self.scale_law.as_vec3()));
        bindings.set("pickingScale", UniformValue::Vec3(self.picking_scale));
    }

    fn run(
        &self,
        frame: &FrameContext,
        vertex: &MeshVertex,
        instance: &GeoObjectInstance,
    ) -> VertexOutput<Vec3> {
        let transformed = transform_vertex(
            &frame.camera.rte,
            instance,
            &self.scale_law,
            vertex.position,
            self.picking_scale,
        );
        VertexOutput {
            position: transformed.map_or(DISPOSED_CLIP_POSITION, |t| t.clip_position),
            varying: instance.picking_color,
        }
    }
}

/// Flat, unlit picking colour.
pub struct PickingColorFragmentStage;

impl FragmentStage<Vec3> for PickingColorFragmentStage {
    fn write_uniforms(&self, _frame: &FrameContext, _bindings: &mut UniformBindings) {}

    fn run(&self, _frame: &FrameContext, varying: &Vec3, _frag_coord: Vec3) -> Option<FragmentOutput> {
        Some(FragmentOutput::color(varying.extend(1.0)))
    }
}

pub struct GeoObjectDepthVertexStage {
    pub scale_law: DistanceScaleLaw,
}

impl VertexStage for GeoObjectDepthVertexStage {
    type Vertex = MeshVertex;
    type Instance = GeoObjectInstance;
    type Varying = ();

    fn write_uniforms(&self, frame: &FrameContext, bindings: &mut UniformBindings) {
        write_camera_uniforms(frame, bindings);
        bindings.set("uScaleByDistance", UniformValue::Vec3(self.scale_law.as_vec3()));
    }

    fn run(&self, frame: &FrameContext, vertex: &MeshVertex, instance: &GeoObjectInstance) -> VertexOutput<()> {
        let transformed = transform_vertex(
            &frame.camera.rte,
            instance,
            &self.scale_law,
            vertex.position,
            Vec3::ONE,
        );
        VertexOutput {
            position: transformed.map_or(DISPOSED_CLIP_POSITION, |t| t.clip_position),
            varying: (),
        }
    }
}

/// Writes the frustum marker to the primary output and the window depth,
/// replicated, to the secondary output.
pub struct GeoObjectDepthFragmentStage {
    pub frustum_picking_color: f32,
}

impl FragmentStage<()> for GeoObjectDepthFragmentStage {
    fn write_uniforms(&self, _frame: &FrameContext, bindings: &mut UniformBindings) {
        bindings.set("frustumPickingColor", UniformValue::Float(self.frustum_picking_color));
    }

    fn run(&self, _frame: &FrameContext, _varying: &(), frag_coord: Vec3) -> Option<FragmentOutput> {
        let f = self.frustum_picking_color;
        let z = frag_coord.z;
        Some(FragmentOutput::with_secondary(
            Vec4::new(f, f, f, 1.0),
            Vec4::new(z, z, z, 1.0),
        ))
    }
}

pub type GeoObjectProgram = Program<GeoObjectVertexStage, GeoObjectFragmentStage>;
pub type GeoObjectPickingProgram = Program<GeoObjectPickingVertexStage, PickingColorFragmentStage>;
pub type GeoObjectDepthProgram = Program<GeoObjectDepthVertexStage, GeoObjectDepthFragmentStage>;

const CAMERA_UNIFORMS: [(&str, UniformType); 5] = [
    ("viewMatrix", UniformType::Mat4),
    ("projectionMatrix", UniformType::Mat4),
    ("uScaleByDistance", UniformType::Vec3),
    ("rtcEyePositionHigh", UniformType::Vec3),
    ("rtcEyePositionLow", UniformType::Vec3),
];

const INSTANCE_ATTRIBUTES: [(&str, AttributeDecl); 8] = [
    ("aVertexPosition", AttributeDecl::per_vertex(AttributeType::Vec3)),
    ("aLocalPosition", AttributeDecl::per_instance(AttributeType::Vec3)),
    ("aRTCPositionHigh", AttributeDecl::per_instance(AttributeType::Vec3)),
    ("aRTCPositionLow", AttributeDecl::per_instance(AttributeType::Vec3)),
    ("aScale", AttributeDecl::per_instance(AttributeType::Vec3)),
    ("aTranslate", AttributeDecl::per_instance(AttributeType::Vec3)),
    ("aDispose", AttributeDecl::per_instance(AttributeType::Float)),
    ("qRot", AttributeDecl::per_instance(AttributeType::Vec4)),
];

/// Lit, optionally textured colour pass.
pub fn geo_object(style: &GeoObjectStyle) -> GeoObjectProgram {
    let uniforms = CAMERA_UNIFORMS.into_iter().chain([
        ("eyePositionHigh", UniformType::Vec3),
        ("eyePositionLow", UniformType::Vec3),
        ("sunPosition", UniformType::Vec3),
        ("materialParams", UniformType::Vec3Array(3)),
        ("materialShininess", UniformType::Float),
        ("uTexture", UniformType::Sampler2d),
        ("uUseTexture", UniformType::Float),
        ("useLighting", UniformType::Float),
    ]);
    let attributes = INSTANCE_ATTRIBUTES.into_iter().chain([
        ("aVertexNormal", AttributeDecl::per_vertex(AttributeType::Vec3)),
        ("aTexCoord", AttributeDecl::per_vertex(AttributeType::Vec2)),
        ("aColor", AttributeDecl::per_instance(AttributeType::Vec4)),
    ]);
    Program::new(
        "geo_object",
        uniforms,
        attributes,
        GeoObjectVertexStage {
            scale_law: style.scale_law,
        },
        GeoObjectFragmentStage {
            material: style.material,
            use_lighting: style.use_lighting,
            texture: style.texture.clone(),
        },
    )
}

/// Flat picking-colour pass with enlarged hit areas.
pub fn geo_object_picking(style: &GeoObjectStyle) -> GeoObjectPickingProgram {
    let uniforms = CAMERA_UNIFORMS
        .into_iter()
        .chain([("pickingScale", UniformType::Vec3)]);
    let attributes = INSTANCE_ATTRIBUTES.into_iter().chain([(
        "aPickingColor",
        AttributeDecl::per_instance(AttributeType::Vec3),
    )]);
    Program::new(
        "geo_object_picking",
        uniforms,
        attributes,
        GeoObjectPickingVertexStage {
            scale_law: style.scale_law,
            picking_scale: style.picking_scale,
        },
        PickingColorFragmentStage,
    )
}

/// Frustum marker plus depth, written to two attachments.
pub fn geo_object_depth(style: &GeoObjectStyle) -> GeoObjectDepthProgram {
    let uniforms = CAMERA_UNIFORMS
        .into_iter()
        .chain([("frustumPickingColor", UniformType::Float)]);
    Program::new(
        "geo_object_depth",
        uniforms,
        INSTANCE_ATTRIBUTES,
        GeoObjectDepthVertexStage {
            scale_law: style.scale_law,
        },
        GeoObjectDepthFragmentStage {
            frustum_picking_color: style.frustum_picking_color,
        },
    )
}
