//! Program abstraction: named uniform and attribute declarations plus a
//! vertex stage and a fragment stage.
//!
//! A [`Program`] is the contract between the renderer and the stages. The
//! stages write the uniforms they consume into a [`UniformBindings`] table;
//! [`Program::bind`] checks that every declared uniform is present with the
//! declared type and that every declared attribute is supplied, per vertex or
//! per instance, by the records the stages read. Draw calls refuse to run an
//! unbound program.

pub mod stage;

use std::collections::BTreeMap;

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::error::{RenderError, Result};
use crate::frame::FrameContext;

pub use stage::{
    AttributeRecord, FragmentOutput, FragmentStage, Interpolate, VertexOutput, VertexStage,
};

/// Semantic type of a uniform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    /// Fixed-length `vec3` array (e.g. the 3-row material).
    Vec3Array(usize),
    Sampler2d,
}

/// A bound uniform value.
#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Vec3Array(Vec<Vec3>),
    /// Whether a texture is attached to the sampler.
    Sampler2d(bool),
}

impl UniformValue {
    pub fn ty(&self) -> UniformType {
        match self {
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Vec2(_) => UniformType::Vec2,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Vec4(_) => UniformType::Vec4,
            UniformValue::Mat4(_) => UniformType::Mat4,
            UniformValue::Vec3Array(values) => UniformType::Vec3Array(values.len()),
            UniformValue::Sampler2d(_) => UniformType::Sampler2d,
        }
    }
}

/// Semantic type of a vertex attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttributeType {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AttributeDecl {
    pub ty: AttributeType,
    /// Advances once per instance instead of once per vertex.
    pub per_instance: bool,
}

impl AttributeDecl {
    pub const fn per_vertex(ty: AttributeType) -> Self {
        Self {
            ty,
            per_instance: false,
        }
    }

    pub const fn per_instance(ty: AttributeType) -> Self {
        Self {
            ty,
            per_instance: true,
        }
    }
}

/// Uniform values written by a program's stages for one draw.
#[derive(Clone, Debug, Default)]
pub struct UniformBindings {
    values: BTreeMap<&'static str, UniformValue>,
}

impl UniformBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &'static str, value: UniformValue) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Shader program: a name, the declarations, and the two stages.
pub struct Program<VS, FS> {
    name: &'static str,
    uniforms: BTreeMap<&'static str, UniformType>,
    attributes: BTreeMap<&'static str, AttributeDecl>,
    vertex: VS,
    fragment: FS,
}

impl<VS, FS> Program<VS, FS>
where
    VS: VertexStage,
    FS: FragmentStage<VS::Varying>,
{
    pub fn new<U, A>(name: &'static str, uniforms: U, attributes: A, vertex: VS, fragment: FS) -> Self
    where
        U: IntoIterator<Item = (&'static str, UniformType)>,
        A: IntoIterator<Item = (&'static str, AttributeDecl)>,
    {
        Self {
            name,
            uniforms: uniforms.into_iter().collect(),
            attributes: attributes.into_iter().collect(),
            vertex,
            fragment,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn uniforms(&self) -> &BTreeMap<&'static str, UniformType> {
        &self.uniforms
    }

    pub fn attributes(&self) -> &BTreeMap<&'static str, AttributeDecl> {
        &self.attributes
    }

    pub fn vertex_stage(&self) -> &VS {
        &self.vertex
    }

    pub fn fragment_stage(&self) -> &FS {
        &self.fragment
    }

    /// Mutable access for updating draw uniforms between frames.
    pub fn vertex_stage_mut(&mut self) -> &mut VS {
        &mut self.vertex
    }

    pub fn fragment_stage_mut(&mut self) -> &mut FS {
        &mut self.fragment
    }

    /// Collect the stages' uniforms for `frame` and validate them, along with
    /// the attribute layout, against the declarations.
    pub fn bind(&self, frame: &FrameContext) -> Result<UniformBindings> {
        let mut bindings = UniformBindings::new();
        self.vertex.write_uniforms(frame, &mut bindings);
        self.fragment.write_uniforms(frame, &mut bindings);

        let result = self
            .check_uniforms(&bindings)
            .and_then(|_| self.check_attributes());
        if let Err(err) = &result {
            log::warn!("program `{}` failed to bind: {}", self.name, err);
        }
        result.map(|_| bindings)
    }

    fn check_uniforms(&self, bindings: &UniformBindings) -> Result<()> {
        for (&name, &expected) in &self.uniforms {
            let value = bindings.get(name).ok_or(RenderError::MissingUniform {
                program: self.name,
                name,
            })?;
            let found = value.ty();
            if found != expected {
                return Err(RenderError::UniformTypeMismatch {
                    program: self.name,
                    name,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    fn check_attributes(&self) -> Result<()> {
        for (&name, decl) in &self.attributes {
            let (own, other) = if decl.per_instance {
                (VS::Instance::ATTRIBUTES, VS::Vertex::ATTRIBUTES)
            } else {
                (VS::Vertex::ATTRIBUTES, VS::Instance::ATTRIBUTES)
            };
            if supplies(own, name, decl.ty) {
                continue;
            }
            if supplies(other, name, decl.ty) {
                return Err(RenderError::AttributeStepMismatch {
                    program: self.name,
                    name,
                });
            }
            return Err(RenderError::MissingAttribute {
                program: self.name,
                name,
            });
        }
        Ok(())
    }
}

fn supplies(attributes: &[(&'static str, AttributeType)], name: &str, ty: AttributeType) -> bool {
    attributes.iter().any(|&(n, t)| n == name && t == ty)
}
