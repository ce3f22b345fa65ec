//! Per-vertex geo object transform shared by the three passes.

use glam::{Quat, Vec3, Vec4};

use super::instance::GeoObjectInstance;
use crate::precision::RteTransform;
use crate::scale_law::DistanceScaleLaw;

/// Clip position emitted for every vertex of a disposed instance. Outside
/// the clip volume on every axis, so the triangles it forms are zero-area
/// and never produce fragments.
pub const DISPOSED_CLIP_POSITION: Vec4 = Vec4::new(2.0, 2.0, 2.0, 1.0);

/// Rotate `v` by the unit quaternion `q`.
#[inline]
pub fn q_rotate(q: Quat, v: Vec3) -> Vec3 {
    let qv = Vec3::new(q.x, q.y, q.z);
    v + 2.0 * qv.cross(qv.cross(v) + q.w * v)
}

/// Per-instance quantities, identical for every vertex of the instance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InstanceAnchor {
    /// Camera-relative anchor position.
    pub relative: Vec3,
    /// View-space distance to the anchor.
    pub look_length: f32,
    /// Distance scale factor `scd`.
    pub scale: f32,
}

impl InstanceAnchor {
    pub fn new(rte: &RteTransform, instance: &GeoObjectInstance, law: &DistanceScaleLaw) -> Self {
        let relative = rte.relative(instance.position());
        let look_length = rte.relative_to_view(relative).truncate().length();
        Self {
            relative,
            look_length,
            scale: law.scale(look_length),
        }
    }
}

/// A transformed mesh vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TransformedVertex {
    pub anchor: InstanceAnchor,
    /// Camera-relative vertex position (anchor plus placed mesh vertex).
    pub relative: Vec3,
    pub clip_position: Vec4,
}

/// Place one mesh vertex of `instance`:
/// `qRotate(q, scd * extra_scale * (v * scale + translate)) + scd * localOffset`,
/// then project. `extra_scale` is the picking enlargement (one otherwise).
/// Returns `None` for disposed instances.
#[inline]
pub fn transform_vertex(
    rte: &RteTransform,
    instance: &GeoObjectInstance,
    law: &DistanceScaleLaw,
    mesh_position: Vec3,
    extra_scale: Vec3,
) -> Option<TransformedVertex> {
    if instance.disposed {
        return None;
    }
    let anchor = InstanceAnchor::new(rte, instance, law);
    let scd = anchor.scale;
    let local = q_rotate(
        instance.rotation,
        scd * extra_scale * (mesh_position * instance.scale + instance.translate),
    ) + scd * instance.local_position_offset;
    let relative = anchor.relative + local;
    Some(TransformedVertex {
        anchor,
        relative,
        clip_position: rte.relative_to_clip(relative),
    })
}

/// Clip position of a mesh vertex, or [`DISPOSED_CLIP_POSITION`].
#[inline]
pub fn clip_position(
    rte: &RteTransform,
    instance: &GeoObjectInstance,
    law: &DistanceScaleLaw,
    mesh_position: Vec3,
    extra_scale: Vec3,
) -> Vec4 {
    transform_vertex(rte, instance, law, mesh_position, extra_scale)
        .map_or(DISPOSED_CLIP_POSITION, |v| v.clip_position)
}
