/// Local meshes placed at every geo object instance.
use glam::{Vec2, Vec3};

use crate::program::{AttributeRecord, AttributeType};

/// One vertex of a local mesh.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

impl AttributeRecord for MeshVertex {
    const ATTRIBUTES: &'static [(&'static str, AttributeType)] = &[
        ("aVertexPosition", AttributeType::Vec3),
        ("aVertexNormal", AttributeType::Vec3),
        ("aTexCoord", AttributeType::Vec2),
    ];
}

/// Indexed triangle mesh in instance-local coordinates. Triangles wind
/// counter-clockwise when seen from outside.
#[derive(Clone, Debug, Default)]
pub struct LocalMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl LocalMesh {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned cube of edge `size` centred on the origin, with flat
    /// per-face normals (24 vertices, 36 indices).
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        // (normal, u, v) with u x v == normal
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut mesh = Self::default();
        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            mesh.push_quad(normal * h, u * h, v * h, normal);
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// Quad of `width` x `height` in the local XY plane, facing +Z.
    pub fn billboard_quad(width: f32, height: f32) -> Self {
        let mut mesh = Self::default();
        mesh.push_quad(
            Vec3::ZERO,
            Vec3::X * (width * 0.5),
            Vec3::Y * (height * 0.5),
            Vec3::Z,
        );
        mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
        mesh
    }

    fn push_quad(&mut self, center: Vec3, u: Vec3, v: Vec3, normal: Vec3) {
        let corners = [
            (-1.0, -1.0, Vec2::new(0.0, 1.0)),
            (1.0, -1.0, Vec2::new(1.0, 1.0)),
            (1.0, 1.0, Vec2::new(1.0, 0.0)),
            (-1.0, 1.0, Vec2::new(0.0, 0.0)),
        ];
        for (su, sv, tex_coord) in corners {
            self.vertices.push(MeshVertex {
                position: center + u * su + v * sv,
                normal,
                tex_coord,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_wind_outwards() {
        let cube = LocalMesh::cube(2.0);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        for tri in cube.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| cube.vertices[i as usize]);
            let face_normal = (b.position - a.position).cross(c.position - a.position);
            assert!(face_normal.dot(a.normal) > 0.0);
            assert_eq!(a.position.abs().max_element(), 1.0);
        }
    }

    #[test]
    fn billboard_spans_requested_size() {
        let quad = LocalMesh::billboard_quad(4.0, 2.0);
        let xs: Vec<f32> = quad.vertices.iter().map(|v| v.position.x).collect();
        assert_eq!(xs, vec![-2.0, 2.0, 2.0, -2.0]);
        assert!(quad.vertices.iter().all(|v| v.position.z == 0.0));
    }
}
