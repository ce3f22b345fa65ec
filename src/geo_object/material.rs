/// Phong-style material and lighting for the geo object colour pass.
/// Kept apart from the stages so the lighting model can change on its own.
use glam::{Vec3, Vec4};

use crate::rendering::Texture;

/// Three-row material: ambient, diffuse and specular coefficients.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    /// Multiplies the vertex colour.
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.5),
            diffuse: Vec3::splat(0.5),
            specular: Vec3::splat(0.2),
            shininess: 16.0,
        }
    }
}

impl Material {
    /// Packed as the `materialParams[3]` uniform.
    pub fn params(&self) -> Vec<Vec3> {
        vec![self.ambient, self.diffuse, self.specular]
    }

    /// `rgb * ambient + diffuse * max(n.l, 0) + specular * max(r.v, 0)^shininess`
    ///
    /// `normal` is used as interpolated; `light_dir` and `view_dir` must be
    /// unit vectors pointing away from the surface.
    #[inline]
    pub fn light(&self, color: Vec3, normal: Vec3, light_dir: Vec3, view_dir: Vec3) -> Vec3 {
        let reflection = reflect(-light_dir, normal).dot(view_dir).max(0.0);
        let specular = reflection.powf(self.shininess);
        let diffuse = normal.dot(light_dir).max(0.0);
        color * self.ambient + self.diffuse * diffuse + self.specular * specular
    }
}

/// GLSL `reflect(i, n)`.
#[inline]
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

/// Final colour: the texture's rgb is weighted and its alpha kept; without a
/// texture the vertex alpha is kept.
#[inline]
pub fn compose(weighting: Vec3, color_alpha: f32, texel: Option<Vec4>) -> Vec4 {
    match texel {
        Some(tex) => (tex.truncate() * weighting).extend(tex.w),
        None => weighting.extend(color_alpha),
    }
}

/// Texture lookup helper for the colour pass.
#[inline]
pub fn sample(texture: Option<&Texture>, uv: glam::Vec2) -> Option<Vec4> {
    texture.map(|t| t.sample(uv))
}
