/// RGBA texture with nearest-neighbour, repeat-wrapped sampling.
use glam::{Vec2, Vec4};

#[derive(Clone, Debug)]
pub struct Texture {
    width: usize,
    height: usize,
    /// Row-major, top row first, RGBA8.
    texels: Vec<[u8; 4]>,
}

impl Texture {
    /// Returns None when `texels` does not match the dimensions.
    pub fn from_rgba8(width: usize, height: usize, texels: Vec<[u8; 4]>) -> Option<Self> {
        if width == 0 || height == 0 || texels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            texels,
        })
    }

    /// Single-colour 1x1 texture.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            texels: vec![rgba],
        }
    }

    /// Two-colour checkerboard of `size`x`size` texels.
    pub fn checkerboard(size: usize, a: [u8; 4], b: [u8; 4]) -> Self {
        let size = size.max(1);
        let texels = (0..size * size)
            .map(|i| if (i % size + i / size) % 2 == 0 { a } else { b })
            .collect();
        Self {
            width: size,
            height: size,
            texels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at `uv` (v = 0 is the top row). Coordinates wrap.
    #[inline]
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let u = uv.x - uv.x.floor();
        let v = uv.y - uv.y.floor();
        let x = ((u * self.width as f32) as usize).min(self.width - 1);
        let y = ((v * self.height as f32) as usize).min(self.height - 1);
        let [r, g, b, a] = self.texels[y * self.width + x];
        Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
    }
}
