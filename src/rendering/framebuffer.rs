/// Framebuffer for software rendering.
///
/// Three planes: the primary colour attachment, a secondary colour
/// attachment (written only by programs with two fragment outputs), and
/// depth. Rows are stored top-down; rasterization works in window
/// coordinates (origin bottom-left) and flips when indexing.
use glam::Vec4;

/// View into a contiguous set of rows of the framebuffer.
/// Used for multi-core rasterization where each worker owns a disjoint slice.
pub struct FrameSlice<'a> {
    pub width: usize,
    pub full_height: usize,
    /// First row (top-down) covered by this slice.
    pub y0: usize,
    pub height: usize,
    pub color: &'a mut [u32],
    pub secondary: &'a mut [Vec4],
    pub depth: &'a mut [f32],
}

impl<'a> FrameSlice<'a> {
    /// Linear index into the slice for a top-down row, or None if the row
    /// belongs to another slice.
    #[inline]
    pub fn index(&self, x: usize, row: usize) -> Option<usize> {
        if x >= self.width || row < self.y0 || row >= self.y0 + self.height {
            return None;
        }
        Some((row - self.y0) * self.width + x)
    }

    /// Window-space row range `[lo, hi)` (bottom-up) covered by this slice.
    #[inline]
    pub fn window_rows(&self) -> (usize, usize) {
        let lo = self.full_height - (self.y0 + self.height);
        let hi = self.full_height - self.y0;
        (lo, hi)
    }
}

pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pub color_buffer: Vec<u32>, // ARGB
    /// Unclamped RGBA floats, so depth-like outputs keep full precision.
    pub secondary_buffer: Vec<Vec4>,
    pub depth_buffer: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_count = width * height;
        Self {
            width,
            height,
            color_buffer: vec![0; pixel_count],
            secondary_buffer: vec![Vec4::ZERO; pixel_count],
            depth_buffer: vec![f32::INFINITY; pixel_count],
        }
    }

    /// Clear both colour attachments and depth.
    pub fn clear(&mut self, clear_color: u32) {
        self.color_buffer.fill(clear_color);
        self.secondary_buffer.fill(Vec4::ZERO);
        self.depth_buffer.fill(f32::INFINITY);
    }

    /// Resize framebuffer
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        let pixel_count = width * height;
        self.color_buffer.resize(pixel_count, 0);
        self.secondary_buffer.resize(pixel_count, Vec4::ZERO);
        self.depth_buffer.resize(pixel_count, f32::INFINITY);
    }

    /// Primary colour at (x, row) with rows counted top-down.
    #[inline]
    pub fn color_at(&self, x: usize, row: usize) -> u32 {
        self.color_buffer[row * self.width + x]
    }

    #[inline]
    pub fn secondary_at(&self, x: usize, row: usize) -> Vec4 {
        self.secondary_buffer[row * self.width + x]
    }

    #[inline]
    pub fn depth_at(&self, x: usize, row: usize) -> f32 {
        self.depth_buffer[row * self.width + x]
    }

    /// Number of pixels whose primary colour differs from `clear_color`.
    pub fn count_not(&self, clear_color: u32) -> usize {
        self.color_buffer.iter().filter(|&&c| c != clear_color).count()
    }

    /// Split the framebuffer into horizontal stripes for multi-core rendering.
    /// Each stripe owns a disjoint subset of rows, so they can be rendered in parallel.
    pub fn split_into_stripes(&mut self, stripes: usize) -> Vec<FrameSlice<'_>> {
        let stripes = stripes.max(1);
        let width = self.width;
        let height = self.height;

        let mut slices = Vec::with_capacity(stripes);

        let mut remaining_color: &mut [u32] = self.color_buffer.as_mut_slice();
        let mut remaining_secondary: &mut [Vec4] = self.secondary_buffer.as_mut_slice();
        let mut remaining_depth: &mut [f32] = self.depth_buffer.as_mut_slice();

        let mut y0 = 0usize;
        let rows_per_stripe = height.div_ceil(stripes).max(1);

        while y0 < height {
            let rows = (height - y0).min(rows_per_stripe);
            let pixels = rows * width;

            let (color_head, color_tail) = remaining_color.split_at_mut(pixels);
            let (secondary_head, secondary_tail) = remaining_secondary.split_at_mut(pixels);
            let (depth_head, depth_tail) = remaining_depth.split_at_mut(pixels);

            slices.push(FrameSlice {
                width,
                full_height: height,
                y0,
                height: rows,
                color: color_head,
                secondary: secondary_head,
                depth: depth_head,
            });

            remaining_color = color_tail;
            remaining_secondary = secondary_tail;
            remaining_depth = depth_tail;
            y0 += rows;
        }

        slices
    }
}

/// Convert RGB to ARGB u32
#[inline]
pub const fn rgb_to_u32(r: u8, g: u8, b: u8) -> u32 {
    0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[inline]
fn unit_to_u8(v: f32) -> u32 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u32
}

/// Pack a [0, 1] RGBA colour into ARGB32.
#[inline]
pub fn pack_color(color: Vec4) -> u32 {
    (unit_to_u8(color.w) << 24)
        | (unit_to_u8(color.x) << 16)
        | (unit_to_u8(color.y) << 8)
        | unit_to_u8(color.z)
}

/// Unpack ARGB32 into a [0, 1] RGBA colour.
#[inline]
pub fn unpack_color(argb: u32) -> Vec4 {
    let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
    Vec4::new(channel(16), channel(8), channel(0), channel(24))
}

/// Source-over blend of `src` onto the packed `dst`.
#[inline]
pub fn blend_over(dst: u32, src: Vec4) -> u32 {
    let dst = unpack_color(dst);
    let a = src.w.clamp(0.0, 1.0);
    let rgb = src.truncate() * a + dst.truncate() * (1.0 - a);
    let alpha = a + dst.w * (1.0 - a);
    pack_color(rgb.extend(alpha))
}
