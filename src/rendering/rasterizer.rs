/// Triangle rasterizer driving a [`Program`]'s two stages.
///
/// A draw runs the vertex stage over every (instance, vertex) pair in
/// parallel, assembles triangles, clips them against the near clip plane,
/// then rasterizes horizontal stripes of the framebuffer in parallel. Each
/// stripe walks the triangles in submission order, so results do not depend
/// on the stripe count.
use std::time::{Duration, Instant};

use glam::{Vec2, Vec3, Vec4};
use rayon::prelude::*;

use super::framebuffer::{blend_over, pack_color, FrameSlice, Framebuffer};
use crate::error::{RenderError, Result};
use crate::frame::FrameContext;
use crate::program::{FragmentStage, Interpolate, Program, VertexOutput, VertexStage};
use crate::{count_add, count_call, perf_scope};

// A triangle clipped against one plane has at most 4 vertices.
const MAX_POLY_VERTS: usize = 4;
/// Clipped vertices with `w` below this are rejected before the divide.
const NEAR_W_EPS: f32 = 1.0e-6;

/// Fixed-function state for draws.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RasterConfig {
    pub depth_test: bool,
    pub depth_write: bool,
    /// Source-over blending of the primary output.
    pub blend: bool,
    /// Cull clockwise (window space) triangles.
    pub backface_culling: bool,
    /// Clear color (ARGB format)
    pub clear_color: u32,
    /// Number of horizontal stripes; 0 means one per rayon worker.
    pub stripes: usize,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            blend: false,
            backface_culling: false,
            clear_color: 0xFF000000,
            stripes: 0,
        }
    }
}

/// Counts reported by one draw call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Vertex stage invocations.
    pub vertices: usize,
    /// Triangles that reached rasterization (after clipping, a source
    /// triangle may contribute two).
    pub triangles_drawn: usize,
    /// Triangles rejected by clipping, culling or degeneracy.
    pub triangles_rejected: usize,
    pub fragments_written: usize,
    pub fragments_discarded: usize,
    /// Fragments that failed the depth test.
    pub fragments_occluded: usize,
    /// Wall time spent in the vertex stage.
    pub vertex_stage_time: Duration,
}

impl std::ops::Add for DrawStats {
    type Output = DrawStats;

    fn add(self, rhs: DrawStats) -> DrawStats {
        DrawStats {
            vertices: self.vertices + rhs.vertices,
            triangles_drawn: self.triangles_drawn + rhs.triangles_drawn,
            triangles_rejected: self.triangles_rejected + rhs.triangles_rejected,
            fragments_written: self.fragments_written + rhs.fragments_written,
            fragments_discarded: self.fragments_discarded + rhs.fragments_discarded,
            fragments_occluded: self.fragments_occluded + rhs.fragments_occluded,
            vertex_stage_time: self.vertex_stage_time + rhs.vertex_stage_time,
        }
    }
}

impl std::ops::AddAssign for DrawStats {
    fn add_assign(&mut self, rhs: DrawStats) {
        *self = *self + rhs;
    }
}

/// Triangle in window space: x, y in pixels (origin bottom-left), z the
/// window depth in [0, 1].
#[derive(Copy, Clone)]
struct WindowTriangle<V> {
    window: [Vec3; 3],
    inv_w: [f32; 3],
    varyings: [V; 3],
    /// Twice the signed window-space area.
    area: f32,
}

pub struct Rasterizer {
    pub config: RasterConfig,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(RasterConfig::default())
    }
}

impl Rasterizer {
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }

    /// Clear `target` to the configured clear colour.
    pub fn clear(&self, target: &mut Framebuffer) {
        count_call!(crate::perf::FUNCTION_COUNTERS.framebuffer_clear_calls);
        target.clear(self.config.clear_color);
    }

    /// Non-instanced indexed draw.
    pub fn draw_indexed<VS, FS>(
        &self,
        program: &Program<VS, FS>,
        frame: &FrameContext,
        vertices: &[VS::Vertex],
        indices: &[u32],
        target: &mut Framebuffer,
    ) -> Result<DrawStats>
    where
        VS: VertexStage<Instance = ()>,
        FS: FragmentStage<VS::Varying>,
    {
        self.draw(program, frame, vertices, &[()], indices, target)
    }

    /// Instanced indexed draw: every instance runs the whole index list.
    pub fn draw<VS, FS>(
        &self,
        program: &Program<VS, FS>,
        frame: &FrameContext,
        vertices: &[VS::Vertex],
        instances: &[VS::Instance],
        indices: &[u32],
        target: &mut Framebuffer,
    ) -> Result<DrawStats>
    where
        VS: VertexStage,
        FS: FragmentStage<VS::Varying>,
    {
        perf_scope!("draw");
        let bindings = program.bind(frame)?;
        validate_indices(indices, vertices.len())?;

        let vertex_stage = program.vertex_stage();
        let vertex_count = vertices.len();

        // Vertex stage, instance-major.
        let vertex_start = Instant::now();
        let outputs: Vec<VertexOutput<VS::Varying>> = instances
            .par_iter()
            .flat_map_iter(|instance| {
                vertices
                    .iter()
                    .map(move |vertex| vertex_stage.run(frame, vertex, instance))
            })
            .collect();
        let vertex_stage_time = vertex_start.elapsed();
        count_add!(crate::perf::FUNCTION_COUNTERS.vertices_transformed, outputs.len());

        // Primitive assembly and clipping, in submission order.
        let viewport = Vec2::new(target.width as f32, target.height as f32);
        let backface_culling = self.config.backface_culling;
        let assembled: Vec<(Vec<WindowTriangle<VS::Varying>>, usize)> = (0..instances.len())
            .into_par_iter()
            .flat_map_iter(|instance| {
                let base = instance * vertex_count;
                let outputs = &outputs;
                indices.chunks_exact(3).map(move |tri| {
                    let corners = [
                        outputs[base + tri[0] as usize],
                        outputs[base + tri[1] as usize],
                        outputs[base + tri[2] as usize],
                    ];
                    assemble_triangle(corners, viewport, backface_culling)
                })
            })
            .collect();

        let mut stats = DrawStats {
            vertices: outputs.len(),
            vertex_stage_time,
            ..DrawStats::default()
        };
        let mut triangles = Vec::with_capacity(assembled.len());
        for (tris, rejected) in assembled {
            stats.triangles_drawn += tris.len();
            stats.triangles_rejected += rejected;
            triangles.extend(tris);
        }

        let fragment_stage = program.fragment_stage();
        let config = self.config;
        let stripes = if config.stripes == 0 {
            rayon::current_num_threads()
        } else {
            config.stripes
        };
        let fragment_stats = target
            .split_into_stripes(stripes)
            .into_par_iter()
            .map(|mut slice| {
                let mut stats = DrawStats::default();
                for tri in &triangles {
                    rasterize_triangle(tri, &mut slice, &config, frame, fragment_stage, &mut stats);
                }
                stats
            })
            .reduce(DrawStats::default, |a, b| a + b);
        stats += fragment_stats;

        count_add!(crate::perf::FUNCTION_COUNTERS.fragments_written, stats.fragments_written);
        count_add!(crate::perf::FUNCTION_COUNTERS.fragments_discarded, stats.fragments_discarded);
        log::trace!(
            "draw `{}`: {} uniforms, {} instances, {:?}",
            program.name(),
            bindings.len(),
            instances.len(),
            stats
        );
        Ok(stats)
    }
}

fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<()> {
    if indices.len() % 3 != 0 {
        return Err(RenderError::IncompleteTriangle {
            index_count: indices.len(),
        });
    }
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(RenderError::IndexOutOfRange {
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}

/// Clip one triangle and map the pieces to window space. Returns the
/// surviving triangles and the number rejected.
fn assemble_triangle<V: Interpolate>(
    corners: [VertexOutput<V>; 3],
    viewport: Vec2,
    backface_culling: bool,
) -> (Vec<WindowTriangle<V>>, usize) {
    if corners.iter().any(|c| !c.position.is_finite()) {
        return (Vec::new(), 1);
    }

    let mut clipped = [corners[0]; MAX_POLY_VERTS];
    let clipped_len = clip_polygon_near(&corners, &mut clipped);
    if clipped_len < 3 {
        count_call!(crate::perf::FUNCTION_COUNTERS.triangles_near_clipped);
        return (Vec::new(), 1);
    }

    let mut out = Vec::with_capacity(clipped_len - 2);
    let mut rejected = 0;
    // Fan triangulation of the clipped polygon.
    for i in 1..(clipped_len - 1) {
        let fan = [clipped[0], clipped[i], clipped[i + 1]];
        match to_window(&fan, viewport) {
            Some(tri) if backface_culling && tri.area < 0.0 => {
                count_call!(crate::perf::FUNCTION_COUNTERS.triangles_culled);
                rejected += 1;
            }
            Some(tri) => out.push(tri),
            None => rejected += 1,
        }
    }
    (out, rejected)
}

/// Clip a polygon against the near clip plane `z + w >= 0`
/// (Sutherland-Hodgman, single plane).
fn clip_polygon_near<V: Interpolate>(
    input: &[VertexOutput<V>],
    output: &mut [VertexOutput<V>; MAX_POLY_VERTS],
) -> usize {
    let Some(&last) = input.last() else {
        return 0;
    };

    let distance = |v: &VertexOutput<V>| v.position.z + v.position.w;
    let intersect = |a: &VertexOutput<V>, b: &VertexOutput<V>| {
        let t = distance(a) / (distance(a) - distance(b));
        VertexOutput {
            position: a.position + (b.position - a.position) * t,
            varying: a.varying.lerp(&b.varying, t),
        }
    };

    let mut out_len = 0usize;
    let mut prev = last;
    let mut prev_inside = distance(&prev) >= 0.0;

    for &curr in input {
        let curr_inside = distance(&curr) >= 0.0;
        match (prev_inside, curr_inside) {
            (true, true) => {
                output[out_len] = curr;
                out_len += 1;
            }
            (true, false) => {
                output[out_len] = intersect(&prev, &curr);
                out_len += 1;
            }
            (false, true) => {
                output[out_len] = intersect(&prev, &curr);
                out_len += 1;
                output[out_len] = curr;
                out_len += 1;
            }
            (false, false) => {}
        }

        prev = curr;
        prev_inside = curr_inside;
    }

    out_len
}

fn to_window<V: Interpolate>(
    tri: &[VertexOutput<V>; 3],
    viewport: Vec2,
) -> Option<WindowTriangle<V>> {
    if tri.iter().any(|v| v.position.w <= NEAR_W_EPS) {
        return None;
    }

    let mut window = [Vec3::ZERO; 3];
    let mut inv_w = [0.0; 3];
    for (i, v) in tri.iter().enumerate() {
        let w = 1.0 / v.position.w;
        let ndc = v.position.truncate() * w;
        window[i] = ndc_to_window(ndc, viewport);
        inv_w[i] = w;
    }

    let area = edge_function(window[0].truncate(), window[1].truncate(), window[2].truncate());
    if area == 0.0 || !area.is_finite() {
        return None;
    }

    Some(WindowTriangle {
        window,
        inv_w,
        varyings: [tri[0].varying, tri[1].varying, tri[2].varying],
        area,
    })
}

/// NDC to window coordinates; y grows upwards, depth maps [-1, 1] to [0, 1].
#[inline]
fn ndc_to_window(ndc: Vec3, viewport: Vec2) -> Vec3 {
    Vec3::new(
        (ndc.x + 1.0) * 0.5 * viewport.x,
        (ndc.y + 1.0) * 0.5 * viewport.y,
        ndc.z * 0.5 + 0.5,
    )
}

/// Edge function for barycentric coordinates
/// Returns 2x the signed area of the triangle; positive when counter-clockwise.
#[inline]
fn edge_function(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn rasterize_triangle<V, FS>(
    tri: &WindowTriangle<V>,
    slice: &mut FrameSlice<'_>,
    config: &RasterConfig,
    frame: &FrameContext,
    fragment_stage: &FS,
    stats: &mut DrawStats,
) where
    V: Interpolate,
    FS: FragmentStage<V>,
{
    let [p0, p1, p2] = tri.window.map(|p| p.truncate());
    let (row_lo, row_hi) = slice.window_rows();

    // Bounding box in window pixels, intersected with this stripe.
    let min_x = p0.x.min(p1.x).min(p2.x).floor().max(0.0) as i64;
    let max_x = (p0.x.max(p1.x).max(p2.x).ceil() as i64).min(slice.width as i64 - 1);
    let min_y = (p0.y.min(p1.y).min(p2.y).floor().max(0.0) as i64).max(row_lo as i64);
    let max_y = (p0.y.max(p1.y).max(p2.y).ceil() as i64).min(row_hi as i64 - 1);
    if min_x > max_x || min_y > max_y {
        return;
    }

    // Normalize orientation so inside means all weights non-negative.
    let sign = tri.area.signum();
    let inv_area = 1.0 / tri.area.abs();

    for y in min_y..=max_y {
        let row = slice.full_height - 1 - y as usize;
        for x in min_x..=max_x {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge_function(p1, p2, p) * sign;
            let w1 = edge_function(p2, p0, p) * sign;
            let w2 = edge_function(p0, p1, p) * sign;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let b = [w0 * inv_area, w1 * inv_area, w2 * inv_area];
            let depth = b[0] * tri.window[0].z + b[1] * tri.window[1].z + b[2] * tri.window[2].z;
            if !(0.0..=1.0).contains(&depth) {
                continue;
            }

            let Some(index) = slice.index(x as usize, row) else {
                continue;
            };
            if config.depth_test && depth > slice.depth[index] {
                stats.fragments_occluded += 1;
                continue;
            }

            // Perspective-correct weights.
            let pw = [b[0] * tri.inv_w[0], b[1] * tri.inv_w[1], b[2] * tri.inv_w[2]];
            let sum = pw[0] + pw[1] + pw[2];
            let weights = [pw[0] / sum, pw[1] / sum, pw[2] / sum];
            let varying = V::blend3(&tri.varyings[0], &tri.varyings[1], &tri.varyings[2], weights);

            let frag_coord = Vec3::new(p.x, p.y, depth);
            let Some(output) = fragment_stage.run(frame, &varying, frag_coord) else {
                stats.fragments_discarded += 1;
                continue;
            };

            slice.color[index] = if config.blend {
                blend_over(slice.color[index], output.color)
            } else {
                pack_color(output.color)
            };
            if let Some(secondary) = output.secondary {
                slice.secondary[index] = secondary;
            }
            if config.depth_write {
                slice.depth[index] = depth;
            }
            stats.fragments_written += 1;
        }
    }
}

/// Window-space depth written to an attachment as `(z, z, z, 1)`.
#[inline]
pub fn attachment_depth(texel: Vec4) -> f32 {
    texel.x
}
