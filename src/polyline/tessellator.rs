//! Screen-space ribbon tessellation.
//!
//! Each duplicated vertex is pushed sideways in pixel space by the line
//! thickness. Joins between segments are mitered, with bevel fallbacks for
//! sharp turns and overlong spikes, and points behind the near plane are
//! walked back along their segment before projection.

use glam::{Vec2, Vec4};
use rayon::prelude::*;

use super::geometry::PolylineVertexWindow;
use super::order::Order;
use crate::count_call;
use crate::frame::FrameContext;
use crate::precision::RteTransform;

/// View-space near plane (the camera looks down -Z).
pub const NEAR: f32 = -1.0;
/// `dotNP` at or above which the two directions are treated as one line
/// doubling back (about 0.8 degrees).
pub const COLLINEAR_DOT: f32 = 0.99991;
/// `dotNP` above which a miter on the outer side is replaced by a bevel.
pub const SHARP_TURN_DOT: f32 = 0.5;
/// Smallest `|w|` divided by when projecting; points on the camera plane
/// land far off screen on their own side instead of at infinity.
pub const MIN_PROJECTED_W: f32 = 1.0e-6;

/// GLSL `sign`: zero stays zero.
#[inline]
pub fn glsl_sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Intersection of the line through `start1`/`end1` with the line through
/// `start2`/`end2`. Near-parallel pairs return `start1` unchanged.
#[inline]
pub fn get_intersection(start1: Vec2, end1: Vec2, start2: Vec2, end2: Vec2) -> Vec2 {
    let dir = end2 - start2;
    let perp = Vec2::new(-dir.y, dir.x);
    let d2 = perp.dot(start2);
    let seg = perp.dot(start1) - d2;
    let prl = seg - perp.dot(end1) + d2;
    if prl > -1.0 && prl < 1.0 {
        return start1;
    }
    let u = seg / prl;
    start1 + u * (end1 - start1)
}

/// Clip-space position to pixel coordinates (origin bottom-left).
#[inline]
pub fn project(p: Vec4, viewport: Vec2) -> Vec2 {
    let w = if p.w.abs() < MIN_PROJECTED_W {
        MIN_PROJECTED_W.copysign(p.w)
    } else {
        p.w
    };
    let ndc = p.truncate() / w;
    (0.5 * ndc.truncate() + Vec2::splat(0.5)) * viewport
}

/// Walk `current` back along its segment onto the near plane when it lies
/// behind the camera and the neighbour its order pairs with does not.
/// Returns the (possibly moved) view-space point and whether it moved.
#[inline]
pub fn clip_near(current: Vec4, prev: Vec4, next: Vec4, order: Order) -> (Vec4, bool) {
    if current.z <= NEAR {
        return (current, false);
    }
    let anchor = if order.pairs_with_prev() {
        prev
    } else {
        next
    };
    if anchor.z < NEAR {
        let t = (NEAR - anchor.z) / (current.z - anchor.z);
        (anchor + (current - anchor) * t, true)
    } else {
        (current, false)
    }
}

/// Replace neighbours that project onto `current` so both directions are
/// defined. Returns `(prev, next, substituted)`.
#[inline]
pub fn resolve_degenerate(prev: Vec2, current: Vec2, next: Vec2) -> (Vec2, Vec2, bool) {
    let mut prev = prev;
    let mut next = next;
    let mut substituted = false;
    if prev == current {
        substituted = true;
        if next == current {
            next = current + Vec2::X;
            prev = current - Vec2::X;
        } else {
            prev = current + (current - next).normalize_or_zero();
        }
    }
    if next == current {
        substituted = true;
        next = current + (current - prev).normalize_or_zero();
    }
    (prev, next, substituted)
}

/// How the join point of a vertex was chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JoinKind {
    /// Segments double back; plain offset.
    Collinear,
    /// Intersection of the offset edges (a straight line degenerates to the
    /// plain offset here).
    Miter,
    /// Outer side of a sharp turn.
    Bevel,
    /// Miter longer than the shorter adjacent segment.
    ClampedMiter,
}

/// Join point in pixel space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Join {
    pub point: Vec2,
    pub kind: JoinKind,
}

/// Offset `current` (pixels) for one ribbon edge. `prev` and `next` must
/// differ from `current` (see [`resolve_degenerate`]).
pub fn resolve_join(prev: Vec2, current: Vec2, next: Vec2, order: Order, thickness: f32) -> Join {
    let dir_next = (next - current).normalize_or_zero();
    let dir_prev = (prev - current).normalize_or_zero();
    let dot_np = dir_next.dot(dir_prev);

    let normal_next = Vec2::new(-dir_next.y, dir_next.x).normalize_or_zero();
    let normal_prev = Vec2::new(dir_prev.y, -dir_prev.x).normalize_or_zero();

    let d = thickness * order.side();

    if dot_np >= COLLINEAR_DOT {
        return Join {
            point: current - normal_prev * d,
            kind: JoinKind::Collinear,
        };
    }

    let miter = get_intersection(
        current + normal_prev * d,
        prev + normal_prev * d,
        current + normal_next * d,
        next + normal_next * d,
    );

    if dot_np > SHARP_TURN_DOT && (dir_next + dir_prev).dot(miter - current) < 0.0 {
        let turn = glsl_sign(dir_next.x * dir_prev.y - dir_next.y * dir_prev.x);
        let occw = order.as_f32() * turn;
        let bevel = if occw == -1.0 || occw == 2.0 {
            Some(current + normal_prev * d)
        } else if occw == 1.0 || occw == -2.0 {
            Some(current + normal_next * d)
        } else {
            None
        };
        // A zero turn sign keeps the miter and skips the length clamp.
        return match bevel {
            Some(point) => Join {
                point,
                kind: JoinKind::Bevel,
            },
            None => Join {
                point: miter,
                kind: JoinKind::Miter,
            },
        };
    }

    if current.distance(miter) > current.distance(next).min(current.distance(prev)) {
        return Join {
            point: current + normal_next * d,
            kind: JoinKind::ClampedMiter,
        };
    }

    Join {
        point: miter,
        kind: JoinKind::Miter,
    }
}

/// Per-draw tessellation parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TessellationParams {
    /// Half-width of the ribbon in pixels.
    pub thickness: f32,
    pub depth_offset: f32,
    pub viewport: Vec2,
}

/// Result of tessellating one duplicated vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TessellatedVertex {
    pub clip_position: Vec4,
    pub join: JoinKind,
    /// `current` was moved onto the near plane.
    pub near_clipped: bool,
    /// A degenerate neighbour was replaced.
    pub degenerate: bool,
}

/// Clip-space position of one polyline vertex.
pub fn tessellate_vertex(
    rte: &RteTransform,
    window: &PolylineVertexWindow,
    params: &TessellationParams,
) -> TessellatedVertex {
    let view_current = rte.view_position(&window.current);
    let view_prev = rte.view_position(&window.prev);
    let view_next = rte.view_position(&window.next);

    let (view_current, near_clipped) = clip_near(view_current, view_prev, view_next, window.order);

    let clip_current = rte.projection * view_current;
    let next = project(rte.projection * view_next, params.viewport);
    let prev = project(rte.projection * view_prev, params.viewport);
    let current = project(clip_current, params.viewport);
    // Overflowed neighbours fall back to the degenerate path.
    let prev = if prev.is_finite() { prev } else { current };
    let next = if next.is_finite() { next } else { current };

    let (prev, next, degenerate) = resolve_degenerate(prev, current, next);
    let join = resolve_join(prev, current, next, window.order, params.thickness);

    if near_clipped {
        count_call!(crate::perf::FUNCTION_COUNTERS.polyline_near_clips);
    }
    if degenerate {
        count_call!(crate::perf::FUNCTION_COUNTERS.polyline_degenerate_fallbacks);
    }
    match join.kind {
        JoinKind::Bevel => {
            count_call!(crate::perf::FUNCTION_COUNTERS.polyline_bevels);
        }
        JoinKind::ClampedMiter => {
            count_call!(crate::perf::FUNCTION_COUNTERS.polyline_clamped_miters);
        }
        JoinKind::Collinear | JoinKind::Miter => {}
    }

    let w = clip_current.w;
    let xy = (2.0 * join.point / params.viewport - Vec2::ONE) * w;
    TessellatedVertex {
        clip_position: Vec4::new(xy.x, xy.y, clip_current.z + params.depth_offset, w),
        join: join.kind,
        near_clipped,
        degenerate,
    }
}

/// Tessellate every window on the rayon pool. Output order matches input
/// order, so the polyline's index list applies unchanged.
pub fn tessellate_ribbon(
    frame: &FrameContext,
    params: &TessellationParams,
    windows: &[PolylineVertexWindow],
) -> Vec<Vec4> {
    crate::perf_scope!("tessellate_ribbon");
    let rte = &frame.camera.rte;
    windows
        .par_iter()
        .map(|window| tessellate_vertex(rte, window, params).clip_position)
        .collect()
}
