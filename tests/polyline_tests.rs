//! Screen-space polyline tessellation: joins, bevels, near clipping,
//! degenerate neighbours, horizon culling and full ribbon draws.
use glam::{DVec3, Mat4, Vec2, Vec3, Vec4};
use globe_engine::polyline::*;
use globe_engine::polyline::stages::PolylineFragmentStage;
use globe_engine::program::FragmentStage;
use globe_engine::{FrameContext, Framebuffer, GlobeCamera, Rasterizer, RteTransform, SplitCoordinate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const EPS: f32 = 1e-3;

fn join(prev: Vec2, current: Vec2, next: Vec2, order: Order, thickness: f32) -> Join {
    resolve_join(prev, current, next, order, thickness)
}

#[test]
fn straight_line_offsets_by_thickness() {
    let (prev, current, next) = (Vec2::new(0.0, 100.0), Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0));
    let t = 5.0;
    for order in Order::EMISSION {
        let j = join(prev, current, next, order, t);
        assert!(((j.point - current).length() - t).abs() < EPS, "{:?}: {:?}", order, j);
        let expected = current + Vec2::new(0.0, t * order.side());
        assert!((j.point - expected).length() < EPS, "{:?}: {:?}", order, j);
        assert_eq!(j.kind, JoinKind::Miter);
    }
}

#[test]
fn right_angle_miter_sits_between_bevels() {
    let (prev, current, next) = (Vec2::new(0.0, 100.0), Vec2::new(100.0, 100.0), Vec2::new(100.0, 200.0));
    let t = 5.0;
    for order in Order::EMISSION {
        let j = join(prev, current, next, order, t);
        assert_eq!(j.kind, JoinKind::Miter);
        let offset = j.point - current;
        assert!(offset.length() <= t * std::f32::consts::SQRT_2 + EPS);

        // The two plain offsets a bevel would pick.
        let d = t * order.side();
        let along_prev = Vec2::new(0.0, 1.0) * d;
        let along_next = Vec2::new(-1.0, 0.0) * d;
        assert!(offset.dot(along_prev) > 0.0);
        assert!(offset.dot(along_next) > 0.0);
        assert!((offset - along_prev).length() > EPS);
        assert!((offset - along_next).length() > EPS);
    }
}

#[test]
fn hairpin_is_treated_as_collinear() {
    let (prev, current, next) = (Vec2::new(0.0, 100.0), Vec2::new(100.0, 100.0), Vec2::new(0.0, 101.0));
    let dir_next = (next - current).normalize();
    let dir_prev = (prev - current).normalize();
    assert!(dir_next.dot(dir_prev) >= COLLINEAR_DOT);

    let j = join(prev, current, next, Order::Plus1, 4.0);
    assert_eq!(j.kind, JoinKind::Collinear);
    assert!((j.point - Vec2::new(100.0, 96.0)).length() < EPS);
}

#[test]
fn sharp_turn_bevels_outer_side_only() {
    let t = 5.0;
    let current = Vec2::new(100.0, 100.0);
    let next = current + Vec2::new(200.0, 0.0);
    let angle = 30.0f32.to_radians();
    let prev = current + 200.0 * Vec2::new(angle.cos(), angle.sin());

    // Inner side keeps the long miter.
    let half_angle = 15.0f32.to_radians();
    for order in [Order::Plus1, Order::Plus2] {
        let j = join(prev, current, next, order, t);
        assert_eq!(j.kind, JoinKind::Miter);
        assert!(((j.point - current).length() - t / half_angle.sin()).abs() < 1e-2);
    }

    // Outer side falls back to the plain offsets.
    let outer_prev = join(prev, current, next, Order::Minus1, t);
    assert_eq!(outer_prev.kind, JoinKind::Bevel);
    assert!(((outer_prev.point - current).length() - t).abs() < EPS);
    let normal_prev = Vec2::new(angle.sin(), -angle.cos());
    assert!((outer_prev.point - (current - normal_prev * t)).length() < EPS);

    let outer_next = join(prev, current, next, Order::Minus2, t);
    assert_eq!(outer_next.kind, JoinKind::Bevel);
    assert!((outer_next.point - Vec2::new(100.0, 95.0)).length() < EPS);
}

#[test]
fn clockwise_sharp_turn_bevels_the_mirrored_side() {
    let t = 5.0;
    let current = Vec2::new(100.0, 100.0);
    let next = current + Vec2::new(200.0, 0.0);
    let angle = 30.0f32.to_radians();
    // prev below the line this time, so the turn sign is negative.
    let prev = current + 200.0 * Vec2::new(angle.cos(), -angle.sin());

    // Minus side is now the inner one and keeps the long miter.
    let half_angle = 15.0f32.to_radians();
    for order in [Order::Minus1, Order::Minus2] {
        let j = join(prev, current, next, order, t);
        assert_eq!(j.kind, JoinKind::Miter, "{:?}", order);
        assert!(((j.point - current).length() - t / half_angle.sin()).abs() < 1e-2);
    }

    // Plus side bevels: the trailing duplicate on the prev edge, the leading
    // one on the next edge.
    let prev_edge = current + Vec2::new(-angle.sin(), -angle.cos()) * t;
    let next_edge = current + Vec2::new(0.0, t);

    let trailing = join(prev, current, next, Order::Plus1, t);
    assert_eq!(trailing.kind, JoinKind::Bevel);
    assert!((trailing.point - prev_edge).length() < EPS, "{:?}", trailing);
    assert!((trailing.point - next_edge).length() > EPS);

    let leading = join(prev, current, next, Order::Plus2, t);
    assert_eq!(leading.kind, JoinKind::Bevel);
    assert!((leading.point - next_edge).length() < EPS, "{:?}", leading);
    assert!((leading.point - prev_edge).length() > EPS);
}

#[test]
fn overlong_miter_is_clamped() {
    // Right angle whose next segment is shorter than the miter.
    let (prev, current, next) = (Vec2::new(0.0, 100.0), Vec2::new(100.0, 100.0), Vec2::new(100.0, 103.0));
    let j = join(prev, current, next, Order::Plus1, 5.0);
    assert_eq!(j.kind, JoinKind::ClampedMiter);
    assert!((j.point - Vec2::new(95.0, 100.0)).length() < EPS);
}

#[test]
fn clip_near_lands_exactly_on_plane() {
    let current = Vec4::new(1.0, 2.0, 0.5, 1.0);
    let prev = Vec4::new(-1.0, 0.0, -3.0, 1.0);
    let next = Vec4::new(0.0, 0.0, 4.0, 1.0);
    let (clipped, moved) = clip_near(current, prev, next, Order::Plus1);
    assert!(moved);
    assert!((clipped.z - NEAR).abs() < 1e-6);
    // Stays on the segment towards prev.
    let t = (NEAR - prev.z) / (current.z - prev.z);
    assert!((clipped - (prev + (current - prev) * t)).length() < 1e-5);

    // Already in front: untouched.
    let front = Vec4::new(0.0, 0.0, -2.0, 1.0);
    assert_eq!(clip_near(front, prev, next, Order::Minus1), (front, false));
}

fn perspective_rte(viewport: Vec2) -> RteTransform {
    let projection = Mat4::perspective_rh_gl(45.0f32.to_radians(), viewport.x / viewport.y, 1.0, 1.0e6);
    RteTransform::new(&Mat4::IDENTITY, &projection, SplitCoordinate::ZERO)
}

fn window(prev: Vec3, current: Vec3, next: Vec3, order: Order) -> PolylineVertexWindow {
    PolylineVertexWindow {
        prev: SplitCoordinate::from_dvec3(prev.as_dvec3()),
        current: SplitCoordinate::from_dvec3(current.as_dvec3()),
        next: SplitCoordinate::from_dvec3(next.as_dvec3()),
        order,
        color: Vec4::ONE,
    }
}

#[test]
fn tessellated_vertex_is_thickness_pixels_from_centerline() {
    let viewport = Vec2::new(800.0, 600.0);
    let rte = perspective_rte(viewport);
    let params = TessellationParams {
        thickness: 4.0,
        depth_offset: 0.0,
        viewport,
    };
    let (prev, current, next) = (Vec3::new(-5.0, 1.0, -20.0), Vec3::new(0.0, 1.0, -20.0), Vec3::new(5.0, 1.0, -20.0));
    let center = project(rte.projection * current.extend(1.0), viewport);

    for order in Order::EMISSION {
        let out = tessellate_vertex(&rte, &window(prev, current, next, order), &params);
        assert!(!out.near_clipped && !out.degenerate);
        let pixel = project(out.clip_position, viewport);
        let expected = center + Vec2::new(0.0, 4.0 * order.side());
        assert!((pixel - expected).length() < 1e-2, "{:?}: {:?} vs {:?}", order, pixel, expected);
    }
}

#[test]
fn neighbour_on_camera_plane_still_joins() {
    let viewport = Vec2::new(800.0, 600.0);
    let rte = perspective_rte(viewport);
    let t = 4.0;
    let params = TessellationParams {
        thickness: t,
        depth_offset: 0.0,
        viewport,
    };
    // `prev` sits at view z = 0, so its clip w is zero.
    let (prev, current, next) = (Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 3.0, -10.0));
    let center = project(rte.projection * current.extend(1.0), viewport);

    for order in Order::EMISSION {
        let out = tessellate_vertex(&rte, &window(prev, current, next, order), &params);
        assert!(out.clip_position.is_finite(), "{:?}: {:?}", order, out);
        assert!((out.clip_position.w - 10.0).abs() < 1e-4);
        // A right-angle turn: prev projects far to the right, next straight up.
        assert_eq!(out.join, JoinKind::Miter, "{:?}", order);
        let offset = project(out.clip_position, viewport) - center;
        assert!((offset.length() - t * std::f32::consts::SQRT_2).abs() < 1e-2, "{:?}: {:?}", order, offset);
    }
}

#[test]
fn depth_offset_shifts_clip_z_only() {
    let viewport = Vec2::new(100.0, 100.0);
    let rte = perspective_rte(viewport);
    let w = window(Vec3::new(-1.0, 0.0, -10.0), Vec3::new(0.0, 0.0, -10.0), Vec3::new(1.0, 0.0, -10.0), Order::Plus2);
    let base = TessellationParams {
        thickness: 2.0,
        depth_offset: 0.0,
        viewport,
    };
    let shifted = TessellationParams {
        depth_offset: -0.25,
        ..base
    };
    let a = tessellate_vertex(&rte, &w, &base).clip_position;
    let b = tessellate_vertex(&rte, &w, &shifted).clip_position;
    assert_eq!(a.x, b.x);
    assert_eq!(a.y, b.y);
    assert_eq!(a.w, b.w);
    assert!((a.z - 0.25 - b.z).abs() < 1e-5);
}

#[test]
fn behind_camera_vertex_is_pulled_to_near_plane() {
    let viewport = Vec2::new(100.0, 100.0);
    let rte = perspective_rte(viewport);
    let params = TessellationParams {
        thickness: 2.0,
        depth_offset: 0.0,
        viewport,
    };
    let prev = Vec3::new(0.0, 0.0, -5.0);
    let current = Vec3::new(1.0, 0.0, 2.0);
    let next = Vec3::new(2.0, 0.0, 6.0);

    let out = tessellate_vertex(&rte, &window(prev, current, next, Order::Minus1), &params);
    assert!(out.near_clipped);
    assert!((out.clip_position.w + NEAR).abs() < 1e-4, "{:?}", out.clip_position);
    assert!(out.clip_position.is_finite());

    // The ±2 duplicates pair with next, which is also behind.
    let out = tessellate_vertex(&rte, &window(prev, current, next, Order::Plus2), &params);
    assert!(!out.near_clipped);
}

#[test]
fn coincident_neighbours_produce_finite_offsets() {
    let viewport = Vec2::new(200.0, 200.0);
    let rte = perspective_rte(viewport);
    let params = TessellationParams {
        thickness: 3.0,
        depth_offset: 0.0,
        viewport,
    };
    let p = Vec3::new(0.5, -0.5, -8.0);
    let center = project(rte.projection * p.extend(1.0), viewport);

    // Single-point path: both neighbours coincide.
    let out = tessellate_vertex(&rte, &window(p, p, p, Order::Plus1), &params);
    assert!(out.degenerate);
    assert!(out.clip_position.is_finite());
    let pixel = project(out.clip_position, viewport);
    assert!((pixel - (center + Vec2::new(0.0, 3.0))).length() < 1e-2);

    // Open end: prev is the point itself.
    let out = tessellate_vertex(&rte, &window(p, p, Vec3::new(2.0, -0.5, -8.0), Order::Minus2), &params);
    assert!(out.degenerate);
    let pixel = project(out.clip_position, viewport);
    assert!(((pixel - center).length() - 3.0).abs() < 1e-2);
}

#[test]
fn ribbon_matches_per_vertex_tessellation() {
    let camera = GlobeCamera::new(DVec3::ZERO, 1.0);
    let frame = FrameContext::from_camera(&camera, 128, 128);
    let mut builder = PolylineBuilder::new();
    let path: Vec<DVec3> = (0..20)
        .map(|i| DVec3::new(i as f64 - 10.0, ((i as f64) * 0.7).sin() * 3.0, -30.0 - i as f64))
        .collect();
    builder.push_path(&path).unwrap();
    let geometry = builder.build();

    let style = PolylineStyle::default();
    let params = style.tessellation(&frame);
    let ribbon = tessellate_ribbon(&frame, &params, &geometry.vertices);
    assert_eq!(ribbon.len(), geometry.vertices.len());
    for (window, clip) in geometry.vertices.iter().zip(&ribbon) {
        assert_eq!(tessellate_vertex(&frame.camera.rte, window, &params).clip_position, *clip);
    }
}

#[test]
fn fuzz_tessellation_stays_finite() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
    let viewport = Vec2::new(640.0, 480.0);
    let rte = perspective_rte(viewport);

    let in_front = |rng: &mut ChaCha8Rng| {
        Vec3::new(
            rng.gen_range(-500.0..500.0),
            rng.gen_range(-500.0..500.0),
            rng.gen_range(-1000.0..-2.0),
        )
    };

    for _ in 0..5_000 {
        let prev = in_front(&mut rng);
        let next = in_front(&mut rng);
        // Current anywhere, including behind the camera; both neighbours
        // in front so a behind-camera current is always clipped.
        let current = match rng.gen_range(0..4) {
            0 => prev,
            1 => Vec3::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0), rng.gen_range(-0.5..50.0)),
            _ => in_front(&mut rng),
        };
        let order = Order::EMISSION[rng.gen_range(0..4)];
        let params = TessellationParams {
            thickness: rng.gen_range(0.5..20.0),
            depth_offset: rng.gen_range(-0.01..0.01),
            viewport,
        };
        let out = tessellate_vertex(&rte, &window(prev, current, next, order), &params);
        assert!(
            out.clip_position.is_finite(),
            "{:?} {:?} {:?} {:?} -> {:?}",
            prev,
            current,
            next,
            order,
            out
        );
        assert!(out.clip_position.w > 0.0);
    }
}

fn fragment_frame(camera_position: Vec3) -> FrameContext {
    let camera = GlobeCamera::new(camera_position.as_dvec3(), 1.0);
    FrameContext::from_camera(&camera, 64, 64)
}

fn camera_at_dot(position: Vec3, dot: f32) -> Vec3 {
    // Sphere normal at `position` is +Z.
    let dir = Vec3::new((1.0 - dot * dot).sqrt(), 0.0, dot);
    position - dir * 10.0
}

#[test]
fn visibility_threshold_discards_far_side() {
    let sphere = VisibleSphere::new(Vec3::ZERO, 5.0);
    let stage = PolylineFragmentStage { visible_sphere: sphere };
    let position = Vec3::new(0.0, 0.0, 10.0);
    let varying = PolylineVarying {
        color: Vec4::ONE,
        position,
    };

    let culled = fragment_frame(camera_at_dot(position, VISIBILITY_DOT_THRESHOLD + 0.01));
    assert!(stage.run(&culled, &varying, Vec3::ZERO).is_none());

    let kept = fragment_frame(camera_at_dot(position, VISIBILITY_DOT_THRESHOLD - 0.01));
    assert_eq!(
        stage.run(&kept, &varying, Vec3::ZERO).map(|o| o.color),
        Some(Vec4::ONE)
    );

    let disabled = PolylineFragmentStage {
        visible_sphere: VisibleSphere::DISABLED,
    };
    assert!(disabled.run(&culled, &varying, Vec3::ZERO).is_some());
}

fn horizontal_line() -> PolylineGeometry {
    let mut builder = PolylineBuilder::new().with_color(Vec4::new(0.0, 1.0, 0.0, 1.0));
    builder
        .push_path(&[DVec3::new(-3.0, 0.0, -10.0), DVec3::new(3.0, 0.0, -10.0)])
        .unwrap();
    builder.build()
}

#[test]
fn ribbon_covers_twice_thickness() {
    let camera = GlobeCamera::new(DVec3::ZERO, 1.0);
    let frame = FrameContext::from_camera(&camera, 64, 64);
    let geometry = horizontal_line();
    let style = PolylineStyle {
        thickness: 3.0,
        ..PolylineStyle::default()
    };

    let rasterizer = Rasterizer::default();
    let mut fb = Framebuffer::new(64, 64);
    rasterizer.clear(&mut fb);
    let stats = rasterizer
        .draw_indexed(&polyline_screen(&style), &frame, &geometry.vertices, &geometry.indices, &mut fb)
        .unwrap();
    assert_eq!(stats.triangles_drawn, 2);

    let covered = (0..64).filter(|&row| fb.color_at(32, row) == 0xFF00FF00).count();
    assert!((5..=7).contains(&covered), "covered {} rows", covered);
}

#[test]
fn picking_pass_uses_draw_colour() {
    let camera = GlobeCamera::new(DVec3::ZERO, 1.0);
    let frame = FrameContext::from_camera(&camera, 64, 64);
    let geometry = horizontal_line();
    let style = PolylineStyle {
        thickness: 3.0,
        opacity: 0.25,
        picking_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
        ..PolylineStyle::default()
    };

    let rasterizer = Rasterizer::default();
    let mut fb = Framebuffer::new(64, 64);
    rasterizer.clear(&mut fb);
    rasterizer
        .draw_indexed(&polyline_picking(&style), &frame, &geometry.vertices, &geometry.indices, &mut fb)
        .unwrap();
    assert_eq!(fb.color_at(32, 32), 0xFFFF0000);
}
