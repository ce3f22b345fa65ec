/// Headless demo: a handful of markers and a route drawn near the surface
/// of an earth-sized sphere, far from the coordinate origin.
use glam::{DVec3, Quat, Vec3, Vec4};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::time::Instant;

use globe_engine::rendering::unpack_color;
use globe_engine::*;

const EARTH_RADIUS: f64 = 6_378_137.0;
const WIDTH: usize = 640;
const HEIGHT: usize = 360;

/// Point at `height` metres above the sphere along the given direction.
fn surface_point(direction: DVec3, height: f64) -> DVec3 {
    direction.normalize() * (EARTH_RADIUS + height)
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    log::info!("=== Globe Engine - headless demo ===");

    let target = surface_point(DVec3::new(1.0, 0.2, 0.1), 0.0);
    let up = target.normalize();
    let mut camera = GlobeCamera::new(
        target + up * 2_000.0 + DVec3::new(0.0, 0.0, 1.0).cross(up) * 1_500.0,
        WIDTH as f32 / HEIGHT as f32,
    );
    camera.look_at(target, up);

    // Markers around the target, split relative to a local center.
    let mut markers = GeoObjectBuffer::with_rtc_center(target);
    let east = DVec3::Z.cross(up).normalize();
    let north = up.cross(east);
    let mut slots = Vec::new();
    for i in 0..16 {
        let angle = i as f64 / 16.0 * std::f64::consts::TAU;
        let position = target + (east * angle.cos() + north * angle.sin()) * 400.0;
        let id = (i + 1) as f32 / 255.0;
        let instance = GeoObjectInstance::new(position)
            .with_scale(Vec3::splat(10.0))
            .with_rotation(Quat::from_rotation_y(angle as f32))
            .with_color(Vec4::new(0.9, 0.3 + 0.04 * i as f32, 0.2, 1.0))
            .with_picking_color(Vec3::new(id, 0.0, 0.0));
        slots.push(markers.add(instance));
    }
    // Remove a couple to exercise disposal.
    markers.remove(slots[3])?;
    markers.remove(slots[7])?;

    // A route crossing the scene.
    let mut builder = PolylineBuilder::new()
        .with_rtc_center(target)
        .with_color(Vec4::new(0.1, 0.8, 1.0, 1.0));
    let route: Vec<DVec3> = (0..32)
        .map(|i| {
            let t = i as f64 / 31.0 - 0.5;
            target + east * (t * 1_200.0) + north * (200.0 * (t * 8.0).sin()) + up * 5.0
        })
        .collect();
    builder.push_path(&route)?;
    let route = builder.build();

    let geo_style = GeoObjectStyle {
        scale_law: DistanceScaleLaw::new(500.0, 20_000.0, 1.0)?,
        picking_scale: Vec3::splat(1.5),
        ..GeoObjectStyle::default()
    };
    let line_style = PolylineStyle {
        thickness: 3.0,
        opacity: 0.9,
        visible_sphere: VisibleSphere::new(
            (DVec3::ZERO - target).as_vec3(),
            EARTH_RADIUS as f32,
        ),
        picking_color: Vec4::new(0.0, 1.0, 0.0, 1.0),
        ..PolylineStyle::default()
    };

    let color_program = geo_object(&geo_style);
    let picking_program = geo_object_picking(&geo_style);
    let depth_program = geo_object_depth(&geo_style);
    let line_program = polyline_screen(&line_style);
    let line_picking_program = polyline_picking(&line_style);
    let mesh = LocalMesh::cube(1.0);

    let rasterizer = Rasterizer::new(RasterConfig {
        clear_color: rendering::rgb_to_u32(12, 18, 32),
        ..RasterConfig::default()
    });
    let blending = Rasterizer::new(RasterConfig {
        blend: true,
        ..rasterizer.config
    });
    let mut color = Framebuffer::new(WIDTH, HEIGHT);
    let mut picking = Framebuffer::new(WIDTH, HEIGHT);
    let mut depth = Framebuffer::new(WIDTH, HEIGHT);

    let mut stats = PerfStats::new();
    let frame_start = Instant::now();
    let frame = FrameContext::from_camera_relative_to(&camera, target, WIDTH, HEIGHT)
        .with_sun_position(up.as_vec3());

    let tessellation_start = Instant::now();
    let ribbon = tessellate_ribbon(&frame, &line_style.tessellation(&frame), &route.vertices);
    stats.tessellation_us = tessellation_start.elapsed().as_secs_f64() * 1e6;

    let raster_start = Instant::now();
    rasterizer.clear(&mut color);
    let markers_drawn = draw_geo_objects(&rasterizer, &color_program, &frame, &mesh, &markers, &mut color)?;
    let lines_drawn = blending.draw_indexed(&line_program, &frame, &route.vertices, &route.indices, &mut color)?;

    picking.clear(0);
    let mut drawn = markers_drawn + lines_drawn;
    drawn += draw_geo_objects(&rasterizer, &picking_program, &frame, &mesh, &markers, &mut picking)?;
    drawn += rasterizer.draw_indexed(&line_picking_program, &frame, &route.vertices, &route.indices, &mut picking)?;

    depth.clear(0);
    drawn += draw_geo_objects(&rasterizer, &depth_program, &frame, &mesh, &markers, &mut depth)?;
    stats.vertex_stage_us = drawn.vertex_stage_time.as_secs_f64() * 1e6;
    stats.rasterization_us = raster_start.elapsed().as_secs_f64() * 1e6 - stats.vertex_stage_us;
    stats.total_us = frame_start.elapsed().as_secs_f64() * 1e6;

    log::info!("markers: {} live of {} slots, {:?}", markers.len(), markers.slot_count(), markers_drawn);
    log::info!("route: {} ribbon vertices, {:?}", ribbon.len(), lines_drawn);
    log::info!(
        "coverage: color {} px, picking {} px, depth {} px",
        color.count_not(rasterizer.config.clear_color),
        picking.count_not(0),
        depth.count_not(0)
    );

    // Resolve the picking colour under the screen centre.
    let picked = unpack_color(picking.color_at(WIDTH / 2, HEIGHT / 2));
    let marker_id = (picked.x * 255.0).round() as usize;
    if picked.y > 0.5 {
        log::info!("centre pixel picks the route");
    } else if let Some(slot) = marker_id.checked_sub(1).and_then(|i| slots.get(i)) {
        log::info!("centre pixel picks marker slot {}", slot);
    } else {
        log::info!("centre pixel picks nothing");
    }

    stats.log_summary();
    FUNCTION_COUNTERS.snapshot().log_report();
    Ok(())
}
