/// Benchmarks for the geo object vertex transform and instanced draws.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{DVec3, Quat, Vec3, Vec4};
use globe_engine::geo_object::{clip_position, InstanceAnchor};
use globe_engine::*;

const EARTH_RADIUS: f64 = 6_378_137.0;

fn camera() -> GlobeCamera {
    let eye = DVec3::new(EARTH_RADIUS + 2_000.0, 0.0, 0.0);
    let mut camera = GlobeCamera::new(eye, 16.0 / 9.0);
    camera.look_at(DVec3::new(EARTH_RADIUS, 0.0, 0.0), DVec3::Z);
    camera
}

fn markers(count: usize) -> GeoObjectBuffer {
    let mut buffer = GeoObjectBuffer::new();
    let side = (count as f64).sqrt().ceil() as usize;
    for i in 0..count {
        let (row, col) = ((i / side) as f64, (i % side) as f64);
        let position = DVec3::new(EARTH_RADIUS, (col - side as f64 / 2.0) * 40.0, (row - side as f64 / 2.0) * 40.0);
        buffer.add(
            GeoObjectInstance::new(position)
                .with_scale(Vec3::splat(8.0))
                .with_rotation(Quat::from_rotation_z(i as f32 * 0.1))
                .with_color(Vec4::new(0.8, 0.4, 0.1, 1.0)),
        );
    }
    buffer
}

fn bench_instance_anchor(c: &mut Criterion) {
    let frame = camera().frame();
    let instance = GeoObjectInstance::new(DVec3::new(EARTH_RADIUS, 12.5, -40.25));
    let law = DistanceScaleLaw::new(100.0, 10_000.0, 1.0).unwrap();

    c.bench_function("instance_anchor", |b| {
        b.iter(|| InstanceAnchor::new(black_box(&frame.rte), black_box(&instance), &law));
    });
}

fn bench_clip_position(c: &mut Criterion) {
    let frame = camera().frame();
    let instance = GeoObjectInstance::new(DVec3::new(EARTH_RADIUS, 12.5, -40.25))
        .with_rotation(Quat::from_rotation_y(0.3));
    let law = DistanceScaleLaw::new(100.0, 10_000.0, 1.0).unwrap();

    c.bench_function("geo_object_clip_position", |b| {
        b.iter(|| {
            clip_position(
                black_box(&frame.rte),
                black_box(&instance),
                &law,
                black_box(Vec3::new(0.5, -0.5, 0.5)),
                Vec3::ONE,
            )
        });
    });
}

fn bench_draw_markers(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw_geo_objects");
    let camera = camera();
    let frame = FrameContext::from_camera(&camera, 1280, 720);
    let mesh = LocalMesh::cube(1.0);
    let style = GeoObjectStyle {
        scale_law: DistanceScaleLaw::new(500.0, 20_000.0, 1.0).unwrap(),
        ..GeoObjectStyle::default()
    };
    let colour = geo_object(&style);
    let picking = geo_object_picking(&style);
    let rasterizer = Rasterizer::default();

    for count in [16usize, 256, 4096] {
        let buffer = markers(count);
        let mut framebuffer = Framebuffer::new(1280, 720);

        group.bench_with_input(BenchmarkId::new("colour", count), &buffer, |b, buffer| {
            b.iter(|| {
                rasterizer.clear(&mut framebuffer);
                draw_geo_objects(&rasterizer, &colour, &frame, &mesh, black_box(buffer), &mut framebuffer)
            });
        });
        group.bench_with_input(BenchmarkId::new("picking", count), &buffer, |b, buffer| {
            b.iter(|| {
                rasterizer.clear(&mut framebuffer);
                draw_geo_objects(&rasterizer, &picking, &frame, &mesh, black_box(buffer), &mut framebuffer)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_instance_anchor, bench_clip_position, bench_draw_markers);
criterion_main!(benches);
