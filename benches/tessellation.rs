/// Benchmarks for the screen-space polyline tessellator.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{DVec3, Vec2, Vec4};
use globe_engine::polyline::{resolve_join, tessellate_vertex, Order};
use globe_engine::*;

const EARTH_RADIUS: f64 = 6_378_137.0;

fn frame() -> FrameContext {
    let eye = DVec3::new(EARTH_RADIUS + 3_000.0, 0.0, 0.0);
    let mut camera = GlobeCamera::new(eye, 16.0 / 9.0);
    camera.look_at(DVec3::new(EARTH_RADIUS, 0.0, 0.0), DVec3::Z);
    FrameContext::from_camera(&camera, 1280, 720)
}

fn route(points: usize) -> PolylineGeometry {
    let mut builder = PolylineBuilder::new().with_color(Vec4::new(0.1, 0.8, 1.0, 1.0));
    let path: Vec<DVec3> = (0..points)
        .map(|i| {
            let t = i as f64 / points as f64 - 0.5;
            DVec3::new(EARTH_RADIUS, t * 4_000.0, 300.0 * (t * 20.0).sin())
        })
        .collect();
    builder.push_path(&path).expect("route has at least two points");
    builder.build()
}

fn bench_resolve_join(c: &mut Criterion) {
    c.bench_function("resolve_join_miter", |b| {
        b.iter(|| {
            resolve_join(
                black_box(Vec2::new(0.0, 100.0)),
                black_box(Vec2::new(100.0, 100.0)),
                black_box(Vec2::new(150.0, 180.0)),
                Order::Plus1,
                3.0,
            )
        });
    });
}

fn bench_tessellate_vertex(c: &mut Criterion) {
    let frame = frame();
    let geometry = route(64);
    let style = PolylineStyle::default();
    let params = style.tessellation(&frame);
    let window = geometry.vertices[geometry.vertices.len() / 2];

    c.bench_function("tessellate_vertex", |b| {
        b.iter(|| tessellate_vertex(&frame.camera.rte, black_box(&window), &params));
    });
}

fn bench_tessellate_ribbon(c: &mut Criterion) {
    let mut group = c.benchmark_group("tessellate_ribbon");
    let frame = frame();
    let style = PolylineStyle::default();
    let params = style.tessellation(&frame);

    for points in [64usize, 1024, 16384] {
        let geometry = route(points);
        group.bench_with_input(BenchmarkId::from_parameter(points), &geometry, |b, geometry| {
            b.iter(|| tessellate_ribbon(&frame, &params, black_box(&geometry.vertices)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve_join, bench_tessellate_vertex, bench_tessellate_ribbon);
criterion_main!(benches);
