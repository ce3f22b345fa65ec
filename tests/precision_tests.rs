//! Split-coordinate and camera-relative transform properties.
use glam::{DVec3, Vec3};
use globe_engine::precision::{camera_relative_delta, SplitCoordinate};
use globe_engine::{DistanceScaleLaw, GlobeCamera};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[test]
fn single_precision_reconstruction_within_epsilon() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
    for _ in 0..10_000 {
        let high = DVec3::new(
            rng.gen_range(-1.0e7..1.0e7f64).round(),
            rng.gen_range(-1.0e7..1.0e7f64).round(),
            rng.gen_range(-1.0e7..1.0e7f64).round(),
        );
        let low = DVec3::new(
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
        );
        let value = high + low;
        let split = SplitCoordinate::from_dvec3(value);
        let summed = split.to_vec3().as_dvec3();
        for axis in 0..3 {
            let tolerance = value[axis].abs().max(1.0) * f32::EPSILON as f64;
            assert!(
                (summed[axis] - value[axis]).abs() <= tolerance,
                "axis {} of {:?}: {} vs {}",
                axis,
                value,
                summed[axis],
                value[axis]
            );
        }
    }
}

#[test]
fn camera_relative_delta_keeps_local_precision() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..10_000 {
        let eye = DVec3::new(
            rng.gen_range(-7.0e6..7.0e6),
            rng.gen_range(-7.0e6..7.0e6),
            rng.gen_range(-7.0e6..7.0e6),
        );
        let offset = DVec3::new(
            rng.gen_range(-1000.0..1000.0),
            rng.gen_range(-1000.0..1000.0),
            rng.gen_range(-1000.0..1000.0),
        );
        let delta = camera_relative_delta(
            &SplitCoordinate::from_dvec3(eye + offset),
            &SplitCoordinate::from_dvec3(eye),
        );
        let error = (delta.as_dvec3() - offset).abs().max_element();
        assert!(error < 1e-3, "offset {:?}: error {}", offset, error);
    }
}

#[test]
fn naive_single_precision_subtraction_is_worse() {
    // Sanity check that the split matters at planetary range.
    let eye = DVec3::new(6_378_137.0, 0.0, 0.0);
    let target = eye + DVec3::new(0.123, 0.0, 0.0);
    let naive = target.as_vec3() - eye.as_vec3();
    let split = camera_relative_delta(
        &SplitCoordinate::from_dvec3(target),
        &SplitCoordinate::from_dvec3(eye),
    );
    assert!((split.x - 0.123).abs() < 1e-6);
    assert!((naive.x - 0.123).abs() > 0.05);
}

#[test]
fn scale_law_is_monotonic_and_clamped() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..200 {
        let d_min = rng.gen_range(0.1..100.0f32);
        let d_max = d_min + rng.gen_range(0.0..10_000.0f32);
        let scale_at_max = rng.gen_range(0.1..10.0f32);
        let law = DistanceScaleLaw::new(d_min, d_max, scale_at_max).unwrap();

        assert_eq!(law.scale(d_min), scale_at_max);
        assert_eq!(law.scale(0.0), scale_at_max);
        let at_max = law.scale(d_max);
        for _ in 0..20 {
            let beyond = d_max + rng.gen_range(0.0..1.0e6f32);
            assert_eq!(law.scale(beyond), at_max);
        }

        let mut distances: Vec<f32> = (0..50).map(|_| rng.gen_range(0.0..d_max * 2.0)).collect();
        distances.sort_by(|a, b| a.total_cmp(b));
        for pair in distances.windows(2) {
            assert!(law.scale(pair[0]) <= law.scale(pair[1]));
        }
    }
}

#[test]
fn rte_view_position_matches_double_precision_view() {
    let eye = DVec3::new(-2_700_000.0, 4_300_000.0, 3_800_000.0);
    let mut camera = GlobeCamera::new(eye, 1.5);
    camera.look_at(DVec3::ZERO, DVec3::Z);
    let frame = camera.frame();

    let point = eye + camera.forward * 250.0 + camera.up * 10.0;
    let view = frame.rte.view_position(&SplitCoordinate::from_dvec3(point));
    assert!((view.truncate() - Vec3::new(0.0, 10.0, -250.0)).length() < 1e-2, "{:?}", view);
}
