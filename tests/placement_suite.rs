use approx::assert_relative_eq;
use glam::Vec3;
use tui_wormhole::scene::curve::{ClosedCurve, CurvePreset};
use tui_wormhole::scene::placement::{
    orthonormal_frame, PlacementConfig, PlacementHistory, WormDescriptor, WormPlacer,
};

fn unit_circle() -> ClosedCurve {
    ClosedCurve::circle(1.0, 16)
}

fn config(max_count: usize, min_distance: f32) -> PlacementConfig {
    PlacementConfig {
        max_count,
        min_pairwise_distance: min_distance,
        ..PlacementConfig::default()
    }
}

/// Every worm keeps `min` distance from the `window` worms accepted just before it.
fn assert_window_spacing(worms: &[WormDescriptor], window: usize, min: f32) {
    for (i, w) in worms.iter().enumerate() {
        for prev in &worms[i.saturating_sub(window)..i] {
            let d = w.position.distance(prev.position);
            assert!(
                d >= min,
                "worm {} is {d} from worm {} (min {min})",
                w.index,
                prev.index
            );
        }
    }
}

// ── Low-density scenario ────────────────────────────────────────────────────

#[test]
fn sparse_circle_places_every_worm() {
    let curve = unit_circle();
    let placer = WormPlacer::new(config(10, 0.5));
    for seed in 0..16u64 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let placement = placer.place(&curve, &mut rng);
        assert_eq!(placement.worms.len(), 10, "seed {seed}");
        assert_eq!(placement.report.placed, 10);
        assert_eq!(placement.report.skipped, 0);
        assert_window_spacing(&placement.worms, 8, 0.5);
    }
}

#[test]
fn worms_sit_in_the_radial_band_around_their_param() {
    let curve = unit_circle();
    let mut rng = fastrand::Rng::with_seed(7);
    let placement = WormPlacer::new(config(10, 0.5)).place(&curve, &mut rng);
    for w in &placement.worms {
        assert!((0.0..1.0).contains(&w.param));
        let r = w.position.distance(curve.position_at(w.param));
        assert!((0.35 - 1e-4..=0.45 + 1e-4).contains(&r), "radius {r}");
        // The offset lies in the plane perpendicular to the tangent.
        let offset = w.position - curve.position_at(w.param);
        assert!(offset.dot(curve.tangent_at(w.param)).abs() < 1e-3);
    }
}

#[test]
fn base_params_follow_index_slots() {
    let curve = unit_circle();
    let mut rng = fastrand::Rng::with_seed(3);
    let placement = WormPlacer::new(config(10, 0.0)).place(&curve, &mut rng);
    for w in &placement.worms {
        let slot = w.index as f32 / 10.0;
        let jitter = (w.param - slot).rem_euclid(1.0);
        assert!(jitter < 0.05 + 1e-6, "index {} jitter {jitter}", w.index);
    }
}

// ── Dense scenario ──────────────────────────────────────────────────────────

#[test]
fn dense_placement_respects_window_and_upper_bound() {
    let curve = unit_circle();
    let placer = WormPlacer::new(config(200, 0.5));
    for seed in [1u64, 2, 3] {
        let mut rng = fastrand::Rng::with_seed(seed);
        let placement = placer.place(&curve, &mut rng);
        let report = placement.report;
        assert!(report.placed <= 200);
        assert!(report.placed < 200, "200 worms cannot fit 0.5 apart on a unit circle");
        assert_eq!(report.placed + report.skipped, report.requested);
        assert_eq!(report.placed, placement.worms.len());
        assert!(report.total_attempts >= report.requested);
        assert!(report.total_attempts <= report.requested * 20);
        assert_window_spacing(&placement.worms, 8, 0.5);
    }
}

#[test]
fn skipped_worms_use_every_attempt() {
    let curve = unit_circle();
    let mut rng = fastrand::Rng::with_seed(11);
    // Nothing can ever be 100 units from a neighbour on a unit circle.
    let placement = WormPlacer::new(config(5, 100.0)).place(&curve, &mut rng);
    assert_eq!(placement.report.placed, 1);
    assert_eq!(placement.report.skipped, 4);
    assert_eq!(placement.report.total_attempts, 1 + 4 * 20);
}

#[test]
fn zero_count_places_nothing() {
    let mut rng = fastrand::Rng::with_seed(0);
    let placement = WormPlacer::new(config(0, 0.5)).place(&unit_circle(), &mut rng);
    assert!(placement.worms.is_empty());
    assert_eq!(placement.report.total_attempts, 0);
}

#[test]
fn wormhole_default_placement_spacing() {
    let curve = CurvePreset::Wormhole.build();
    let mut rng = fastrand::Rng::with_seed(42);
    let placement = WormPlacer::new(PlacementConfig::default()).place(&curve, &mut rng);
    assert!(placement.report.placed > 0);
    assert!(placement.report.placed <= 120);
    assert_window_spacing(&placement.worms, 8, 0.5);
}

// ── Worm descriptors ────────────────────────────────────────────────────────

#[test]
fn worm_colors_and_ends_are_well_formed() {
    let mut rng = fastrand::Rng::with_seed(5);
    let placement = WormPlacer::new(config(30, 0.3)).place(&CurvePreset::Wormhole.build(), &mut rng);
    for w in &placement.worms {
        assert!(w.color.iter().all(|c| (0.0..=1.0).contains(c)), "{:?}", w.color);
        assert!(w.color.iter().any(|&c| c > 0.05), "too dark: {:?}", w.color);
        let (head, tail) = (w.head(), w.tail());
        assert_relative_eq!(head.direction.length(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(tail.direction.length(), 1.0, epsilon = 1e-4);
        // Ends sit near the worm's anchor, one body length apart at most.
        assert!(head.position.distance(w.position) < 0.3);
        assert!(tail.position.distance(w.position) < 0.3);
        assert!(head.position.distance(tail.position) > 0.05);
    }
}

// ── Orthonormal frames ──────────────────────────────────────────────────────

fn assert_orthonormal(t: Vec3) {
    let f = orthonormal_frame(t);
    assert_relative_eq!(f.tangent.length(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(f.normal.length(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(f.side.length(), 1.0, epsilon = 1e-5);
    assert!(f.tangent.dot(f.normal).abs() < 1e-5, "t·n for {t:?}");
    assert!(f.tangent.dot(f.side).abs() < 1e-5, "t·s for {t:?}");
    assert!(f.normal.dot(f.side).abs() < 1e-5, "n·s for {t:?}");
}

#[test]
fn frames_are_orthonormal_including_near_vertical_tangents() {
    let tangents = [
        Vec3::X,
        Vec3::Z,
        Vec3::new(1.0, 2.0, 3.0),
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::new(0.01, 1.0, 0.0),
        Vec3::new(0.0, 0.95, 0.31),
        Vec3::new(-0.3, -0.9, 0.1),
    ];
    for t in tangents {
        assert_orthonormal(t);
    }
    let mut rng = fastrand::Rng::with_seed(9);
    for _ in 0..500 {
        let t = Vec3::new(rng.f32() - 0.5, rng.f32() - 0.5, rng.f32() - 0.5);
        if t.length() > 1e-3 {
            assert_orthonormal(t);
        }
    }
}

#[test]
fn zero_tangent_falls_back_to_z() {
    let f = orthonormal_frame(Vec3::ZERO);
    assert_eq!(f.tangent, Vec3::Z);
    assert!(f.normal.is_finite() && f.side.is_finite());
}

#[test]
fn frame_maps_local_axes() {
    let f = orthonormal_frame(Vec3::X);
    assert_relative_eq!(f.to_world(Vec3::Z).distance(Vec3::X), 0.0, epsilon = 1e-6);
    assert_relative_eq!(f.to_world(Vec3::X).distance(f.normal), 0.0, epsilon = 1e-6);
}

// ── History window ──────────────────────────────────────────────────────────

#[test]
fn history_evicts_oldest_first() {
    let mut h = PlacementHistory::new(8);
    assert!(h.is_empty());
    for i in 0..10 {
        h.push(Vec3::new(i as f32, 0.0, 0.0));
    }
    assert_eq!(h.len(), 8);
    assert_eq!(h.capacity(), 8);
    let xs: Vec<f32> = h.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
}

#[test]
fn history_only_constrains_remembered_points() {
    let mut h = PlacementHistory::new(2);
    h.push(Vec3::ZERO);
    assert!(!h.admits(Vec3::new(0.1, 0.0, 0.0), 0.5));
    h.push(Vec3::new(10.0, 0.0, 0.0));
    h.push(Vec3::new(20.0, 0.0, 0.0));
    // The origin aged out.
    assert!(h.admits(Vec3::new(0.1, 0.0, 0.0), 0.5));
    // Exactly at the minimum distance is accepted.
    assert!(h.admits(Vec3::new(10.5, 0.0, 0.0), 0.5));
}

#[test]
#[should_panic(expected = "non-zero capacity")]
fn empty_history_is_rejected() {
    let _ = PlacementHistory::new(0);
}

#[test]
#[should_panic(expected = "radial offset range")]
fn inverted_radial_range_is_rejected() {
    let _ = WormPlacer::new(PlacementConfig {
        radial_offset_range: [0.5, 0.1],
        ..PlacementConfig::default()
    });
}
