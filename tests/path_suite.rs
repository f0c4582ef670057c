use approx::assert_relative_eq;
use tui_wormhole::scene::curve::{ClosedCurve, CurvePreset};
use tui_wormhole::scene::path::PathParams;

/// Forward distance from `a` to `b` around the unit loop.
fn forward_gap(a: f64, b: f64) -> f64 {
    (b - a).rem_euclid(1.0)
}

// ── Defaults ────────────────────────────────────────────────────────────────

#[test]
fn defaults_match_the_flythrough_timing() {
    let p = PathParams::default();
    assert_relative_eq!(p.start_offset, 0.05);
    assert_relative_eq!(p.loop_time_ms, 13_000.0);
    assert_relative_eq!(p.look_ahead, 0.02);
    assert_relative_eq!(p.speed_factor, 0.25);
    assert_relative_eq!(p.period_ms(), 52_000.0);
}

#[test]
fn starts_at_the_offset() {
    let (cam, look) = PathParams::default().progress(0.0);
    assert_relative_eq!(cam, 0.05, epsilon = 1e-12);
    assert_relative_eq!(look, 0.07, epsilon = 1e-12);
}

// ── Periodicity ─────────────────────────────────────────────────────────────

#[test]
fn progress_repeats_every_period() {
    let p = PathParams::default();
    let period = p.period_ms();
    for t in [0.0, 1234.5, 20_000.0, 51_999.0] {
        let (a, la) = p.progress(t);
        for k in 1..4 {
            let (b, lb) = p.progress(t + period * k as f64);
            assert_relative_eq!(a, b, epsilon = 1e-9);
            assert_relative_eq!(la, lb, epsilon = 1e-9);
        }
    }
}

#[test]
fn camera_pose_repeats_every_period() {
    let curve = CurvePreset::Wormhole.build();
    let p = PathParams::default();
    let a = p.camera_state(&curve, 7_000.0);
    let b = p.camera_state(&curve, 7_000.0 + p.period_ms());
    assert!(a.position.distance(b.position) < 1e-3);
    assert!(a.look_at.distance(b.look_at) < 1e-3);
}

#[test]
fn progress_is_linear_in_time() {
    let p = PathParams::default();
    let (a, _) = p.progress(1_000.0);
    let (b, _) = p.progress(2_000.0);
    // 1000 ms * 0.25 / 13000 per second of real time.
    assert_relative_eq!(b - a, 250.0 / 13_000.0, epsilon = 1e-9);
}

#[test]
fn params_stay_in_unit_interval() {
    let p = PathParams::new(0.97, 13_000.0, 0.05, 1.0);
    for i in 0..2_000 {
        let (cam, look) = p.progress(i as f64 * 37.0);
        assert!((0.0..1.0).contains(&cam), "cam {cam}");
        assert!((0.0..1.0).contains(&look), "look {look}");
    }
}

#[test]
fn negative_time_wraps_backwards() {
    let p = PathParams::default();
    let (cam, _) = p.progress(-p.period_ms() / 4.0);
    assert_relative_eq!(cam, 0.80, epsilon = 1e-9);
}

// ── Look-ahead ──────────────────────────────────────────────────────────────

#[test]
fn look_at_leads_camera_by_look_ahead() {
    let p = PathParams::default();
    for i in 0..500 {
        let (cam, look) = p.progress(i as f64 * 211.0);
        assert_relative_eq!(forward_gap(cam, look), 0.02, epsilon = 1e-9);
    }
}

#[test]
fn look_at_wraps_past_the_seam() {
    let p = PathParams::new(0.99, 13_000.0, 0.02, 1.0);
    let (cam, look) = p.progress(0.0);
    assert_relative_eq!(cam, 0.99, epsilon = 1e-12);
    assert_relative_eq!(look, 0.01, epsilon = 1e-9);
}

#[test]
fn camera_faces_along_the_curve() {
    let curve = CurvePreset::Wormhole.build();
    let p = PathParams::default();
    for i in 0..50 {
        let state = p.camera_state(&curve, i as f64 * 1_000.0);
        let tangent = curve.tangent_at(state.camera_param as f32);
        assert!(state.forward().dot(tangent) > 0.8, "frame {i}");
        assert_relative_eq!(state.forward().length(), 1.0, epsilon = 1e-4);
    }
}

#[test]
fn zero_look_ahead_collapses_to_camera() {
    let curve = ClosedCurve::circle(1.0, 16);
    let p = PathParams::new(0.0, 1_000.0, 0.0, 1.0);
    let s = p.camera_state(&curve, 250.0);
    assert_eq!(s.camera_param, s.look_at_param);
    assert_eq!(s.forward(), glam::Vec3::ZERO);
}

// ── Invalid parameters ──────────────────────────────────────────────────────

#[test]
#[should_panic(expected = "loop_time_ms must be positive")]
fn zero_loop_time_is_rejected() {
    let _ = PathParams::new(0.0, 0.0, 0.02, 1.0);
}

#[test]
#[should_panic(expected = "speed_factor must be positive")]
fn negative_speed_is_rejected() {
    let _ = PathParams::new(0.0, 13_000.0, 0.02, -1.0);
}
