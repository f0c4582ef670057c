use approx::assert_relative_eq;
use tui_wormhole::clock::{Clock, ManualClock};
use tui_wormhole::config::Quality;
use tui_wormhole::flight::{Flythrough, TickOutcome};
use tui_wormhole::scene::curve::ClosedCurve;
use tui_wormhole::scene::path::{CameraState, PathParams};
use tui_wormhole::scene::placement::PlacementConfig;
use tui_wormhole::scene::{Scene, SceneStyle};
use tui_wormhole::visual::bloom::BloomSettings;
use tui_wormhole::visual::{SceneRenderer, WormholeEngine};

/// Records every camera it is asked to draw.
#[derive(Default)]
struct Recorder {
    cameras: Vec<CameraState>,
    frame: Vec<u8>,
}

impl SceneRenderer for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.frame = vec![0; w * h * 4];
    }

    fn render(&mut self, _scene: &Scene, camera: &CameraState) -> &[u8] {
        self.cameras.push(*camera);
        &self.frame
    }

    fn last_frame(&self) -> &[u8] {
        &self.frame
    }
}

fn small_scene() -> Scene {
    let placement = PlacementConfig {
        max_count: 10,
        ..PlacementConfig::default()
    };
    let mut rng = fastrand::Rng::with_seed(1);
    Scene::with_curve(
        ClosedCurve::circle(1.0, 16),
        &placement,
        SceneStyle::default(),
        &mut rng,
    )
}

fn flight() -> Flythrough<Recorder> {
    Flythrough::new(small_scene(), PathParams::default(), Recorder::default())
}

fn rendered(outcome: TickOutcome) -> CameraState {
    match outcome {
        TickOutcome::Rendered(c) => c,
        TickOutcome::Paused => panic!("expected a rendered frame"),
    }
}

#[test]
fn running_ticks_render_every_frame() {
    let mut f = flight();
    let clock = ManualClock::new(0.0);
    for _ in 0..5 {
        assert!(matches!(f.tick_with(&clock), TickOutcome::Rendered(_)));
        clock.advance(16.0);
    }
    assert_eq!(f.frames(), 5);
    assert_eq!(f.renderer().cameras.len(), 5);
}

#[test]
fn paused_ticks_neither_update_nor_render() {
    let mut f = flight();
    let clock = ManualClock::new(0.0);
    let first = rendered(f.tick_with(&clock));

    assert!(f.toggle_pause(clock.now_ms()));
    for _ in 0..10 {
        clock.advance(100.0);
        assert_eq!(f.tick_with(&clock), TickOutcome::Paused);
    }
    assert_eq!(f.frames(), 1);
    assert_eq!(f.renderer().cameras.len(), 1);
    assert_eq!(f.last_camera(), Some(first));
}

#[test]
fn resume_continues_with_no_jump() {
    let mut f = flight();
    let clock = ManualClock::new(0.0);
    clock.set(3_000.0);
    let before = rendered(f.tick_with(&clock));

    f.toggle_pause(clock.now_ms());
    clock.advance(20_000.0);
    assert!(!f.toggle_pause(clock.now_ms()));

    let after = rendered(f.tick_with(&clock));
    assert_relative_eq!(before.camera_param, after.camera_param, epsilon = 1e-12);
    assert!(before.position.distance(after.position) < 1e-5);

    clock.advance(1_000.0);
    let later = rendered(f.tick_with(&clock));
    assert_relative_eq!(
        later.camera_param - after.camera_param,
        1_000.0 * 0.25 / 13_000.0,
        epsilon = 1e-9
    );
}

#[test]
fn paused_flight_matches_an_unpaused_one_shifted_in_time() {
    let mut paused = flight();
    let mut straight = flight();
    let clock = ManualClock::new(0.0);

    clock.set(1_000.0);
    paused.tick_with(&clock);
    paused.toggle_pause(clock.now_ms());
    clock.set(5_000.0);
    paused.toggle_pause(clock.now_ms());
    clock.set(9_000.0);
    let a = rendered(paused.tick_with(&clock));
    let b = rendered(straight.tick(5_000.0));
    assert_relative_eq!(a.camera_param, b.camera_param, epsilon = 1e-12);
    assert_relative_eq!(a.look_at_param, b.look_at_param, epsilon = 1e-12);
}

#[test]
fn redraw_repeats_the_last_pose_without_advancing() {
    let mut f = flight();
    assert!(!f.redraw(), "nothing to redraw before the first frame");
    let cam = rendered(f.tick(2_000.0));
    f.toggle_pause(2_000.0);
    assert!(f.redraw());
    assert_eq!(f.renderer().cameras.last(), Some(&cam));
    assert_eq!(f.frames(), 1);
    assert!(f.is_paused());
}

#[test]
fn flight_drives_the_real_engine() {
    let mut engine = WormholeEngine::new(BloomSettings::default(), Quality::Fast);
    engine.resize(32, 16);
    let mut f = Flythrough::new(small_scene(), PathParams::default(), engine);
    let clock = ManualClock::new(0.0);
    rendered(f.tick_with(&clock));
    let frame = f.renderer().last_frame().to_vec();
    assert_eq!(frame.len(), 32 * 16 * 4);

    f.toggle_pause(clock.now_ms());
    clock.advance(500.0);
    f.tick_with(&clock);
    assert_eq!(f.renderer().last_frame(), frame.as_slice(), "paused frame must not change");
    assert_eq!(f.scene().placement.requested, 10);
    assert_eq!(f.pause_controller().total_paused_ms(), 0.0);
}
