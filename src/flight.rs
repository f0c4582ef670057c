use crate::clock::Clock;
use crate::scene::path::{CameraState, PathParams};
use crate::scene::pause::PauseController;
use crate::scene::Scene;
use crate::visual::SceneRenderer;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Nothing moved and nothing was drawn.
    Paused,
    Rendered(CameraState),
}

/// Drives the camera around the scene, one frame per tick.
pub struct Flythrough<R: SceneRenderer> {
    scene: Scene,
    path: PathParams,
    pause: PauseController,
    renderer: R,
    last_camera: Option<CameraState>,
    frames: u64,
}

impl<R: SceneRenderer> Flythrough<R> {
    pub fn new(scene: Scene, path: PathParams, renderer: R) -> Self {
        Self {
            scene,
            path,
            pause: PauseController::new(),
            renderer,
            last_camera: None,
            frames: 0,
        }
    }

    pub fn tick(&mut self, now_ms: f64) -> TickOutcome {
        let Some(t) = self.pause.effective_elapsed(now_ms) else {
            return TickOutcome::Paused;
        };
        let camera = self.path.camera_state(&self.scene.curve, t);
        self.renderer.render(&self.scene, &camera);
        self.last_camera = Some(camera);
        self.frames += 1;
        TickOutcome::Rendered(camera)
    }

    /// Re-render the last camera pose without advancing flight time, e.g. after a resize
    /// while paused. Returns `false` if nothing has been rendered yet.
    pub fn redraw(&mut self) -> bool {
        let Some(camera) = self.last_camera else {
            return false;
        };
        self.renderer.render(&self.scene, &camera);
        true
    }

    pub fn tick_with(&mut self, clock: &impl Clock) -> TickOutcome {
        self.tick(clock.now_ms())
    }

    /// Returns whether the flight is paused afterwards.
    pub fn toggle_pause(&mut self, now_ms: f64) -> bool {
        let paused = self.pause.toggle(now_ms);
        info!(
            paused,
            at_ms = now_ms,
            total_paused_ms = self.pause.total_paused_ms(),
            "pause toggled"
        );
        paused
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn pause_controller(&self) -> &PauseController {
        &self.pause
    }

    pub fn path(&self) -> &PathParams {
        &self.path
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn last_camera(&self) -> Option<CameraState> {
        self.last_camera
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
