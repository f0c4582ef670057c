use crate::scene::curve::ClosedCurve;
use glam::Vec3;

/// Timing of the camera's trip around the closed curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathParams {
    /// Curve parameter at `t = 0`.
    pub start_offset: f64,
    pub loop_time_ms: f64,
    /// How far ahead of the camera, in curve parameter, the look-at point sits.
    pub look_ahead: f64,
    pub speed_factor: f64,
}

impl Default for PathParams {
    fn default() -> Self {
        Self::new(0.05, 13_000.0, 0.02, 0.25)
    }
}

impl PathParams {
    pub fn new(start_offset: f64, loop_time_ms: f64, look_ahead: f64, speed_factor: f64) -> Self {
        assert!(
            loop_time_ms.is_finite() && loop_time_ms > 0.0,
            "loop_time_ms must be positive (got {loop_time_ms})"
        );
        assert!(
            speed_factor.is_finite() && speed_factor > 0.0,
            "speed_factor must be positive (got {speed_factor})"
        );
        assert!(start_offset.is_finite() && look_ahead.is_finite());
        Self {
            start_offset,
            loop_time_ms,
            look_ahead,
            speed_factor,
        }
    }

    /// Real time for one full loop.
    pub fn period_ms(&self) -> f64 {
        self.loop_time_ms / self.speed_factor
    }

    /// `(camera_param, look_at_param)` at elapsed time `t_ms`, both in `[0, 1)`.
    pub fn progress(&self, t_ms: f64) -> (f64, f64) {
        let progress =
            (t_ms * self.speed_factor).rem_euclid(self.loop_time_ms) / self.loop_time_ms + self.start_offset;
        (wrap01_f64(progress), wrap01_f64(progress + self.look_ahead))
    }

    pub fn camera_state(&self, curve: &ClosedCurve, t_ms: f64) -> CameraState {
        let (camera_param, look_at_param) = self.progress(t_ms);
        CameraState {
            position: curve.position_at(camera_param as f32),
            look_at: curve.position_at(look_at_param as f32),
            camera_param,
            look_at_param,
        }
    }
}

fn wrap01_f64(x: f64) -> f64 {
    let w = x.rem_euclid(1.0);
    if w >= 1.0 { 0.0 } else { w }
}

/// Camera pose for one frame; recomputed from time every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub look_at: Vec3,
    pub camera_param: f64,
    pub look_at_param: f64,
}

impl CameraState {
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or_zero()
    }
}
