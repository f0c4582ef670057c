#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PauseState {
    Running,
    Paused { since_ms: f64 },
}

/// Freezes flight time while paused so the camera resumes where it stopped.
#[derive(Debug, Clone)]
pub struct PauseController {
    state: PauseState,
    total_paused_ms: f64,
}

impl Default for PauseController {
    fn default() -> Self {
        Self::new()
    }
}

impl PauseController {
    pub fn new() -> Self {
        Self {
            state: PauseState::Running,
            total_paused_ms: 0.0,
        }
    }

    pub fn state(&self) -> PauseState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, PauseState::Paused { .. })
    }

    /// Sum of all completed pause intervals.
    pub fn total_paused_ms(&self) -> f64 {
        self.total_paused_ms
    }

    /// Returns `true` when this call changed the state.
    pub fn pause(&mut self, now_ms: f64) -> bool {
        if self.is_paused() {
            return false;
        }
        self.state = PauseState::Paused { since_ms: now_ms };
        true
    }

    pub fn resume(&mut self, now_ms: f64) -> bool {
        let PauseState::Paused { since_ms } = self.state else {
            return false;
        };
        self.total_paused_ms += (now_ms - since_ms).max(0.0);
        self.state = PauseState::Running;
        true
    }

    /// Flip the state; returns whether it is paused afterwards.
    pub fn toggle(&mut self, now_ms: f64) -> bool {
        if self.is_paused() {
            self.resume(now_ms);
        } else {
            self.pause(now_ms);
        }
        self.is_paused()
    }

    /// Flight time at real time `now_ms`, or `None` while paused.
    pub fn effective_elapsed(&self, now_ms: f64) -> Option<f64> {
        match self.state {
            PauseState::Running => Some(now_ms - self.total_paused_ms),
            PauseState::Paused { .. } => None,
        }
    }
}
