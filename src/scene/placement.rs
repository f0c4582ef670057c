use crate::scene::color::{hsl_to_rgb, srgb_to_linear, Rgb};
use crate::scene::curve::{wrap01, ClosedCurve};
use crate::scene::worm::WormShape;
use glam::Vec3;
use std::collections::VecDeque;
use std::f32::consts::TAU;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    /// Upper bound, not a guarantee.
    pub max_count: usize,
    /// Distance band from the centerline, `[min, max]`.
    pub radial_offset_range: [f32; 2],
    pub min_pairwise_distance: f32,
    pub history_capacity: usize,
    pub max_attempts_per_worm: usize,
    /// Parameter jitter added to each evenly spaced base slot, drawn from `[0, jitter)`.
    pub jitter: f32,
    pub saturation_range: [f32; 2],
    pub lightness_range: [f32; 2],
    pub worm_length: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_count: 120,
            radial_offset_range: [0.35, 0.45],
            min_pairwise_distance: 0.5,
            history_capacity: 8,
            max_attempts_per_worm: 20,
            jitter: 0.05,
            saturation_range: [0.75, 1.0],
            lightness_range: [0.45, 0.6],
            worm_length: 0.18,
        }
    }
}

/// Orthonormal basis around a curve tangent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub tangent: Vec3,
    pub normal: Vec3,
    pub side: Vec3,
}

impl Frame {
    /// Local `(x, y, z)` maps to `(normal, side, tangent)`.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.normal * local.x + self.side * local.y + self.tangent * local.z
    }
}

/// Build a frame perpendicular to `tangent`. `+Y` serves as the reference up-vector unless the
/// tangent is nearly vertical, in which case `+X` is used instead.
pub fn orthonormal_frame(tangent: Vec3) -> Frame {
    let mut t = tangent.normalize_or_zero();
    if t == Vec3::ZERO {
        t = Vec3::Z;
    }
    let mut up = Vec3::Y;
    if t.dot(up).abs() > 0.9 {
        up = Vec3::X;
    }
    let normal = (up - t * up.dot(t)).normalize();
    let side = t.cross(normal).normalize();
    Frame {
        tangent: t,
        normal,
        side,
    }
}

/// Fixed-capacity FIFO of recent placements. Older entries age out and stop constraining
/// new candidates.
#[derive(Debug, Clone)]
pub struct PlacementHistory {
    capacity: usize,
    recent: VecDeque<Vec3>,
}

impl PlacementHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "placement history needs a non-zero capacity");
        Self {
            capacity,
            recent: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.recent.iter()
    }

    /// Whether `candidate` keeps at least `min_distance` from every remembered placement.
    pub fn admits(&self, candidate: Vec3, min_distance: f32) -> bool {
        self.recent
            .iter()
            .all(|p| p.distance(candidate) >= min_distance)
    }

    pub fn push(&mut self, p: Vec3) {
        if self.recent.len() == self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(p);
    }
}

/// A placed decorative worm. Never mutated after placement.
#[derive(Debug, Clone)]
pub struct WormDescriptor {
    pub index: usize,
    /// Curve parameter the worm was sampled around.
    pub param: f32,
    pub position: Vec3,
    /// Linear RGB.
    pub color: Rgb,
    pub frame: Frame,
    pub shape: WormShape,
}

/// An end of a worm body and the direction it faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WormEnd {
    pub position: Vec3,
    pub direction: Vec3,
}

impl WormDescriptor {
    /// World-space point along the body, `s` in `[0, 1]` from tail to head.
    pub fn body_point(&self, s: f32) -> Vec3 {
        self.position + self.frame.to_world(self.shape.point(s))
    }

    pub fn head(&self) -> WormEnd {
        WormEnd {
            position: self.body_point(1.0),
            direction: self.frame.to_world(self.shape.tangent(1.0)).normalize_or_zero(),
        }
    }

    pub fn tail(&self) -> WormEnd {
        WormEnd {
            position: self.body_point(0.0),
            direction: -self.frame.to_world(self.shape.tangent(0.0)).normalize_or_zero(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementReport {
    pub requested: usize,
    pub placed: usize,
    pub skipped: usize,
    pub total_attempts: usize,
}

#[derive(Debug, Clone)]
pub struct Placement {
    pub worms: Vec<WormDescriptor>,
    pub report: PlacementReport,
}

/// Scatters worms around a closed curve by rejection sampling against a short history window.
pub struct WormPlacer {
    config: PlacementConfig,
}

impl WormPlacer {
    pub fn new(config: PlacementConfig) -> Self {
        let [lo, hi] = config.radial_offset_range;
        assert!(
            lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo <= hi,
            "radial offset range must satisfy 0 <= min <= max (got [{lo}, {hi}])"
        );
        assert!(
            config.min_pairwise_distance >= 0.0,
            "min pairwise distance must be non-negative"
        );
        assert!(config.history_capacity > 0, "history capacity must be non-zero");
        assert!(
            config.max_attempts_per_worm > 0,
            "at least one attempt per worm is required"
        );
        Self { config }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn place(&self, curve: &ClosedCurve, rng: &mut fastrand::Rng) -> Placement {
        let cfg = &self.config;
        let mut history = PlacementHistory::new(cfg.history_capacity);
        let mut worms = Vec::new();
        let mut report = PlacementReport {
            requested: cfg.max_count,
            ..PlacementReport::default()
        };

        for index in 0..cfg.max_count {
            let param = wrap01(index as f32 / cfg.max_count as f32 + rng.f32() * cfg.jitter);
            let center = curve.position_at(param);
            let frame = orthonormal_frame(curve.tangent_at(param));

            let mut accepted = None;
            for _ in 0..cfg.max_attempts_per_worm {
                report.total_attempts += 1;
                let candidate = self.sample_offset(center, &frame, rng);
                if history.admits(candidate, cfg.min_pairwise_distance) {
                    accepted = Some(candidate);
                    break;
                }
            }

            let Some(position) = accepted else {
                report.skipped += 1;
                debug!(index, param, "worm skipped: spacing attempts exhausted");
                continue;
            };

            history.push(position);
            worms.push(WormDescriptor {
                index,
                param,
                position,
                color: self.random_color(rng),
                frame,
                shape: WormShape::random(rng, cfg.worm_length),
            });
        }

        report.placed = worms.len();
        Placement { worms, report }
    }

    fn sample_offset(&self, center: Vec3, frame: &Frame, rng: &mut fastrand::Rng) -> Vec3 {
        let angle = rng.f32() * TAU;
        let radius = lerp_range(self.config.radial_offset_range, rng.f32());
        center + radius * (angle.cos() * frame.normal + angle.sin() * frame.side)
    }

    fn random_color(&self, rng: &mut fastrand::Rng) -> Rgb {
        let h = rng.f32();
        let s = lerp_range(self.config.saturation_range, rng.f32());
        let l = lerp_range(self.config.lightness_range, rng.f32());
        hsl_to_rgb(h, s, l).map(srgb_to_linear)
    }
}

fn lerp_range([lo, hi]: [f32; 2], t: f32) -> f32 {
    lo + (hi - lo) * t
}
