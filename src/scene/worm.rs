use crate::scene::curve::Span;
use glam::Vec3;

const BODY_POINTS: usize = 5;

/// Open spline describing a worm body in its local frame: `z` runs along the tunnel,
/// `x`/`y` carry the wiggle.
#[derive(Debug, Clone, PartialEq)]
pub struct WormShape {
    points: Vec<Vec3>,
}

impl WormShape {
    pub fn new(points: Vec<Vec3>) -> Self {
        assert!(points.len() >= 2, "worm shape needs at least two points");
        Self { points }
    }

    /// A gently wiggling body `length` long, centered on the local origin.
    pub fn random(rng: &mut fastrand::Rng, length: f32) -> Self {
        let wiggle = length * 0.35;
        let points = (0..BODY_POINTS)
            .map(|k| {
                let z = (k as f32 / (BODY_POINTS - 1) as f32 - 0.5) * length;
                Vec3::new(
                    (rng.f32() - 0.5) * wiggle,
                    (rng.f32() - 0.5) * wiggle,
                    z,
                )
            })
            .collect();
        Self { points }
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    fn span(&self, s: f32) -> (Span, f32) {
        let n = self.points.len();
        let p = s.clamp(0.0, 1.0) * (n - 1) as f32;
        let i = (p.floor() as usize).min(n - 2);
        let w = p - i as f32;

        let p0 = self.points[i.saturating_sub(1)];
        let p1 = self.points[i];
        let p2 = self.points[i + 1];
        let p3 = self.points[(i + 2).min(n - 1)];
        (Span::uniform(p0, p1, p2, p3, 0.5), w)
    }

    /// Local point at body coordinate `s` (0 = tail, 1 = head).
    pub fn point(&self, s: f32) -> Vec3 {
        let (span, w) = self.span(s);
        span.eval(w)
    }

    /// Local unit direction of travel at `s`.
    pub fn tangent(&self, s: f32) -> Vec3 {
        let (span, w) = self.span(s);
        let d = span.derivative(w);
        if d.length_squared() > 1e-12 {
            d.normalize()
        } else {
            (self.points[self.points.len() - 1] - self.points[0]).normalize_or_zero()
        }
    }
}
