use glam::Vec3;

/// Cumulative-length table resolution used for arc-length parametrization.
pub const ARC_LENGTH_DIVISIONS: usize = 200;

/// Control points of the default tunnel: a twisting closed loop roughly 23 units across.
const WORMHOLE_POINTS: [[f32; 3]; 16] = [
    [11.600, 0.900, 0.000],
    [9.310, 1.635, 1.042],
    [4.525, 2.164, 4.525],
    [1.042, 2.811, 9.310],
    [0.000, 0.000, 11.600],
    [-1.042, -2.811, 9.310],
    [-4.525, -2.164, 4.525],
    [-9.310, -1.635, 1.042],
    [-11.600, -0.900, 0.000],
    [-9.310, 2.324, -1.042],
    [-4.525, 3.436, -4.525],
    [-1.042, 1.148, -9.310],
    [0.000, 0.000, -11.600],
    [1.042, -1.148, -9.310],
    [4.525, -3.436, -4.525],
    [9.310, -2.324, -1.042],
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveType {
    /// Knot spacing proportional to the square root of chord length; avoids cusps and loops.
    Centripetal,
    Uniform { tension: f32 },
}

impl Default for CurveType {
    fn default() -> Self {
        Self::Centripetal
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurvePreset {
    Wormhole,
    Circle { radius: f32 },
}

impl CurvePreset {
    pub fn build(self) -> ClosedCurve {
        match self {
            Self::Wormhole => ClosedCurve::new(
                WORMHOLE_POINTS.iter().map(|&p| Vec3::from_array(p)).collect(),
                CurveType::Centripetal,
            ),
            Self::Circle { radius } => ClosedCurve::circle(radius, 16),
        }
    }
}

/// Wrap a curve parameter into `[0, 1)`.
pub fn wrap01(u: f32) -> f32 {
    let w = u.rem_euclid(1.0);
    // rem_euclid of a tiny negative rounds up to exactly 1.0
    if w >= 1.0 { 0.0 } else { w }
}

/// Cubic `c0 + c1 w + c2 w^2 + c3 w^3` for one span between two control points.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Span {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl Span {
    pub(crate) fn hermite(x0: Vec3, x1: Vec3, t0: Vec3, t1: Vec3) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    fn centripetal(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let t1 = (p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1;
        let t2 = (p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2;
        Self::hermite(p1, p2, t1 * dt1, t2 * dt1)
    }

    pub(crate) fn uniform(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, tension: f32) -> Self {
        Self::hermite(p1, p2, tension * (p2 - p0), tension * (p3 - p1))
    }

    pub(crate) fn eval(&self, w: f32) -> Vec3 {
        self.c0 + w * (self.c1 + w * (self.c2 + w * self.c3))
    }

    pub(crate) fn derivative(&self, w: f32) -> Vec3 {
        self.c1 + w * (2.0 * self.c2 + 3.0 * w * self.c3)
    }
}

/// Closed Catmull-Rom spline through a loop of control points.
///
/// `point`/`derivative` take the raw spline parameter, where each control point owns an equal
/// share of `[0, 1)`. `position_at`/`tangent_at` take an arc-length parameter so equal steps
/// of `u` cover equal distances, which keeps camera speed steady along uneven spans.
#[derive(Debug, Clone)]
pub struct ClosedCurve {
    points: Vec<Vec3>,
    kind: CurveType,
    lengths: Vec<f32>,
}

impl ClosedCurve {
    pub fn new(points: Vec<Vec3>, kind: CurveType) -> Self {
        assert!(
            points.len() >= 2,
            "closed curve needs at least two control points (got {})",
            points.len()
        );
        assert!(
            points.iter().all(|p| p.is_finite()),
            "closed curve control points must be finite"
        );
        let mut curve = Self {
            points,
            kind,
            lengths: Vec::new(),
        };
        curve.lengths = curve.cumulative_lengths(ARC_LENGTH_DIVISIONS);
        curve
    }

    /// Circle of `radius` in the XY plane centered at the origin.
    pub fn circle(radius: f32, samples: usize) -> Self {
        let n = samples.max(4);
        let points = (0..n)
            .map(|i| {
                let a = i as f32 / n as f32 * std::f32::consts::TAU;
                Vec3::new(a.cos() * radius, a.sin() * radius, 0.0)
            })
            .collect();
        Self::new(points, CurveType::Centripetal)
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn kind(&self) -> CurveType {
        self.kind
    }

    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    fn span(&self, t: f32) -> (Span, f32) {
        let l = self.points.len();
        let p = l as f32 * wrap01(t);
        let mut i = p.floor() as usize;
        let mut w = p - i as f32;
        if i >= l {
            i = 0;
            w = 0.0;
        }

        let p0 = self.points[(i + l - 1) % l];
        let p1 = self.points[i];
        let p2 = self.points[(i + 1) % l];
        let p3 = self.points[(i + 2) % l];

        let span = match self.kind {
            CurveType::Centripetal => Span::centripetal(p0, p1, p2, p3),
            CurveType::Uniform { tension } => Span::uniform(p0, p1, p2, p3, tension),
        };
        (span, w)
    }

    pub fn point(&self, t: f32) -> Vec3 {
        let (span, w) = self.span(t);
        span.eval(w)
    }

    pub fn derivative(&self, t: f32) -> Vec3 {
        let (span, w) = self.span(t);
        span.derivative(w)
    }

    fn cumulative_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(divisions + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0f32;
        out.push(0.0);
        for i in 1..=divisions {
            let p = self.point(i as f32 / divisions as f32);
            sum += p.distance(last);
            out.push(sum);
            last = p;
        }
        out
    }

    /// Map an arc-length parameter to the raw spline parameter.
    pub fn u_to_t(&self, u: f32) -> f32 {
        let u = wrap01(u);
        let total = self.length();
        if total <= 0.0 {
            return u;
        }

        let target = u * total;
        let divisions = self.lengths.len() - 1;
        let hi = self.lengths.partition_point(|&len| len <= target);
        let i = hi.saturating_sub(1).min(divisions - 1);

        let before = self.lengths[i];
        let seg = self.lengths[i + 1] - before;
        let frac = if seg > 0.0 { (target - before) / seg } else { 0.0 };
        (i as f32 + frac) / divisions as f32
    }

    pub fn position_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at arc-length parameter `u`.
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        let t = self.u_to_t(u);
        let d = self.derivative(t);
        if d.length_squared() > 1e-12 {
            return d.normalize();
        }
        let (span, _) = self.span(t);
        let chord = span.eval(1.0) - span.eval(0.0);
        if chord.length_squared() > 1e-12 {
            chord.normalize()
        } else {
            Vec3::Z
        }
    }
}
