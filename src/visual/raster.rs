use crate::scene::SceneStyle;
use crate::scene::color::Rgb;
use crate::scene::path::CameraState;
use glam::{Mat4, Vec3};

/// Perspective camera intrinsics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Linear HDR color buffer.
#[derive(Debug, Clone, Default)]
pub struct HdrBuffer {
    pub w: usize,
    pub h: usize,
    pub px: Vec<Rgb>,
}

impl HdrBuffer {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![[0.0; 3]; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, [0.0; 3]);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.px.fill([0.0; 3]);
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    /// Add `c` onto the pixel; overlapping strokes accumulate.
    #[inline]
    pub fn add(&mut self, x: usize, y: usize, c: Rgb) {
        let p = &mut self.px[y * self.w + x];
        p[0] += c[0];
        p[1] += c[1];
        p[2] += c[2];
    }
}

/// World-to-screen mapping for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    view: Mat4,
    proj: Mat4,
    w: f32,
    h: f32,
    near: f32,
    /// Screen pixels per world unit at depth 1.
    focal_px: f32,
}

/// A point in view space (`depth` > 0 in front of the camera) and its screen position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl Projector {
    pub fn new(camera: &CameraState, lens: Lens, w: usize, h: usize) -> Self {
        let mut target = camera.look_at;
        if target.distance_squared(camera.position) < 1e-12 {
            target = camera.position + Vec3::Z;
        }
        let forward = (target - camera.position).normalize();
        let mut up = Vec3::Y;
        if forward.dot(up).abs() > 0.999 {
            up = Vec3::X;
        }

        let aspect = w.max(1) as f32 / h.max(1) as f32;
        let fov = lens.fov_y_deg.to_radians();
        Self {
            view: Mat4::look_at_rh(camera.position, target, up),
            proj: Mat4::perspective_rh(fov, aspect, lens.near, lens.far),
            w: w as f32,
            h: h as f32,
            near: lens.near,
            focal_px: h as f32 * 0.5 / (fov * 0.5).tan(),
        }
    }

    /// View-space position; the camera looks down `-Z`.
    pub fn to_view(&self, p: Vec3) -> Vec3 {
        self.view.transform_point3(p)
    }

    fn view_to_screen(&self, v: Vec3) -> Projected {
        let clip = self.proj * v.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        Projected {
            x: (ndc.x * 0.5 + 0.5) * self.w,
            y: (0.5 - ndc.y * 0.5) * self.h,
            depth: -v.z,
        }
    }

    pub fn project(&self, p: Vec3) -> Option<Projected> {
        let v = self.to_view(p);
        if -v.z < self.near {
            return None;
        }
        Some(self.view_to_screen(v))
    }

    /// Project a segment, trimming it against the near plane.
    pub fn project_segment(&self, a: Vec3, b: Vec3) -> Option<(Projected, Projected)> {
        let mut va = self.to_view(a);
        let mut vb = self.to_view(b);
        let (da, db) = (-va.z, -vb.z);
        if da < self.near && db < self.near {
            return None;
        }
        if da < self.near {
            va = va + (vb - va) * ((self.near - da) / (db - da));
        } else if db < self.near {
            vb = vb + (va - vb) * ((self.near - db) / (da - db));
        }
        Some((self.view_to_screen(va), self.view_to_screen(vb)))
    }

    pub fn pixels_per_unit(&self, depth: f32) -> f32 {
        self.focal_px / depth.max(self.near)
    }
}

/// Clip a screen-space segment to `[0, w) x [0, h)`; returns the parametric sub-range.
fn clip_to_screen(a: &Projected, b: &Projected, w: f32, h: f32) -> Option<(f32, f32)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    let max_x = w - 0.001;
    let max_y = h - 0.001;
    for (p, q) in [
        (-dx, a.x),
        (dx, max_x - a.x),
        (-dy, a.y),
        (dy, max_y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// Draw a fogged line. Depth is interpolated in `1/z` so fog stays perspective-correct.
pub fn draw_line(buf: &mut HdrBuffer, proj: &Projector, style: &SceneStyle, a: Vec3, b: Vec3, color: Rgb) {
    draw_line_colored(buf, proj, style, a, b, color, color);
}

pub fn draw_line_colored(
    buf: &mut HdrBuffer,
    proj: &Projector,
    style: &SceneStyle,
    a: Vec3,
    b: Vec3,
    color_a: Rgb,
    color_b: Rgb,
) {
    if buf.w == 0 || buf.h == 0 {
        return;
    }
    let Some((pa, pb)) = proj.project_segment(a, b) else {
        return;
    };
    if pa.depth.min(pb.depth) > style.fog_cutoff() {
        return;
    }
    if !(pa.x.is_finite() && pa.y.is_finite() && pb.x.is_finite() && pb.y.is_finite()) {
        return;
    }
    let Some((t0, t1)) = clip_to_screen(&pa, &pb, buf.w as f32, buf.h as f32) else {
        return;
    };

    let (dx, dy) = (pb.x - pa.x, pb.y - pa.y);
    let (inv_a, inv_b) = (1.0 / pa.depth, 1.0 / pb.depth);
    let span = (dx.abs().max(dy.abs()) * (t1 - t0)).ceil().max(1.0) as usize;

    let mut last = None;
    for k in 0..=span {
        let t = t0 + (t1 - t0) * (k as f32 / span as f32);
        let x = (pa.x + dx * t) as usize;
        let y = (pa.y + dy * t) as usize;
        if x >= buf.w || y >= buf.h || last == Some((x, y)) {
            continue;
        }
        last = Some((x, y));
        let depth = 1.0 / (inv_a + (inv_b - inv_a) * t);
        let vis = style.fog_visibility(depth);
        buf.add(x, y, fogged(lerp_rgb(color_a, color_b, t), vis));
    }
}

/// Soft disc of world-space `radius` centered on `p`.
pub fn draw_glow(buf: &mut HdrBuffer, proj: &Projector, style: &SceneStyle, p: Vec3, radius: f32, color: Rgb) {
    let Some(c) = proj.project(p) else {
        return;
    };
    if c.depth > style.fog_cutoff() || !(c.x.is_finite() && c.y.is_finite()) {
        return;
    }
    let r = (radius * proj.pixels_per_unit(c.depth)).clamp(0.5, 24.0);
    let vis = style.fog_visibility(c.depth);

    let x0 = (c.x - r).floor().max(0.0) as usize;
    let y0 = (c.y - r).floor().max(0.0) as usize;
    let x1 = ((c.x + r).ceil() as isize).min(buf.w as isize - 1);
    let y1 = ((c.y + r).ceil() as isize).min(buf.h as isize - 1);
    if x1 < 0 || y1 < 0 {
        return;
    }
    for y in y0..=(y1 as usize) {
        for x in x0..=(x1 as usize) {
            let ddx = x as f32 + 0.5 - c.x;
            let ddy = y as f32 + 0.5 - c.y;
            let d = (ddx * ddx + ddy * ddy).sqrt() / r;
            if d > 1.0 {
                continue;
            }
            let falloff = 1.0 - d * d;
            let lit = [color[0] * falloff, color[1] * falloff, color[2] * falloff];
            buf.add(x, y, fogged(lit, vis));
        }
    }
}

/// Contribution left after exp² fog; the fog color itself is the cleared background.
fn fogged(c: Rgb, vis: f32) -> Rgb {
    [c[0] * vis, c[1] * vis, c[2] * vis]
}

fn lerp_rgb(a: Rgb, b: Rgb, t: f32) -> Rgb {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}
