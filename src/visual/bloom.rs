use crate::scene::color::{linear_to_srgb, luma, Rgb};
use crate::visual::raster::HdrBuffer;
use glam::{Mat3, Vec3};

pub const MAX_LEVELS: usize = 5;
const KERNEL_RADII: [usize; MAX_LEVELS] = [3, 5, 7, 9, 11];
const LEVEL_FACTORS: [f32; MAX_LEVELS] = [1.0, 0.8, 0.6, 0.4, 0.2];
/// Width of the soft knee above the luminance threshold.
const SMOOTH_WIDTH: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub strength: f32,
    /// 0 favors the sharp levels, 1 the wide ones.
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 4.0,
            radius: 1.0,
            threshold: 0.02,
        }
    }
}

/// Multi-level glow: bright-pass, a chain of downsampled gaussian blurs, then a weighted
/// composite added back onto the rasterized frame.
#[derive(Debug, Clone)]
pub struct BloomPass {
    pub settings: BloomSettings,
    bright: HdrBuffer,
    levels: Vec<HdrBuffer>,
    scratch: HdrBuffer,
}

impl BloomPass {
    pub fn new(settings: BloomSettings) -> Self {
        Self {
            settings,
            bright: HdrBuffer::default(),
            levels: Vec::new(),
            scratch: HdrBuffer::default(),
        }
    }

    pub fn apply(&mut self, hdr: &mut HdrBuffer, level_count: usize) {
        if hdr.w == 0 || hdr.h == 0 || self.settings.strength <= 0.0 {
            return;
        }
        let level_count = level_count.clamp(1, MAX_LEVELS);

        self.bright_pass(hdr);

        self.levels.resize_with(level_count, HdrBuffer::default);
        let (mut lw, mut lh) = (hdr.w, hdr.h);
        for i in 0..level_count {
            lw = (lw / 2).max(1);
            lh = (lh / 2).max(1);
            let src = if i == 0 { &self.bright } else { &self.levels[i - 1] };
            let down = downsample(src, lw, lh);
            self.levels[i] = down;
            blur_separable(&mut self.levels[i], &mut self.scratch, KERNEL_RADII[i]);
        }

        let radius = self.settings.radius;
        let weights: Vec<f32> = LEVEL_FACTORS[..level_count]
            .iter()
            .map(|&f| self.settings.strength * lerp(f, 1.2 - f, radius))
            .collect();

        for y in 0..hdr.h {
            let v = (y as f32 + 0.5) / hdr.h as f32;
            for x in 0..hdr.w {
                let u = (x as f32 + 0.5) / hdr.w as f32;
                let mut glow = [0.0f32; 3];
                for (level, &wgt) in self.levels.iter().zip(&weights) {
                    let s = sample_bilinear(level, u, v);
                    glow[0] += s[0] * wgt;
                    glow[1] += s[1] * wgt;
                    glow[2] += s[2] * wgt;
                }
                let p = &mut hdr.px[y * hdr.w + x];
                p[0] += glow[0];
                p[1] += glow[1];
                p[2] += glow[2];
            }
        }
    }

    fn bright_pass(&mut self, hdr: &HdrBuffer) {
        if self.bright.w != hdr.w || self.bright.h != hdr.h {
            self.bright.resize(hdr.w, hdr.h);
        }
        let lo = self.settings.threshold;
        for (dst, src) in self.bright.px.iter_mut().zip(&hdr.px) {
            let a = smoothstep(lo, lo + SMOOTH_WIDTH, luma(*src));
            *dst = [src[0] * a, src[1] * a, src[2] * a];
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let d = (edge1 - edge0).abs().max(1e-6);
    let t = ((x - edge0) / d).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Box-filter `src` down to `w x h`.
fn downsample(src: &HdrBuffer, w: usize, h: usize) -> HdrBuffer {
    let mut out = HdrBuffer::new(w, h);
    for y in 0..h {
        let sy0 = y * src.h / h;
        let sy1 = ((y + 1) * src.h / h).max(sy0 + 1).min(src.h);
        for x in 0..w {
            let sx0 = x * src.w / w;
            let sx1 = ((x + 1) * src.w / w).max(sx0 + 1).min(src.w);
            let mut acc = [0.0f32; 3];
            let mut n = 0.0f32;
            for sy in sy0..sy1 {
                for sx in sx0..sx1 {
                    let c = src.get(sx, sy);
                    acc[0] += c[0];
                    acc[1] += c[1];
                    acc[2] += c[2];
                    n += 1.0;
                }
            }
            out.px[y * w + x] = [acc[0] / n, acc[1] / n, acc[2] / n];
        }
    }
    out
}

fn gaussian_kernel(radius: usize) -> Vec<f32> {
    let sigma = radius as f32;
    let mut k: Vec<f32> = (0..=radius)
        .map(|i| (-0.5 * (i * i) as f32 / (sigma * sigma)).exp())
        .collect();
    let sum = k[0] + 2.0 * k[1..].iter().sum::<f32>();
    for v in &mut k {
        *v /= sum;
    }
    k
}

fn blur_separable(buf: &mut HdrBuffer, scratch: &mut HdrBuffer, radius: usize) {
    let kernel = gaussian_kernel(radius);
    let r = radius as isize;
    let (w, h) = (buf.w, buf.h);
    if scratch.w != w || scratch.h != h {
        scratch.resize(w, h);
    }

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for o in -r..=r {
                let k = kernel[o.unsigned_abs()];
                let sx = (x as isize + o).clamp(0, w as isize - 1) as usize;
                let c = buf.px[y * w + sx];
                acc[0] += c[0] * k;
                acc[1] += c[1] * k;
                acc[2] += c[2] * k;
            }
            scratch.px[y * w + x] = acc;
        }
    }

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for o in -r..=r {
                let k = kernel[o.unsigned_abs()];
                let sy = (y as isize + o).clamp(0, h as isize - 1) as usize;
                let c = scratch.px[sy * w + x];
                acc[0] += c[0] * k;
                acc[1] += c[1] * k;
                acc[2] += c[2] * k;
            }
            buf.px[y * w + x] = acc;
        }
    }
}

fn sample_bilinear(buf: &HdrBuffer, u: f32, v: f32) -> Rgb {
    let fx = (u * buf.w as f32 - 0.5).clamp(0.0, (buf.w - 1) as f32);
    let fy = (v * buf.h as f32 - 0.5).clamp(0.0, (buf.h - 1) as f32);
    let x0 = fx.floor() as usize;
    let y0 = fy.floor() as usize;
    let x1 = (x0 + 1).min(buf.w - 1);
    let y1 = (y0 + 1).min(buf.h - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let mut out = [0.0f32; 3];
    for ch in 0..3 {
        let top = lerp(buf.get(x0, y0)[ch], buf.get(x1, y0)[ch], tx);
        let bot = lerp(buf.get(x0, y1)[ch], buf.get(x1, y1)[ch], tx);
        out[ch] = lerp(top, bot, ty);
    }
    out
}

/// ACES filmic curve fit, including the input/output color-space matrices.
pub fn aces_filmic(c: Rgb, exposure: f32) -> Rgb {
    let input = Mat3::from_cols_array(&[
        0.59719, 0.07600, 0.02840, //
        0.35458, 0.90834, 0.13383, //
        0.04823, 0.01566, 0.83777,
    ]);
    let output = Mat3::from_cols_array(&[
        1.60475, -0.10208, -0.00327, //
        -0.53108, 1.10813, -0.07276, //
        -0.07367, -0.00605, 1.07602,
    ]);

    let v = input * (Vec3::from_array(c) * (exposure / 0.6));
    let fitted = (v * (v + 0.024_578_6) - 0.000_090_537) / (v * (0.983_729 * v + 0.432_951) + 0.238_081);
    (output * fitted).clamp(Vec3::ZERO, Vec3::ONE).to_array()
}

/// Tone map `hdr` into an RGBA8 frame.
pub fn encode_rgba(hdr: &HdrBuffer, exposure: f32, out: &mut Vec<u8>) {
    out.resize(hdr.w * hdr.h * 4, 0);
    for (px, c) in out.chunks_exact_mut(4).zip(&hdr.px) {
        let m = aces_filmic(*c, exposure);
        px[0] = (linear_to_srgb(m[0]) * 255.0 + 0.5) as u8;
        px[1] = (linear_to_srgb(m[1]) * 255.0 + 0.5) as u8;
        px[2] = (linear_to_srgb(m[2]) * 255.0 + 0.5) as u8;
        px[3] = 255;
    }
}
