use crate::scene::color::Rgb;
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Small RGB texel grid sampled with nearest filtering.
#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Vec<Rgb>,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
}

impl Texture {
    pub fn new(width: usize, height: usize, texels: Vec<Rgb>, wrap_u: WrapMode, wrap_v: WrapMode) -> Self {
        assert!(width > 0 && height > 0, "texture must not be empty");
        assert_eq!(texels.len(), width * height, "texel count must match dimensions");
        Self {
            width,
            height,
            texels,
            wrap_u,
            wrap_v,
        }
    }

    /// Worm skin: segment bands along `u`, darker toward the flanks along `v`.
    /// Repeats along the body and clamps across it.
    pub fn banded() -> Self {
        let (w, h) = (32usize, 8usize);
        let mut texels = Vec::with_capacity(w * h);
        for y in 0..h {
            let v = (y as f32 + 0.5) / h as f32;
            let flank = 1.0 - (v - 0.5).abs() * 1.2;
            for x in 0..w {
                let u = (x as f32 + 0.5) / w as f32;
                let band = 0.55 + 0.45 * (u * TAU * 4.0).cos().max(0.0);
                let k = (band * flank).clamp(0.0, 1.0);
                texels.push([k, k * 0.92, k * 0.85]);
            }
        }
        Self::new(w, h, texels, WrapMode::Repeat, WrapMode::ClampToEdge)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn sample(&self, u: f32, v: f32) -> Rgb {
        let x = texel_index(u, self.width, self.wrap_u);
        let y = texel_index(v, self.height, self.wrap_v);
        self.texels[y * self.width + x]
    }
}

fn texel_index(c: f32, size: usize, mode: WrapMode) -> usize {
    let c = match mode {
        WrapMode::Repeat => c.rem_euclid(1.0),
        WrapMode::ClampToEdge => c.clamp(0.0, 1.0),
    };
    if !c.is_finite() {
        return 0;
    }
    ((c * size as f32) as usize).min(size - 1)
}
