pub mod bloom;
pub mod raster;

use crate::config::Quality;
use crate::scene::color::{modulate, scale, Rgb};
use crate::scene::path::CameraState;
use crate::scene::placement::WormDescriptor;
use crate::scene::Scene;
use glam::Vec3;
use bloom::{encode_rgba, BloomPass, BloomSettings};
use raster::{draw_glow, draw_line, draw_line_colored, HdrBuffer, Lens, Projector};

/// Samples along each worm body.
const BODY_SEGMENTS: usize = 12;
/// Strands across the body, as skin `v` coordinates.
const BODY_STRANDS: [f32; 3] = [0.2, 0.5, 0.8];
const BODY_WIDTH: f32 = 0.05;
const GLOW_RADIUS: f32 = 0.035;
const ANTENNA_LENGTH: f32 = 0.04;
const EXPOSURE: f32 = 1.0;

/// Turns a scene plus camera into an RGBA8 frame.
pub trait SceneRenderer {
    fn name(&self) -> &'static str;
    fn resize(&mut self, w: usize, h: usize);
    fn render(&mut self, scene: &Scene, camera: &CameraState) -> &[u8];
    /// The most recently rendered frame, untouched while paused.
    fn last_frame(&self) -> &[u8];
}

/// Software rasterizer: wireframe tube, textured worm strands, bloom, ACES tone map.
pub struct WormholeEngine {
    lens: Lens,
    bloom: BloomPass,
    quality: Quality,
    hdr: HdrBuffer,
    out: Vec<u8>,
    w: usize,
    h: usize,
}

impl WormholeEngine {
    pub fn new(bloom: BloomSettings, quality: Quality) -> Self {
        Self {
            lens: Lens::default(),
            bloom: BloomPass::new(bloom),
            quality,
            hdr: HdrBuffer::default(),
            out: Vec::new(),
            w: 0,
            h: 0,
        }
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.quality = quality;
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn size(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    fn draw_scene(&mut self, scene: &Scene, camera: &CameraState) {
        let proj = Projector::new(camera, self.lens, self.w, self.h);
        let style = &scene.style;

        for [a, b] in &scene.tube.edges {
            draw_line(&mut self.hdr, &proj, style, *a, *b, style.tube_color);
        }

        for worm in &scene.worms {
            // Fully fogged.
            let to_worm = worm.position - camera.position;
            if to_worm.length() > style.fog_cutoff() + 1.0 {
                continue;
            }
            draw_worm(&mut self.hdr, &proj, scene, worm);
        }
    }
}

fn draw_worm(hdr: &mut HdrBuffer, proj: &Projector, scene: &Scene, worm: &WormDescriptor) {
    let style = &scene.style;
    let across = worm.frame.side * BODY_WIDTH;

    for &v in &BODY_STRANDS {
        let offset = across * (v - 0.5);
        let mut prev: Option<(Vec3, Rgb)> = None;
        for k in 0..=BODY_SEGMENTS {
            let s = k as f32 / BODY_SEGMENTS as f32;
            let p = worm.body_point(s) + offset;
            let c = modulate(worm.color, scene.skin.sample(s * style.skin_repeat, v));
            if let Some((pp, pc)) = prev {
                draw_line_colored(hdr, proj, style, pp, p, pc, c);
            }
            prev = Some((p, c));
        }
    }

    let bright = scale(worm.color, 1.6);
    for end in [worm.head(), worm.tail()] {
        draw_glow(hdr, proj, style, end.position, GLOW_RADIUS, bright);
        draw_line(
            hdr,
            proj,
            style,
            end.position,
            end.position + end.direction * ANTENNA_LENGTH,
            bright,
        );
    }
}

impl SceneRenderer for WormholeEngine {
    fn name(&self) -> &'static str {
        "wormhole"
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.w == w && self.h == h {
            return;
        }
        self.w = w;
        self.h = h;
        self.hdr.resize(w, h);
        self.out.clear();
        self.out.resize(w.saturating_mul(h).saturating_mul(4), 0);
    }

    fn render(&mut self, scene: &Scene, camera: &CameraState) -> &[u8] {
        if self.w == 0 || self.h == 0 {
            return &self.out;
        }
        self.hdr.fill(scene.style.fog_color);
        self.draw_scene(scene, camera);
        self.bloom.apply(&mut self.hdr, self.quality.bloom_levels());
        encode_rgba(&self.hdr, EXPOSURE, &mut self.out);
        &self.out
    }

    fn last_frame(&self) -> &[u8] {
        &self.out
    }
}
