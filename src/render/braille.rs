use crate::render::{begin_frame, check_frame, draw_overlay_popup, end_frame, write_hud, Frame, Renderer};
use std::io::Write;

/// Braille dot bit for each pixel of a 2x4 cell, row-major.
const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

/// 2x4 pixels per cell. Pixels brighter than the cell's mid luma become dots in the averaged
/// foreground color; the rest average into the background.
#[derive(Default)]
pub struct BrailleRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl BrailleRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Default)]
struct ColorSum {
    r: u32,
    g: u32,
    b: u32,
    n: u32,
}

impl ColorSum {
    fn add(&mut self, (r, g, b): (u8, u8, u8)) {
        self.r += r as u32;
        self.g += g as u32;
        self.b += b as u32;
        self.n += 1;
    }

    fn mean(&self) -> Option<(u8, u8, u8)> {
        (self.n > 0).then(|| {
            (
                (self.r / self.n) as u8,
                (self.g / self.n) as u8,
                (self.b / self.n) as u8,
            )
        })
    }
}

/// Glyph plus fg/bg for one cell.
fn shade_cell(rgb: &[(u8, u8, u8); 8]) -> ((u8, u8, u8), (u8, u8, u8), char) {
    let lum = rgb.map(|(r, g, b)| luma_u16(r, g, b));
    let min_l = lum.iter().copied().min().unwrap_or(0);
    let max_l = lum.iter().copied().max().unwrap_or(0);
    let thr = (min_l + max_l) / 2;

    let mut bits = 0u8;
    let mut on = ColorSum::default();
    let mut off = ColorSum::default();
    for i in 0..8 {
        if lum[i] > thr {
            bits |= DOT_BITS[i];
            on.add(rgb[i]);
        } else {
            off.add(rgb[i]);
        }
    }

    if bits == 0 {
        let c = off.mean().unwrap_or((0, 0, 0));
        return (c, c, ' ');
    }
    let fg = on.mean().unwrap_or((0, 0, 0));
    let bg = off.mean().unwrap_or(fg);
    let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
    (fg, bg, ch)
}

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (2, 4)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if !check_frame(frame, self.cell_pixels(), out)? {
            return Ok(());
        }
        let cols = frame.term_cols as usize;
        let w = frame.pixel_width;
        let px = frame.pixels_rgba;

        begin_frame(out, frame.sync_updates)?;
        self.last_fg = None;
        self.last_bg = None;

        for row in 0..frame.visual_rows as usize {
            let base_y = row * 4;
            for col in 0..cols {
                let base_x = col * 2;
                let mut rgb = [(0u8, 0u8, 0u8); 8];
                for (i, c) in rgb.iter_mut().enumerate() {
                    let idx = ((base_y + i / 2) * w + base_x + i % 2) * 4;
                    *c = (px[idx], px[idx + 1], px[idx + 2]);
                }

                let (fg, bg, ch) = shade_cell(&rgb);
                if self.last_fg != Some(fg) {
                    write!(out, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
                    self.last_fg = Some(fg);
                }
                if self.last_bg != Some(bg) {
                    write!(out, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
                    self.last_bg = Some(bg);
                }
                write!(out, "{ch}")?;
            }
            out.write_all(b"\r\n")?;
        }

        write_hud(out, frame)?;
        if let Some(text) = frame.overlay {
            draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
        }
        end_frame(out, frame.sync_updates)
    }
}

#[inline]
fn luma_u16(r: u8, g: u8, b: u8) -> u16 {
    // Rec.709 weights in 8.8 fixed point.
    ((r as u32 * 54 + g as u32 * 183 + b as u32 * 19) >> 8) as u16
}
