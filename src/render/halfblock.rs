use crate::render::{begin_frame, check_frame, draw_overlay_popup, end_frame, write_hud, Frame, Renderer};
use std::io::Write;

const HALF_BLOCK: char = '\u{2580}';

/// One cell per two vertically stacked pixels: the upper half block takes the top pixel as
/// foreground and the bottom pixel as background.
#[derive(Default)]
pub struct HalfBlockRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[inline]
fn rgb_at(px: &[u8], i: usize) -> (u8, u8, u8) {
    (px[i], px[i + 1], px[i + 2])
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (1, 2)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if !check_frame(frame, self.cell_pixels(), out)? {
            return Ok(());
        }
        let cols = frame.term_cols as usize;
        let w = frame.pixel_width;

        begin_frame(out, frame.sync_updates)?;
        self.last_fg = None;
        self.last_bg = None;

        for row in 0..frame.visual_rows as usize {
            let top_y = row * 2;
            for x in 0..cols {
                let top = rgb_at(frame.pixels_rgba, (top_y * w + x) * 4);
                let bot = rgb_at(frame.pixels_rgba, ((top_y + 1) * w + x) * 4);

                if self.last_fg != Some(top) {
                    write!(out, "\x1b[38;2;{};{};{}m", top.0, top.1, top.2)?;
                    self.last_fg = Some(top);
                }
                if self.last_bg != Some(bot) {
                    write!(out, "\x1b[48;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    self.last_bg = Some(bot);
                }
                write!(out, "{HALF_BLOCK}")?;
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
