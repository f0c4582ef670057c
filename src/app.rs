use crate::clock::{Clock, SystemClock};
use crate::config::{Config, FlightSettings, Quality, RendererMode};
use crate::flight::{Flythrough, TickOutcome};
use crate::render::{BrailleRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::scene::path::CameraState;
use crate::scene::Scene;
use crate::terminal::TerminalGuard;
use crate::visual::{SceneRenderer, WormholeEngine};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub fn run(cfg: Config, settings: FlightSettings) -> anyhow::Result<()> {
    let seed = settings.seed.unwrap_or_else(|| fastrand::u64(..));
    info!(seed, explicit = settings.seed.is_some(), "placement seed");
    let mut rng = fastrand::Rng::with_seed(seed);
    let scene = Scene::build(&settings, &mut rng);

    let engine = WormholeEngine::new(settings.bloom, cfg.quality);
    let mut flight = Flythrough::new(scene, settings.path, engine);

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
    };
    let cell = renderer.cell_pixels();

    let mut last_size = TerminalGuard::size()?;
    let mut show_hud = true;
    let mut show_help = false;
    let mut hud_rows = hud_rows_for_size(last_size, show_hud);
    resize_engine(flight.renderer_mut(), last_size, cell, hud_rows);
    // The picture must be fully repainted on the next frame even if the flight is paused.
    let mut needs_full = true;

    let clock = SystemClock::new();
    let mut runtime = RuntimeTuning::new(cfg.quality, cfg.adaptive_quality);
    let mut fps = FpsCounter::new();
    let mut last_engine_ms = 0.0f32;
    let mut last_render_ms = 0.0f32;
    let mut last_total_ms = 0.0f32;

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    let old_hud = show_hud;
                    let old_help = show_help;
                    match handle_key(k.code, k.modifiers, &mut show_hud, &mut show_help) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::TogglePause => {
                            flight.toggle_pause(clock.now_ms());
                        }
                        KeyAction::None => {}
                    }
                    if show_hud != old_hud {
                        hud_rows = hud_rows_for_size(last_size, show_hud);
                        resize_engine(flight.renderer_mut(), last_size, cell, hud_rows);
                        needs_full = true;
                    }
                    if show_help != old_help {
                        needs_full = true;
                    }
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    hud_rows = hud_rows_for_size(last_size, show_hud);
                    resize_engine(flight.renderer_mut(), last_size, cell, hud_rows);
                    needs_full = true;
                }
                _ => {}
            }
        }

        // Resize events can be missed by some terminals.
        let sz = TerminalGuard::size()?;
        if sz != last_size {
            last_size = sz;
            hud_rows = hud_rows_for_size(last_size, show_hud);
            resize_engine(flight.renderer_mut(), last_size, cell, hud_rows);
            needs_full = true;
        }

        let engine_start = Instant::now();
        let outcome = flight.tick_with(&clock);
        let rendered = match outcome {
            TickOutcome::Rendered(_) => true,
            TickOutcome::Paused if needs_full => flight.redraw(),
            TickOutcome::Paused => false,
        };
        if rendered {
            last_engine_ms = engine_start.elapsed().as_secs_f32() * 1000.0;
        }

        let (term_cols, term_rows) = last_size;
        let hud = if show_hud {
            build_wrapped_hud(
                term_cols as usize,
                &HudStatus {
                    paused: flight.is_paused(),
                    camera: flight.last_camera(),
                    placed: flight.scene().placement.placed,
                    requested: flight.scene().placement.requested,
                    seed,
                    quality: runtime.quality,
                    fps: fps.fps(),
                    engine_ms: last_engine_ms,
                    render_ms: last_render_ms,
                    total_ms: last_total_ms,
                    renderer: renderer.name(),
                },
            )
        } else {
            String::new()
        };

        let target_hud_rows = hud_rows_for_text(term_rows, show_hud, &hud);
        if target_hud_rows != hud_rows {
            hud_rows = target_hud_rows;
            resize_engine(flight.renderer_mut(), last_size, cell, hud_rows);
            // Picture geometry changed; draw it on the next pass.
            needs_full = true;
            continue;
        }

        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let (w, h) = pixel_size(last_size, cell, hud_rows);
        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: flight.renderer().last_frame(),
            hud: &hud,
            hud_rows,
            overlay: show_help.then(help_popup_text),
            sync_updates: cfg.sync_updates,
        };

        let render_start = Instant::now();
        if rendered {
            renderer.render(&frame, &mut out)?;
            needs_full = false;
        } else {
            renderer.render_hud(&frame, &mut out)?;
        }
        last_render_ms = render_start.elapsed().as_secs_f32() * 1000.0;
        let total_ms = frame_start.elapsed().as_secs_f32() * 1000.0;

        fps.tick();
        if rendered {
            last_total_ms = total_ms;
            let before = runtime.quality;
            runtime.update(total_ms, 1000.0 / cfg.fps.max(1) as f32);
            if runtime.quality != before {
                debug!(from = ?before, to = ?runtime.quality, ema_ms = runtime.ema_ms, "quality changed");
                flight.renderer_mut().set_quality(runtime.quality);
            }
        }

        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = frame_start.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

fn pixel_size(size: (u16, u16), cell: (usize, usize), hud_rows: u16) -> (usize, usize) {
    let (cols, rows) = size;
    let visual_rows = rows.saturating_sub(hud_rows).max(1);
    (
        (cols as usize).saturating_mul(cell.0),
        (visual_rows as usize).saturating_mul(cell.1),
    )
}

fn resize_engine(engine: &mut WormholeEngine, size: (u16, u16), cell: (usize, usize), hud_rows: u16) {
    let (w, h) = pixel_size(size, cell, hud_rows);
    if engine.size() != (w, h) {
        debug!(cols = size.0, rows = size.1, w, h, "resize");
    }
    engine.resize(w, h);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    None,
    TogglePause,
    Quit,
}

fn handle_key(code: KeyCode, mods: KeyModifiers, show_hud: &mut bool, show_help: &mut bool) -> KeyAction {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return KeyAction::Quit;
    }

    match code {
        KeyCode::Esc if *show_help => {
            *show_help = false;
            KeyAction::None
        }
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => KeyAction::TogglePause,
        KeyCode::Char('i') | KeyCode::Char('I') => {
            *show_hud = !*show_hud;
            KeyAction::None
        }
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
            *show_help = !*show_help;
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

fn hud_rows_for_size(size: (u16, u16), show_hud: bool) -> u16 {
    if !show_hud || size.1 <= 1 {
        return 0;
    }
    (size.1 - 1).min(3)
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    (hud.lines().count() as u16).min(term_rows.saturating_sub(1))
}

struct HudStatus<'a> {
    paused: bool,
    camera: Option<CameraState>,
    placed: usize,
    requested: usize,
    seed: u64,
    quality: Quality,
    fps: f32,
    engine_ms: f32,
    render_ms: f32,
    total_ms: f32,
    renderer: &'a str,
}

fn build_wrapped_hud(cols: usize, s: &HudStatus<'_>) -> String {
    let (param, pos) = match s.camera {
        Some(c) => (
            format!("{:.3} -> {:.3}", c.camera_param, c.look_at_param),
            format!("({:>6.2}, {:>6.2}, {:>6.2})", c.position.x, c.position.y, c.position.z),
        ),
        None => ("-".to_string(), "-".to_string()),
    };
    let logical_lines = vec![
        format!(
            "{} | Param: {} | Pos: {} | Worms: {}/{} | Seed: {}",
            if s.paused { "PAUSED" } else { "Flying" },
            param,
            pos,
            s.placed,
            s.requested,
            s.seed,
        ),
        format!(
            "Quality: {:?} | FPS: {:>4.1} | ms(E/R/T): {:>4.1}/{:>4.1}/{:>4.1} | Renderer: {}",
            s.quality, s.fps, s.engine_ms, s.render_ms, s.total_ms, s.renderer
        ),
        "Keys: space/p pause | i HUD | ?/h help | q quit".to_string(),
    ];
    wrap_hud_lines(cols, &logical_lines).join("\n")
}

fn wrap_hud_lines(cols: usize, lines: &[String]) -> Vec<String> {
    let width = cols.max(1);
    lines.iter().flat_map(|l| hard_wrap_line(l, width)).collect()
}

fn hard_wrap_line(line: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(width.max(1)).map(|c| c.iter().collect()).collect()
}

fn help_popup_text() -> &'static str {
    "Wormhole Hotkeys\n\
space / p  pause or resume the flight\n\
i  show/hide HUD\n\
? / h / F1  toggle this help\n\
q / esc / ctrl-c  quit\n\
\n\
Pausing freezes the camera; resuming continues from the same spot."
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}

/// Steps bloom quality down when frames run long and back up toward the requested level when
/// there is headroom.
struct RuntimeTuning {
    base_quality: Quality,
    quality: Quality,
    adaptive: bool,
    ema_ms: f32,
}

impl RuntimeTuning {
    fn new(base_quality: Quality, adaptive: bool) -> Self {
        Self {
            base_quality,
            quality: base_quality,
            adaptive,
            ema_ms: 0.0,
        }
    }

    fn update(&mut self, frame_ms: f32, target_ms: f32) {
        if !self.adaptive {
            return;
        }
        self.ema_ms = if self.ema_ms == 0.0 {
            frame_ms
        } else {
            self.ema_ms * 0.95 + frame_ms * 0.05
        };

        if self.ema_ms > target_ms * 1.22 {
            self.quality = self.quality.lower();
        } else if self.ema_ms < target_ms * 0.72 && self.quality.rank() < self.base_quality.rank() {
            self.quality = self.quality.higher();
        }
    }
}
