use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tui_wormhole::clock::{Clock, ManualClock};
use tui_wormhole::config::{CurveChoice, Quality};
use tui_wormhole::flight::{Flythrough, TickOutcome};
use tui_wormhole::scene::curve::CurvePreset;
use tui_wormhole::scene::path::PathParams;
use tui_wormhole::scene::placement::PlacementConfig;
use tui_wormhole::scene::{Scene, SceneStyle};
use tui_wormhole::visual::bloom::BloomSettings;
use tui_wormhole::visual::{SceneRenderer, WormholeEngine};

/// Headless flythrough benchmark on synthetic time.
#[derive(Parser, Debug)]
#[command(name = "benchmark")]
struct Args {
    #[arg(long, default_value_t = 180)]
    frames: usize,

    #[arg(long, default_value_t = 160)]
    w: usize,

    #[arg(long, default_value_t = 88)]
    h: usize,

    #[arg(long, value_enum, default_value_t = Quality::Balanced)]
    quality: Quality,

    /// Benchmark every quality level instead of just `--quality`.
    #[arg(long)]
    all_qualities: bool,

    #[arg(long, default_value_t = 120)]
    worms: usize,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = CurveChoice::Wormhole)]
    curve: CurveChoice,

    /// Fail on black frames or when a run exceeds `--max-ms` per frame.
    #[arg(long)]
    ci_smoke: bool,

    #[arg(long, default_value_t = 40.0)]
    max_ms: f64,
}

struct RunStats {
    ms_per_frame: f64,
    lit: usize,
    paused_ticks: usize,
}

fn build_scene(args: &Args) -> Scene {
    let curve = match args.curve {
        CurveChoice::Wormhole => CurvePreset::Wormhole,
        CurveChoice::Circle => CurvePreset::Circle { radius: 1.0 },
    };
    let placement = PlacementConfig {
        max_count: args.worms,
        ..PlacementConfig::default()
    };
    let mut rng = fastrand::Rng::with_seed(args.seed);
    Scene::with_curve(curve.build(), &placement, SceneStyle::default(), &mut rng)
}

fn bench_quality(args: &Args, scene: &Scene, quality: Quality) -> RunStats {
    let mut engine = WormholeEngine::new(BloomSettings::default(), quality);
    engine.resize(args.w, args.h);
    let mut flight = Flythrough::new(scene.clone(), PathParams::default(), engine);

    let clock = ManualClock::new(0.0);
    let frames = args.frames.max(1);
    let pause_at = frames / 2;
    let mut lit = 0usize;
    let mut paused_ticks = 0usize;
    let mut render_time = Duration::ZERO;

    for f in 0..frames {
        // Pause for a short stretch midway so the frozen path is exercised too.
        if f == pause_at || f == pause_at + 10 {
            flight.toggle_pause(clock.now_ms());
        }
        let start = Instant::now();
        match flight.tick_with(&clock) {
            TickOutcome::Rendered(_) => {
                render_time += start.elapsed();
                let px = flight.renderer().last_frame();
                if px.chunks_exact(4).any(|p| p[0] != 0 || p[1] != 0 || p[2] != 0) {
                    lit += 1;
                }
            }
            TickOutcome::Paused => paused_ticks += 1,
        }
        clock.advance(1000.0 / 60.0);
    }

    let rendered = (frames - paused_ticks).max(1);
    RunStats {
        ms_per_frame: render_time.as_secs_f64() * 1000.0 / rendered as f64,
        lit,
        paused_ticks,
    }
}

fn main() -> Result<()> {
    tui_wormhole::logging::init_stderr()?;
    let args = Args::parse();

    let scene = build_scene(&args);
    let report = scene.placement;
    info!(seed = args.seed, ?report, "benchmark scene ready");
    println!(
        "Wormhole benchmark: frames={} size={}x{} curve={:?} worms={}/{} (skipped {}, attempts {})",
        args.frames,
        args.w,
        args.h,
        args.curve,
        report.placed,
        report.requested,
        report.skipped,
        report.total_attempts
    );

    let qualities: Vec<Quality> = if args.all_qualities {
        vec![Quality::Fast, Quality::Balanced, Quality::High, Quality::Ultra]
    } else {
        vec![args.quality]
    };

    let mut failures = Vec::<String>::new();
    for q in qualities {
        let stats = bench_quality(&args, &scene, q);
        let rendered = args.frames.max(1) - stats.paused_ticks;
        let fps = if stats.ms_per_frame > 0.0 { 1000.0 / stats.ms_per_frame } else { 0.0 };
        println!(
            "  {:<9} {:>8.3} ms/frame  {:>7.2} FPS  lit={:>3}/{}  paused ticks={}",
            format!("{q:?}"),
            stats.ms_per_frame,
            fps,
            stats.lit,
            rendered,
            stats.paused_ticks
        );
        if stats.lit == 0 {
            failures.push(format!("{q:?}: every frame was black"));
        }
        if stats.ms_per_frame > args.max_ms {
            failures.push(format!(
                "{q:?}: {:.3} ms/frame > {:.3}",
                stats.ms_per_frame, args.max_ms
            ));
        }
    }

    if args.ci_smoke {
        if !failures.is_empty() {
            eprintln!("CI smoke: FAIL");
            for f in &failures {
                eprintln!("  {f}");
            }
            anyhow::bail!("ci smoke failed");
        }
        println!("CI smoke: PASS (max_ms={:.3})", args.max_ms);
    }
    Ok(())
}
