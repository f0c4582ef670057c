use approx::assert_relative_eq;
use clap::Parser;
use tui_wormhole::config::{Config, ConfigError, CurveChoice, Quality, RendererMode, MAX_WORMS};
use tui_wormhole::scene::curve::CurvePreset;

fn parse(args: &[&str]) -> Config {
    let mut argv = vec!["tui_wormhole"];
    argv.extend_from_slice(args);
    Config::try_parse_from(argv).unwrap()
}

// ── Defaults ────────────────────────────────────────────────────────────────

#[test]
fn defaults_describe_the_wormhole_flythrough() {
    let cfg = parse(&[]);
    assert_eq!(cfg.renderer, RendererMode::HalfBlock);
    assert_eq!(cfg.quality, Quality::Balanced);
    assert_eq!(cfg.curve, CurveChoice::Wormhole);
    assert_eq!(cfg.worms, 120);
    assert!(cfg.seed.is_none());
    assert!(cfg.log_file.is_none());

    let s = cfg.settings().unwrap();
    assert_eq!(s.curve, CurvePreset::Wormhole);
    assert_relative_eq!(s.path.loop_time_ms, 13_000.0);
    assert_relative_eq!(s.path.speed_factor, 0.25);
    assert_relative_eq!(s.path.look_ahead, 0.02);
    assert_relative_eq!(s.path.start_offset, 0.05);
    assert_eq!(s.placement.max_count, 120);
    assert_eq!(s.placement.history_capacity, 8);
    assert_eq!(s.placement.max_attempts_per_worm, 20);
    assert_relative_eq!(s.placement.min_pairwise_distance, 0.5);
    assert_relative_eq!(s.bloom.strength, 4.0);
    assert_relative_eq!(s.bloom.radius, 1.0);
    assert_relative_eq!(s.bloom.threshold, 0.02);
    assert_relative_eq!(s.fog_density, 0.4);
}

#[test]
fn flags_flow_into_settings() {
    let cfg = parse(&[
        "--renderer",
        "braille",
        "--curve",
        "circle",
        "--worms",
        "10",
        "--seed",
        "42",
        "--speed",
        "1",
        "--min-distance",
        "0.75",
        "--quality",
        "fast",
        "--adaptive-quality",
        "false",
    ]);
    assert_eq!(cfg.renderer, RendererMode::Braille);
    assert_eq!(cfg.renderer.cell_pixels(), (2, 4));
    assert!(!cfg.adaptive_quality);
    let s = cfg.settings().unwrap();
    assert_eq!(s.curve, CurvePreset::Circle { radius: 1.0 });
    assert_eq!(s.placement.max_count, 10);
    assert_eq!(s.seed, Some(42));
    assert_relative_eq!(s.path.period_ms(), 13_000.0);
    assert_relative_eq!(s.placement.min_pairwise_distance, 0.75);
}

#[test]
fn renderer_aliases_parse() {
    assert_eq!(parse(&["--renderer", "hb"]).renderer, RendererMode::HalfBlock);
    assert_eq!(parse(&["--renderer", "dots"]).renderer, RendererMode::Braille);
}

#[test]
fn unknown_values_are_rejected_by_clap() {
    assert!(Config::try_parse_from(["tui_wormhole", "--curve", "spiral"]).is_err());
    assert!(Config::try_parse_from(["tui_wormhole", "--worms", "-3"]).is_err());
}

// ── Validation ──────────────────────────────────────────────────────────────

#[test]
fn zero_loop_time_is_a_config_error() {
    let err = parse(&["--loop-time-ms", "0"]).settings().unwrap_err();
    assert_eq!(
        err,
        ConfigError::NonPositive {
            name: "loop-time-ms",
            value: 0.0
        }
    );
    assert!(err.to_string().contains("loop-time-ms must be positive"));
}

#[test]
fn zero_fps_and_speed_are_rejected() {
    assert!(matches!(
        parse(&["--fps", "0"]).settings(),
        Err(ConfigError::NonPositive { name: "fps", .. })
    ));
    assert!(matches!(
        parse(&["--speed", "0"]).settings(),
        Err(ConfigError::NonPositive { name: "speed", .. })
    ));
}

#[test]
fn look_ahead_must_be_a_fraction() {
    assert!(parse(&["--look-ahead", "0"]).settings().is_ok());
    assert!(matches!(
        parse(&["--look-ahead", "1"]).settings(),
        Err(ConfigError::OutOfRange { name: "look-ahead", .. })
    ));
    assert!(matches!(
        parse(&["--look-ahead=-0.1"]).settings(),
        Err(ConfigError::OutOfRange { name: "look-ahead", .. })
    ));
}

#[test]
fn non_finite_values_are_rejected() {
    assert!(matches!(
        parse(&["--start-offset", "NaN"]).settings(),
        Err(ConfigError::NotFinite { name: "start-offset" })
    ));
    assert!(matches!(
        parse(&["--bloom-strength", "inf"]).settings(),
        Err(ConfigError::NotFinite { name: "bloom-strength" })
    ));
}

#[test]
fn negative_distances_are_rejected() {
    assert!(matches!(
        parse(&["--min-distance=-1"]).settings(),
        Err(ConfigError::OutOfRange { name: "min-distance", .. })
    ));
    assert!(matches!(
        parse(&["--fog-density=-0.1"]).settings(),
        Err(ConfigError::OutOfRange { name: "fog-density", .. })
    ));
}

#[test]
fn worm_count_is_capped() {
    assert!(parse(&["--worms", "9999"]).settings().is_ok());
    assert!(matches!(
        parse(&["--worms", "10000"]).settings(),
        Err(ConfigError::OutOfRange { name: "worms", .. })
    ));
    let huge = usize::MAX.to_string();
    let err = parse(&["--worms", &huge, "--curve", "circle"]).settings().unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { name: "worms", .. }));
    assert!(err.to_string().contains(&MAX_WORMS.to_string()));
}

#[test]
fn quality_steps_and_bloom_levels() {
    assert_eq!(Quality::Fast.lower(), Quality::Fast);
    assert_eq!(Quality::Fast.higher(), Quality::Balanced);
    assert_eq!(Quality::Ultra.higher(), Quality::Ultra);
    assert!(Quality::High.rank() > Quality::Balanced.rank());
    assert_eq!(Quality::Fast.bloom_levels(), 2);
    assert_eq!(Quality::Ultra.bloom_levels(), 5);
}
