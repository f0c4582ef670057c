use crate::scene::curve::CurvePreset;
use crate::scene::path::PathParams;
use crate::scene::placement::PlacementConfig;
use crate::visual::bloom::BloomSettings;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

/// Exclusive upper bound for `--worms`.
pub const MAX_WORMS: usize = 10_000;

#[derive(Parser, Debug, Clone)]
#[command(name = "tui-wormhole", version, about = "Looping wormhole flythrough with bloom, rendered in the terminal")]
pub struct Config {
    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[arg(long, value_enum, default_value_t = Quality::Balanced)]
    pub quality: Quality,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub adaptive_quality: bool,

    #[arg(long, value_enum, default_value_t = CurveChoice::Wormhole)]
    pub curve: CurveChoice,

    /// Upper bound on decorative worms; fewer are placed when spacing retries run out.
    #[arg(long, default_value_t = 120)]
    pub worms: usize,

    #[arg(long, default_value_t = 0.5)]
    pub min_distance: f32,

    #[arg(long, default_value_t = 0.18)]
    pub worm_length: f32,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 0.25)]
    pub speed: f64,

    #[arg(long, default_value_t = 13_000.0)]
    pub loop_time_ms: f64,

    #[arg(long, default_value_t = 0.02)]
    pub look_ahead: f64,

    #[arg(long, default_value_t = 0.05)]
    pub start_offset: f64,

    #[arg(long, default_value_t = 4.0)]
    pub bloom_strength: f32,

    #[arg(long, default_value_t = 1.0)]
    pub bloom_radius: f32,

    #[arg(long, default_value_t = 0.02)]
    pub bloom_threshold: f32,

    #[arg(long, default_value_t = 0.4)]
    pub fog_density: f32,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
}

impl RendererMode {
    /// Pixels per terminal cell, (x, y).
    pub fn cell_pixels(self) -> (usize, usize) {
        match self {
            Self::HalfBlock => (1, 2),
            Self::Braille => (2, 4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CurveChoice {
    Wormhole,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Quality {
    Ultra,
    High,
    Balanced,
    Fast,
}

impl Quality {
    pub fn lower(self) -> Self {
        match self {
            Self::Ultra => Self::High,
            Self::High => Self::Balanced,
            Self::Balanced => Self::Fast,
            Self::Fast => Self::Fast,
        }
    }

    pub fn higher(self) -> Self {
        match self {
            Self::Fast => Self::Balanced,
            Self::Balanced => Self::High,
            Self::High => Self::Ultra,
            Self::Ultra => Self::Ultra,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Self::Fast => 0,
            Self::Balanced => 1,
            Self::High => 2,
            Self::Ultra => 3,
        }
    }

    /// Number of downsampled blur levels the bloom pass runs.
    pub fn bloom_levels(self) -> usize {
        match self {
            Self::Fast => 2,
            Self::Balanced => 3,
            Self::High => 4,
            Self::Ultra => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be within [{min}, {max}) (got {value})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{name} must be a finite number")]
    NotFinite { name: &'static str },
}

/// Validated runtime values derived from [`Config`].
#[derive(Debug, Clone)]
pub struct FlightSettings {
    pub curve: CurvePreset,
    pub path: PathParams,
    pub placement: PlacementConfig,
    pub bloom: BloomSettings,
    pub fog_density: f32,
    pub seed: Option<u64>,
}

impl Config {
    pub fn settings(&self) -> Result<FlightSettings, ConfigError> {
        positive("fps", self.fps as f64)?;
        in_range("worms", self.worms as f64, 0.0, MAX_WORMS as f64)?;
        positive("speed", self.speed)?;
        positive("loop-time-ms", self.loop_time_ms)?;
        in_range("look-ahead", self.look_ahead, 0.0, 1.0)?;
        finite("start-offset", self.start_offset)?;
        non_negative("min-distance", self.min_distance as f64)?;
        positive("worm-length", self.worm_length as f64)?;
        non_negative("bloom-strength", self.bloom_strength as f64)?;
        non_negative("bloom-radius", self.bloom_radius as f64)?;
        non_negative("bloom-threshold", self.bloom_threshold as f64)?;
        non_negative("fog-density", self.fog_density as f64)?;

        let curve = match self.curve {
            CurveChoice::Wormhole => CurvePreset::Wormhole,
            CurveChoice::Circle => CurvePreset::Circle { radius: 1.0 },
        };

        Ok(FlightSettings {
            curve,
            path: PathParams::new(self.start_offset, self.loop_time_ms, self.look_ahead, self.speed),
            placement: PlacementConfig {
                max_count: self.worms,
                min_pairwise_distance: self.min_distance,
                worm_length: self.worm_length,
                ..PlacementConfig::default()
            },
            bloom: BloomSettings {
                strength: self.bloom_strength,
                radius: self.bloom_radius,
                threshold: self.bloom_threshold,
            },
            fog_density: self.fog_density,
            seed: self.seed,
        })
    }
}

fn finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { name })
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if finite(name, value)? <= 0.0 {
        return Err(ConfigError::NonPositive { name, value });
    }
    Ok(value)
}

fn non_negative(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    in_range(name, value, 0.0, f64::INFINITY)
}

fn in_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    let v = finite(name, value)?;
    if v < min || v >= max {
        return Err(ConfigError::OutOfRange { name, value, min, max });
    }
    Ok(v)
}
