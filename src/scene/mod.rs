pub mod color;
pub mod curve;
pub mod path;
pub mod pause;
pub mod placement;
pub mod texture;
pub mod tube;
pub mod worm;

use crate::config::FlightSettings;
use color::{hex_to_linear, Rgb};
use curve::ClosedCurve;
use placement::{PlacementConfig, PlacementReport, WormDescriptor, WormPlacer};
use texture::Texture;
use tracing::info;
use tube::{TubeSettings, TubeWireframe};

pub const TUBE_COLOR: u32 = 0xab58ff;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneStyle {
    pub tube_color: Rgb,
    pub fog_color: Rgb,
    /// Exponential-squared fog density.
    pub fog_density: f32,
    /// How many times the skin texture repeats along a worm body.
    pub skin_repeat: f32,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            tube_color: hex_to_linear(TUBE_COLOR),
            fog_color: [0.0, 0.0, 0.0],
            fog_density: 0.4,
            skin_repeat: 3.0,
        }
    }
}

impl SceneStyle {
    /// Fraction of an object's own color that survives fog at view depth `depth`.
    pub fn fog_visibility(&self, depth: f32) -> f32 {
        let d = self.fog_density * depth;
        (-d * d).exp().clamp(0.0, 1.0)
    }

    /// Depth past which fog leaves less than 1/512 of the color.
    pub fn fog_cutoff(&self) -> f32 {
        if self.fog_density <= 0.0 {
            return f32::INFINITY;
        }
        (512.0f32).ln().sqrt() / self.fog_density
    }
}

/// Everything drawn each frame. Built once before the flight starts; read-only afterwards.
#[derive(Debug, Clone)]
pub struct Scene {
    pub curve: ClosedCurve,
    pub tube: TubeWireframe,
    pub worms: Vec<WormDescriptor>,
    pub placement: PlacementReport,
    pub skin: Texture,
    pub style: SceneStyle,
}

impl Scene {
    pub fn build(settings: &FlightSettings, rng: &mut fastrand::Rng) -> Self {
        let style = SceneStyle {
            fog_density: settings.fog_density,
            ..SceneStyle::default()
        };
        Self::with_curve(settings.curve.build(), &settings.placement, style, rng)
    }

    pub fn with_curve(
        curve: ClosedCurve,
        placement: &PlacementConfig,
        style: SceneStyle,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let tube = TubeWireframe::build(&curve, TubeSettings::default());
        let placed = WormPlacer::new(placement.clone()).place(&curve, rng);
        info!(
            requested = placed.report.requested,
            placed = placed.report.placed,
            skipped = placed.report.skipped,
            attempts = placed.report.total_attempts,
            curve_length = curve.length(),
            "scene built"
        );

        Self {
            curve,
            tube,
            worms: placed.worms,
            placement: placed.report,
            skin: Texture::banded(),
            style,
        }
    }
}
