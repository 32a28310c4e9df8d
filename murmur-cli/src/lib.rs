//! Headless murmuration runner.
//!
//! Resolves parameters from built-in presets, an optional JSON config file
//! and command-line overrides, then steps the flock and reports statistics.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use murmur_core::{AgentFrame, FlockStats, FormationSource, Murmuration};
use murmur_raster::MonoFontRasterizer;
use murmur_shared::{PresetLibrary, SimulationParams, TextModeParams};
use serde::{Deserialize, Serialize};

/// On-disk configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFile {
    pub simulation: Option<SimulationParams>,
    pub text: Option<TextModeParams>,
    pub text_mode: bool,
    /// `"text"` or a shape name.
    pub formation: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config JSON in {}", path.display()))
    }
}

/// Command-line values layered on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub preset: Option<String>,
    pub birds: Option<usize>,
    pub text: Option<String>,
    pub formation: Option<String>,
    pub text_mode: bool,
    pub trails: bool,
}

/// Fully resolved starting state for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub params: SimulationParams,
    pub text_params: TextModeParams,
    pub text_mode: bool,
    pub source: FormationSource,
}

/// Simulation parameters come from the preset if one is named, else the
/// config file, else the defaults. Overrides always win.
pub fn resolve_settings(
    config: ConfigFile,
    overrides: &Overrides,
    library: &PresetLibrary,
) -> Result<Settings> {
    let mut params = match (&overrides.preset, config.simulation) {
        (Some(name), _) => match library.get(name) {
            Some(params) => params.clone(),
            None => bail!(
                "Unknown preset {:?} (available: {})",
                name,
                library.names().join(", ")
            ),
        },
        (None, Some(params)) => params,
        (None, None) => SimulationParams::default(),
    };
    let mut text_params = config.text.unwrap_or_default();

    if let Some(birds) = overrides.birds {
        params.bird_count = birds;
    }
    if overrides.trails {
        params.show_trails = true;
    }
    if let Some(text) = &overrides.text {
        text_params.text = text.clone();
    }

    let formation = overrides.formation.as_deref().or(config.formation.as_deref());
    let source = formation
        .map(|name| name.parse::<FormationSource>().unwrap_or_default())
        .unwrap_or_default();

    Ok(Settings {
        params,
        text_params,
        text_mode: config.text_mode || overrides.text_mode,
        source,
    })
}

/// Builds a flock ready to tick, already in formation mode if requested.
pub fn build_flock(settings: &Settings, seed: u64) -> Murmuration {
    let mut flock = Murmuration::new(
        settings.params.clone(),
        settings.text_params.clone(),
        Box::new(MonoFontRasterizer::new()),
        seed,
    );
    flock.set_formation_source(settings.source);
    flock.set_text_mode(settings.text_mode);
    flock
}

pub fn format_stats(tick: u64, stats: &FlockStats) -> String {
    let mut line = format!(
        "tick {:>5}: {} birds, centroid ({:.1}, {:.1}, {:.1}), speed {:.2}, formation {:.2}",
        tick,
        stats.count,
        stats.centroid.x,
        stats.centroid.y,
        stats.centroid.z,
        stats.mean_speed,
        stats.mean_formation_weight,
    );
    if let Some(distance) = stats.mean_target_distance {
        line.push_str(&format!(", {} targeted at {:.1}", stats.targeted, distance));
    }
    line
}

/// Steps `ticks` frames, logging statistics every `report_every` ticks
/// (never when zero). Returns the final statistics.
pub fn run(flock: &mut Murmuration, ticks: u64, report_every: u64) -> FlockStats {
    for _ in 0..ticks {
        flock.tick();
        let tick = flock.tick_count();
        if report_every > 0 && tick % report_every == 0 {
            log::info!("{}", format_stats(tick, &flock.stats()));
        }
    }
    flock.stats()
}

pub fn write_frames(path: &Path, frames: &[AgentFrame]) -> Result<()> {
    let json = serde_json::to_string_pretty(frames).context("Failed to serialize frames")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} frames to {}", frames.len(), path.display());
    Ok(())
}
