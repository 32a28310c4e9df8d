//! Data model shared between the murmuration engine and its hosts.
//!
//! Everything here is plain serde data: parameter snapshots the host edits,
//! the in-memory preset library, and the per-agent frames handed back for
//! drawing. Field names serialize in camelCase so the JSON matches what a
//! browser front end sends.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Flocking parameters, read once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationParams {
    /// Desired population size. Negative values in JSON clamp to zero.
    #[serde(deserialize_with = "clamped_count")]
    pub bird_count: usize,
    /// Multiplier applied to `max_speed` when clamping velocity.
    pub speed: f32,
    pub cohesion_factor: f32,
    pub alignment_factor: f32,
    pub separation_factor: f32,
    pub perception_radius: f32,
    pub max_force: f32,
    pub max_speed: f32,
    pub bird_size: f32,
    pub show_trails: bool,
    pub trail_length: usize,
    pub boundary_radius: f32,
    pub wind_factor: f32,
    /// Raw wind offset. Not normalized, its magnitude matters.
    pub wind_direction: [f32; 3],
    /// Birds below this height are pushed back up.
    pub horizon_height: f32,
    /// Minimum distance birds keep from the camera at the origin.
    pub min_camera_distance: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            bird_count: 500,
            speed: 0.2,
            cohesion_factor: 0.6,
            alignment_factor: 0.4,
            separation_factor: 2.0,
            perception_radius: 13.0,
            max_force: 0.2,
            max_speed: 3.0,
            bird_size: 0.6,
            show_trails: false,
            trail_length: 20,
            boundary_radius: 160.0,
            wind_factor: 0.0,
            wind_direction: [0.0, 0.0, 0.0],
            horizon_height: -20.0,
            min_camera_distance: 30.0,
        }
    }
}

impl SimulationParams {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn clamped_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.max(0) as usize)
}

/// Parameters for the flock-to-text formation mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextModeParams {
    pub text: String,
    pub font_size: f32,
    pub font_weight: u32,
    /// Formation weight change per tick, typically 0.001-0.05.
    pub transition_speed: f32,
    /// Sampling density multiplier, must be positive.
    pub formation_density: f32,
    pub maintain_formation: bool,
    pub position_x: f32,
    pub position_y: f32,
}

impl Default for TextModeParams {
    fn default() -> Self {
        Self {
            text: "MURMURATION".to_string(),
            font_size: 5.0,
            font_weight: 300,
            transition_speed: 0.02,
            formation_density: 1.0,
            maintain_formation: true,
            position_x: -35.0,
            position_y: 45.0,
        }
    }
}

impl TextModeParams {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// True when switching from `self` to `other` changes the sampled point set.
    pub fn layout_differs(&self, other: &TextModeParams) -> bool {
        self.text != other.text
            || self.font_size != other.font_size
            || self.font_weight != other.font_weight
            || self.formation_density != other.formation_density
            || self.position_x != other.position_x
            || self.position_y != other.position_y
    }
}

/// Render snapshot of one bird.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentFrame {
    pub id: usize,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub size: f32,
    /// 0 = free flocking, 1 = fully in formation. Used for color blending.
    pub formation_weight: f32,
    /// Past positions, oldest first.
    pub trail: Vec<[f32; 3]>,
}

pub const DEFAULT_PRESET: &str = "Default";

/// In-memory name to parameter mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetLibrary {
    presets: BTreeMap<String, SimulationParams>,
}

impl PresetLibrary {
    /// Library seeded with the built-in presets.
    pub fn new() -> Self {
        let base = SimulationParams::default();
        let mut presets = BTreeMap::new();

        presets.insert(DEFAULT_PRESET.to_string(), base.clone());
        presets.insert(
            "Dense Flock".to_string(),
            SimulationParams {
                bird_count: 1000,
                cohesion_factor: 0.5,
                alignment_factor: 0.6,
                separation_factor: 1.5,
                perception_radius: 15.0,
                ..base.clone()
            },
        );
        presets.insert(
            "Scattered".to_string(),
            SimulationParams {
                bird_count: 300,
                cohesion_factor: 0.2,
                alignment_factor: 0.3,
                separation_factor: 2.5,
                perception_radius: 10.0,
                ..base.clone()
            },
        );
        presets.insert(
            "Fast".to_string(),
            SimulationParams {
                speed: 0.8,
                max_speed: 4.0,
                trail_length: 30,
                ..base.clone()
            },
        );
        presets.insert(
            "Windy Day".to_string(),
            SimulationParams {
                wind_factor: 0.3,
                wind_direction: [1.0, 0.5, 0.0],
                ..base.clone()
            },
        );
        presets.insert(
            "Calm".to_string(),
            SimulationParams {
                speed: 0.3,
                cohesion_factor: 0.2,
                alignment_factor: 0.3,
                separation_factor: 1.5,
                bird_count: 400,
                min_camera_distance: 80.0,
                boundary_radius: 180.0,
                ..base
            },
        );

        Self { presets }
    }

    /// Stores a copy of `params` under `name`, replacing any existing entry.
    pub fn save(&mut self, name: &str, params: &SimulationParams) {
        self.presets.insert(name.to_string(), params.clone());
    }

    /// Named preset, or the defaults when the name is unknown.
    pub fn load(&self, name: &str) -> SimulationParams {
        self.presets.get(name).cloned().unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&SimulationParams> {
        self.presets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    /// Preset names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for PresetLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_json_uses_camel_case() {
        let json = SimulationParams::default().to_json().unwrap();
        assert!(json.contains("\"birdCount\": 500"));
        assert!(json.contains("\"minCameraDistance\""));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let params = SimulationParams::from_json(r#"{"birdCount": 42, "windFactor": 0.5}"#).unwrap();
        assert_eq!(params.bird_count, 42);
        assert_eq!(params.wind_factor, 0.5);
        assert_eq!(params.max_speed, 3.0);
    }

    #[test]
    fn test_negative_bird_count_clamps_to_zero() {
        let params = SimulationParams::from_json(r#"{"birdCount": -12}"#).unwrap();
        assert_eq!(params.bird_count, 0);
    }

    #[test]
    fn test_text_params_layout_differs() {
        let base = TextModeParams::default();
        let mut other = base.clone();
        other.transition_speed = 0.05;
        other.maintain_formation = false;
        assert!(!base.layout_differs(&other));

        other.position_x += 1.0;
        assert!(base.layout_differs(&other));
    }

    #[test]
    fn test_builtin_presets() {
        let library = PresetLibrary::new();
        assert_eq!(
            library.names(),
            vec!["Calm", "Default", "Dense Flock", "Fast", "Scattered", "Windy Day"]
        );
        assert_eq!(library.load("Dense Flock").bird_count, 1000);
        assert_eq!(library.load("Windy Day").wind_direction, [1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_unknown_preset_loads_defaults() {
        let library = PresetLibrary::new();
        assert_eq!(library.load("nope"), SimulationParams::default());
    }

    #[test]
    fn test_save_preset_copies_params() {
        let mut library = PresetLibrary::new();
        let mut params = SimulationParams::default();
        params.bird_count = 7;
        library.save("Tiny", &params);
        params.bird_count = 9;

        assert!(library.contains("Tiny"));
        assert_eq!(library.load("Tiny").bird_count, 7);
    }
}
