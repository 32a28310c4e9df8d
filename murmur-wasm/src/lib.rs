//! Browser bindings for the murmuration engine.
//!
//! The host drives `tick()` from `requestAnimationFrame` and reads the flat
//! position/velocity/weight buffers for rendering.

use murmur_core::{FormationSource, Murmuration};
use murmur_shared::{PresetLibrary, SimulationParams, TextModeParams};
use wasm_bindgen::prelude::*;

pub mod canvas;

pub use canvas::CanvasRasterizer;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct MurmurationSim {
    flock: Murmuration,
    presets: PresetLibrary,
}

#[wasm_bindgen]
impl MurmurationSim {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32) -> MurmurationSim {
        let flock = Murmuration::new(
            SimulationParams::default(),
            TextModeParams::default(),
            Box::new(CanvasRasterizer::new()),
            seed as u64,
        );
        console_log!(
            "Initializing murmuration with {} birds (seed {})",
            flock.birds().len(),
            seed
        );

        MurmurationSim {
            flock,
            presets: PresetLibrary::new(),
        }
    }

    /// Seeds from `Math.random()`.
    pub fn with_random_seed() -> MurmurationSim {
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u32;
        Self::new(seed)
    }

    /// Advances one frame. Returns false while paused.
    pub fn tick(&mut self) -> bool {
        self.flock.tick()
    }

    pub fn bird_count(&self) -> usize {
        self.flock.birds().len()
    }

    pub fn set_params_json(&mut self, json: &str) -> Result<(), JsValue> {
        let params = SimulationParams::from_json(json).map_err(to_js)?;
        self.flock.set_params(params);
        Ok(())
    }

    pub fn params_json(&self) -> Result<String, JsValue> {
        self.flock.params().to_json().map_err(to_js)
    }

    pub fn set_text_params_json(&mut self, json: &str) -> Result<(), JsValue> {
        let text_params = TextModeParams::from_json(json).map_err(to_js)?;
        self.flock.set_text_params(text_params);
        Ok(())
    }

    pub fn set_text_mode(&mut self, active: bool) {
        self.flock.set_text_mode(active);
        console_log!("Text mode {}", if active { "on" } else { "off" });
    }

    pub fn toggle_text_mode(&mut self) -> bool {
        self.flock.toggle_text_mode();
        self.flock.is_text_mode()
    }

    pub fn is_text_mode(&self) -> bool {
        self.flock.is_text_mode()
    }

    /// `"text"` forms the configured text, anything else names a shape.
    pub fn set_formation(&mut self, source: &str) {
        let source: FormationSource = source.parse().unwrap_or_default();
        self.flock.set_formation_source(source);
    }

    /// Flips the pause flag and returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.flock.toggle_pause();
        self.flock.is_paused()
    }

    pub fn is_paused(&self) -> bool {
        self.flock.is_paused()
    }

    pub fn load_preset(&mut self, name: &str) {
        console_log!("Loading preset {}", name);
        self.flock.load_preset(&self.presets, name);
    }

    /// Stores the current parameters under `name`.
    pub fn save_preset(&mut self, name: &str) {
        self.presets.save(name, self.flock.params());
    }

    pub fn preset_names(&self) -> js_sys::Array {
        self.presets
            .names()
            .into_iter()
            .map(JsValue::from_str)
            .collect()
    }

    pub fn presets_json(&self) -> Result<String, JsValue> {
        self.presets.to_json().map_err(to_js)
    }

    /// `[x0, y0, z0, x1, ...]`
    pub fn positions(&self) -> Vec<f32> {
        self.flock
            .birds()
            .iter()
            .flat_map(|b| b.position.to_array())
            .collect()
    }

    pub fn velocities(&self) -> Vec<f32> {
        self.flock
            .birds()
            .iter()
            .flat_map(|b| b.velocity.to_array())
            .collect()
    }

    pub fn sizes(&self) -> Vec<f32> {
        self.flock.birds().iter().map(|b| b.size).collect()
    }

    pub fn formation_weights(&self) -> Vec<f32> {
        self.flock.birds().iter().map(|b| b.formation_weight).collect()
    }

    /// Full per-bird frames including trails.
    pub fn frames_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.flock.frames()).map_err(to_js)
    }
}
