use std::fmt;
use std::str::FromStr;

use murmur_shared::{AgentFrame, PresetLibrary, SimulationParams, TextModeParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assign::{assign_targets, clear_targets};
use crate::bird::{behavior, Bird, TrailSnapshot};
use crate::sampler::{sample_text_points, TextRasterizer};
use crate::shapes::ShapeKind;
use crate::vector::Vector3D;

/// Advances every bird by one tick.
///
/// Forces are computed for the whole flock against the positions and
/// velocities at the start of the tick, then applied. No bird sees a
/// neighbor that has already moved this tick.
pub fn tick(
    birds: &mut [Bird],
    params: &SimulationParams,
    is_text_mode: bool,
    text_params: &TextModeParams,
) {
    let forces: Vec<Vector3D> = birds
        .iter()
        .map(|bird| behavior::flocking_force(bird, birds, params))
        .collect();

    for (bird, force) in birds.iter_mut().zip(forces) {
        bird.advance(force, params, is_text_mode, text_params);
    }
}

/// Grows or shrinks the population to `new_count`.
///
/// Existing birds keep their state; new ones spawn at random with ids equal
/// to their list index. Shrinking drops the highest-index birds. Every
/// surviving trail is cleared.
pub fn regenerate_population<R: Rng + ?Sized>(
    mut birds: Vec<Bird>,
    new_count: usize,
    boundary_radius: f32,
    bird_size: f32,
    rng: &mut R,
) -> Vec<Bird> {
    if new_count < birds.len() {
        birds.truncate(new_count);
    } else {
        birds.reserve(new_count - birds.len());
        for id in birds.len()..new_count {
            birds.push(Bird::random(id, boundary_radius, bird_size, rng));
        }
    }

    for bird in birds.iter_mut() {
        bird.clear_trail();
    }
    birds
}

/// What the flock assembles into while in text mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormationSource {
    #[default]
    Text,
    Shape(ShapeKind),
}

impl fmt::Display for FormationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormationSource::Text => write!(f, "text"),
            FormationSource::Shape(shape) => write!(f, "{}", shape.name()),
        }
    }
}

/// `"text"` selects text, any other name a shape (unknown names mean a circle).
impl FromStr for FormationSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("text") {
            Ok(FormationSource::Text)
        } else {
            s.parse().map(FormationSource::Shape)
        }
    }
}

/// Aggregate view of the flock, mostly for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockStats {
    pub count: usize,
    pub centroid: Vector3D,
    pub mean_speed: f32,
    pub mean_formation_weight: f32,
    pub targeted: usize,
    /// Mean distance to target over birds that have one.
    pub mean_target_distance: Option<f32>,
}

/// Owns the flock and applies host changes between ticks.
pub struct Murmuration {
    birds: Vec<Bird>,
    params: SimulationParams,
    text_params: TextModeParams,
    text_mode: bool,
    paused: bool,
    source: FormationSource,
    rasterizer: Box<dyn TextRasterizer>,
    rng: StdRng,
    ticks: u64,
}

impl Murmuration {
    pub fn new(
        params: SimulationParams,
        text_params: TextModeParams,
        rasterizer: Box<dyn TextRasterizer>,
        seed: u64,
    ) -> Self {
        Self::with_rng(params, text_params, rasterizer, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(
        params: SimulationParams,
        text_params: TextModeParams,
        rasterizer: Box<dyn TextRasterizer>,
        mut rng: StdRng,
    ) -> Self {
        let birds = regenerate_population(
            Vec::new(),
            params.bird_count,
            params.boundary_radius,
            params.bird_size,
            &mut rng,
        );
        log::info!("Spawned murmuration of {} birds", birds.len());

        Self {
            birds,
            params,
            text_params,
            text_mode: false,
            paused: false,
            source: FormationSource::Text,
            rasterizer,
            rng,
            ticks: 0,
        }
    }

    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn text_params(&self) -> &TextModeParams {
        &self.text_params
    }

    pub fn is_text_mode(&self) -> bool {
        self.text_mode
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn formation_source(&self) -> FormationSource {
        self.source
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Runs one tick unless paused. Returns whether the flock moved.
    pub fn tick(&mut self) -> bool {
        if self.paused || self.birds.is_empty() {
            return false;
        }
        tick(&mut self.birds, &self.params, self.text_mode, &self.text_params);
        self.ticks += 1;
        true
    }

    pub fn set_params(&mut self, params: SimulationParams) {
        let old = std::mem::replace(&mut self.params, params);

        if old.bird_count != self.params.bird_count {
            log::info!(
                "Resizing murmuration from {} to {} birds",
                self.birds.len(),
                self.params.bird_count
            );
            let birds = std::mem::take(&mut self.birds);
            self.birds = regenerate_population(
                birds,
                self.params.bird_count,
                self.params.boundary_radius,
                self.params.bird_size,
                &mut self.rng,
            );
        }

        if old.bird_size != self.params.bird_size {
            for bird in self.birds.iter_mut() {
                bird.size = self.params.bird_size;
            }
        }

        if self.text_mode && old.boundary_radius != self.params.boundary_radius {
            self.refresh_formation();
        }

        if TrailSnapshot::from(&old) != TrailSnapshot::from(&self.params)
            || old.show_trails != self.params.show_trails
            || old.wind_direction != self.params.wind_direction
        {
            self.clear_trails();
        }
    }

    pub fn set_text_params(&mut self, text_params: TextModeParams) {
        let old = std::mem::replace(&mut self.text_params, text_params);
        if self.text_mode && old.layout_differs(&self.text_params) {
            self.refresh_formation();
            self.clear_trails();
        }
    }

    pub fn set_text_mode(&mut self, active: bool) {
        if active == self.text_mode {
            return;
        }
        self.text_mode = active;

        if active {
            log::info!("Entering formation mode ({})", self.source);
            self.refresh_formation();
        } else {
            log::info!("Leaving formation mode");
            clear_targets(&mut self.birds);
        }
        self.clear_trails();
    }

    pub fn toggle_text_mode(&mut self) {
        self.set_text_mode(!self.text_mode);
    }

    /// Switches between text and a procedural shape. Takes effect
    /// immediately in text mode.
    pub fn set_formation_source(&mut self, source: FormationSource) {
        if source == self.source {
            return;
        }
        self.source = source;
        log::info!("Formation source set to {}", source);
        if self.text_mode {
            self.refresh_formation();
            self.clear_trails();
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Applies a named preset, falling back to the defaults.
    pub fn load_preset(&mut self, library: &PresetLibrary, name: &str) {
        if !library.contains(name) {
            log::warn!("Unknown preset {:?}, using defaults", name);
        }
        self.set_params(library.load(name));
    }

    pub fn clear_trails(&mut self) {
        for bird in self.birds.iter_mut() {
            bird.clear_trail();
        }
    }

    /// Target points for the current formation source, one budget slot per bird.
    pub fn formation_points(&self) -> Vec<Vector3D> {
        match self.source {
            FormationSource::Text => sample_text_points(
                self.rasterizer.as_ref(),
                &self.text_params.text,
                &self.text_params,
                self.birds.len(),
            ),
            FormationSource::Shape(shape) => shape.points(self.birds.len()),
        }
    }

    /// Resamples the formation and reassigns every target.
    fn refresh_formation(&mut self) -> usize {
        if self.birds.is_empty() {
            return 0;
        }
        let points = self.formation_points();
        if points.is_empty() {
            log::warn!("Formation produced no target points");
        }
        assign_targets(&mut self.birds, &points, &mut self.rng)
    }

    pub fn frames(&self) -> Vec<AgentFrame> {
        self.birds.iter().map(Bird::to_frame).collect()
    }

    pub fn stats(&self) -> FlockStats {
        let count = self.birds.len();
        if count == 0 {
            return FlockStats {
                count,
                centroid: Vector3D::zero(),
                mean_speed: 0.0,
                mean_formation_weight: 0.0,
                targeted: 0,
                mean_target_distance: None,
            };
        }

        let mut centroid = Vector3D::zero();
        let mut speed = 0.0;
        let mut weight = 0.0;
        let mut targeted = 0;
        let mut target_distance = 0.0;

        for bird in &self.birds {
            centroid += bird.position;
            speed += bird.velocity.magnitude();
            weight += bird.formation_weight;
            if let Some(target) = bird.target_point {
                targeted += 1;
                target_distance += bird.position.distance(&target);
            }
        }

        let n = count as f32;
        FlockStats {
            count,
            centroid: centroid / n,
            mean_speed: speed / n,
            mean_formation_weight: weight / n,
            targeted,
            mean_target_distance: (targeted > 0).then(|| target_distance / targeted as f32),
        }
    }
}
