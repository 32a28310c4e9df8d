//! Flocking engine for a murmuration of birds that can morph into text.
//!
//! Birds steer with separation, alignment and cohesion, stay inside a soft
//! boundary sphere above a horizon and away from the camera, drift with the
//! wind, and in formation mode seek target points sampled from rasterized
//! text or procedural shapes.

pub mod assign;
pub mod bird;
pub mod flock;
pub mod sampler;
pub mod shapes;
pub mod vector;

pub use assign::{assign_targets, clear_targets};
pub use bird::{behavior, Bird, TrailSnapshot};
pub use flock::{regenerate_population, tick, FlockStats, FormationSource, Murmuration};
pub use sampler::{
    points_from_raster, sample_text_points, try_sample_text_points, Raster, RasterError,
    TextRasterizer, TextStyle, CANVAS_HEIGHT, CANVAS_WIDTH,
};
pub use shapes::ShapeKind;
pub use vector::Vector3D;

pub use murmur_shared::{AgentFrame, PresetLibrary, SimulationParams, TextModeParams};
