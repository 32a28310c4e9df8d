//! Text to target-point sampling.
//!
//! Text is drawn by a host-supplied [`TextRasterizer`] onto a fixed-size
//! luminance canvas. Bright pixels inside the glyph bounding box are sampled
//! on a regular grid and mapped into world space around the origin.

use std::fmt;

use murmur_shared::TextModeParams;

use crate::vector::Vector3D;

pub const CANVAS_WIDTH: usize = 1024;
pub const CANVAS_HEIGHT: usize = 512;

/// Luminance above which a pixel belongs to a glyph.
pub const ON_THRESHOLD: u8 = 200;

/// Pixels added around the glyph bounding box.
const PADDING: usize = 10;

/// Canvas pixels per unit of `font_size`.
const FONT_PIXELS_PER_UNIT: f32 = 10.0;

/// Errors a rasterizer can report.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterError {
    /// The drawing backend could not be obtained or failed to draw.
    Unavailable(String),
    /// Buffer size does not match the requested canvas.
    InvalidCanvas { width: usize, height: usize },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::Unavailable(msg) => write!(f, "Text rasterizer unavailable: {}", msg),
            RasterError::InvalidCanvas { width, height } => {
                write!(f, "Raster buffer does not match a {}x{} canvas", width, height)
            }
        }
    }
}

impl std::error::Error for RasterError {}

/// A grayscale canvas, row-major, one byte per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    luma: Vec<u8>,
}

impl Raster {
    /// Black canvas.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            luma: vec![0; width * height],
        }
    }

    /// Builds a raster from RGBA bytes (4 bytes per pixel), keeping the red
    /// channel. White-on-black text has equal channels.
    pub fn from_rgba(width: usize, height: usize, data: &[u8]) -> Result<Self, RasterError> {
        if data.len() < width * height * 4 {
            return Err(RasterError::InvalidCanvas { width, height });
        }
        let luma = data.chunks_exact(4).take(width * height).map(|px| px[0]).collect();
        Ok(Self {
            width,
            height,
            luma,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn luma(&self, x: usize, y: usize) -> u8 {
        self.luma[y * self.width + x]
    }

    /// Writes a pixel, ignoring coordinates outside the canvas.
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.luma[y * self.width + x] = value;
        }
    }

    pub fn is_on(&self, x: usize, y: usize) -> bool {
        self.luma(x, y) > ON_THRESHOLD
    }

    /// Tight bounding box of all on pixels.
    pub fn on_bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.is_on(x, y) {
                    continue;
                }
                let b = bounds.get_or_insert(Bounds {
                    min_x: x,
                    max_x: x,
                    min_y: y,
                    max_y: y,
                });
                b.min_x = b.min_x.min(x);
                b.max_x = b.max_x.max(x);
                b.min_y = b.min_y.min(y);
                b.max_y = b.max_y.max(y);
            }
        }
        bounds
    }
}

/// Inclusive pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: usize,
    pub max_x: usize,
    pub min_y: usize,
    pub max_y: usize,
}

impl Bounds {
    /// Grows by `padding` on every side, clamped to a `width` x `height` canvas.
    pub fn padded(&self, padding: usize, width: usize, height: usize) -> Self {
        Self {
            min_x: self.min_x.saturating_sub(padding),
            max_x: (self.max_x + padding).min(width.saturating_sub(1)),
            min_y: self.min_y.saturating_sub(padding),
            max_y: (self.max_y + padding).min(height.saturating_sub(1)),
        }
    }

    pub fn width(&self) -> usize {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> usize {
        self.max_y - self.min_y
    }
}

/// Font request passed to a rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Glyph height in canvas pixels.
    pub size_px: f32,
    /// CSS-style weight, 100-900.
    pub weight: u32,
}

impl TextStyle {
    pub fn from_params(params: &TextModeParams) -> Self {
        Self {
            size_px: params.font_size * FONT_PIXELS_PER_UNIT,
            weight: params.font_weight,
        }
    }
}

/// Host capability that draws text into a luminance raster.
///
/// Implementations draw `text` in white on a black `width` x `height`
/// canvas, centered horizontally and vertically.
pub trait TextRasterizer {
    fn rasterize(
        &self,
        text: &str,
        style: &TextStyle,
        width: usize,
        height: usize,
    ) -> Result<Raster, RasterError>;
}

/// Grid spacing in pixels for a given density.
pub fn grid_step(density: f32) -> usize {
    (4.0 / density).floor().max(1.0) as usize
}

/// Samples up to `max_points` world-space targets from `text`.
///
/// Rasterizer failures are logged and produce no points, which leaves the
/// flock without formation targets.
pub fn sample_text_points(
    rasterizer: &dyn TextRasterizer,
    text: &str,
    params: &TextModeParams,
    max_points: usize,
) -> Vec<Vector3D> {
    match try_sample_text_points(rasterizer, text, params, max_points) {
        Ok(points) => points,
        Err(e) => {
            log::warn!("Failed to rasterize {:?}: {}", text, e);
            Vec::new()
        }
    }
}

pub fn try_sample_text_points(
    rasterizer: &dyn TextRasterizer,
    text: &str,
    params: &TextModeParams,
    max_points: usize,
) -> Result<Vec<Vector3D>, RasterError> {
    if text.is_empty() || max_points == 0 {
        return Ok(Vec::new());
    }

    let style = TextStyle::from_params(params);
    let raster = rasterizer.rasterize(text, &style, CANVAS_WIDTH, CANVAS_HEIGHT)?;
    let points = points_from_raster(&raster, params, max_points);
    log::debug!(
        "Sampled {} points for {:?} (max {})",
        points.len(),
        text,
        max_points
    );
    Ok(points)
}

/// Samples an already rasterized glyph image.
///
/// When fewer than half of `max_points` are found the grid is densified by
/// 1.5x and the raster rescanned, until the step reaches one pixel.
pub fn points_from_raster(
    raster: &Raster,
    params: &TextModeParams,
    max_points: usize,
) -> Vec<Vector3D> {
    if max_points == 0 {
        return Vec::new();
    }
    let Some(bounds) = raster.on_bounds() else {
        return Vec::new();
    };
    let bounds = bounds.padded(PADDING, raster.width(), raster.height());
    let mapping = WorldMapping::new(&bounds, params);

    let mut density = if params.formation_density > 0.0 {
        params.formation_density
    } else {
        1.0
    };

    loop {
        let step = grid_step(density);
        let candidates = grid_candidates(raster, &bounds, step);
        let selected = select_evenly(&candidates, max_points);

        if selected.len() * 2 < max_points && step > 1 {
            density *= 1.5;
            continue;
        }

        return selected
            .into_iter()
            .map(|(x, y)| mapping.to_world(x, y))
            .collect();
    }
}

/// On pixels inside `bounds` on a `step`-spaced grid, row-major.
pub fn grid_candidates(raster: &Raster, bounds: &Bounds, step: usize) -> Vec<(usize, usize)> {
    let mut candidates = Vec::new();
    for y in (bounds.min_y..=bounds.max_y).step_by(step) {
        for x in (bounds.min_x..=bounds.max_x).step_by(step) {
            if raster.is_on(x, y) {
                candidates.push((x, y));
            }
        }
    }
    candidates
}

/// Evenly spaced subsequence of at most `count` items.
pub fn select_evenly<T: Copy>(items: &[T], count: usize) -> Vec<T> {
    if items.len() <= count {
        return items.to_vec();
    }
    (0..count).map(|i| items[i * items.len() / count]).collect()
}

/// Canvas to world transform for one glyph bounding box.
struct WorldMapping {
    min_x: f32,
    min_y: f32,
    width: f32,
    height: f32,
    x_scale: f32,
    y_scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl WorldMapping {
    fn new(bounds: &Bounds, params: &TextModeParams) -> Self {
        let width = bounds.width().max(1) as f32;
        let height = bounds.height().max(1) as f32;

        // Small fonts are scaled up so the footprint stays comparable.
        let font_adjustment = if params.font_size > 0.0 {
            (5.0 / params.font_size).max(1.0)
        } else {
            1.0
        };
        let scale = 0.8 * font_adjustment;

        let aspect = width / height;
        let mut x_scale = 100.0 * scale;
        let mut y_scale = 60.0 * scale;
        if aspect > 1.0 {
            y_scale /= aspect.sqrt();
        } else {
            x_scale *= aspect.sqrt();
        }

        Self {
            min_x: bounds.min_x as f32,
            min_y: bounds.min_y as f32,
            width,
            height,
            x_scale,
            y_scale,
            offset_x: params.position_x,
            offset_y: params.position_y,
        }
    }

    fn to_world(&self, x: usize, y: usize) -> Vector3D {
        let nx = (x as f32 - self.min_x) / self.width * 2.0 - 1.0;
        let ny = 1.0 - (y as f32 - self.min_y) / self.height * 2.0;
        Vector3D::new(
            nx * self.x_scale + self.offset_x,
            ny * self.y_scale + self.offset_y,
            0.0,
        )
    }
}
