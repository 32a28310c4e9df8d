use murmur_core::{Raster, RasterError, TextRasterizer, TextStyle};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Draws text on an offscreen 2D canvas and reads the pixels back.
pub struct CanvasRasterizer {
    font_family: String,
}

impl CanvasRasterizer {
    pub fn new() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }

    pub fn with_font_family(mut self, family: &str) -> Self {
        self.font_family = family.to_string();
        self
    }

    pub fn css_font(&self, style: &TextStyle) -> String {
        format!("{} {}px {}", style.weight, style.size_px, self.font_family)
    }

    fn context(&self, width: usize, height: usize) -> Result<CanvasRenderingContext2d, RasterError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| RasterError::Unavailable("no document".to_string()))?;

        let canvas = document
            .create_element("canvas")
            .map_err(js_error)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RasterError::Unavailable("element is not a canvas".to_string()))?;
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or_else(|| RasterError::Unavailable("no 2d context".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RasterError::Unavailable("unexpected context type".to_string()))
    }
}

impl Default for CanvasRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRasterizer for CanvasRasterizer {
    fn rasterize(
        &self,
        text: &str,
        style: &TextStyle,
        width: usize,
        height: usize,
    ) -> Result<Raster, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidCanvas { width, height });
        }
        let context = self.context(width, height)?;
        let (w, h) = (width as f64, height as f64);

        context.set_fill_style_str("black");
        context.fill_rect(0.0, 0.0, w, h);

        context.set_font(&self.css_font(style));
        context.set_text_align("center");
        context.set_text_baseline("middle");
        context.set_fill_style_str("white");
        context.fill_text(text, w / 2.0, h / 2.0).map_err(js_error)?;

        let image = context.get_image_data(0.0, 0.0, w, h).map_err(js_error)?;
        Raster::from_rgba(width, height, &image.data().0)
    }
}

fn js_error(value: JsValue) -> RasterError {
    RasterError::Unavailable(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}
