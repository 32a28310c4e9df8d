//! Native text rasterizer for murmuration formations.
//!
//! Glyphs come from the `embedded-graphics` ASCII mono fonts. Each font
//! pixel is drawn as a square block so the rendered height tracks the
//! requested pixel size.

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_9X18, FONT_9X18_BOLD},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::{Gray8, GrayColor},
    prelude::*,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use murmur_core::{Raster, RasterError, TextRasterizer, TextStyle};

/// Weights at or above this use the bold face.
const BOLD_WEIGHT: u32 = 600;

/// Rasterizes text with a built-in bitmap font. Needs no system fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoFontRasterizer;

impl MonoFontRasterizer {
    pub fn new() -> Self {
        Self
    }

    fn font_for(&self, weight: u32) -> &'static MonoFont<'static> {
        if weight >= BOLD_WEIGHT {
            &FONT_9X18_BOLD
        } else {
            &FONT_9X18
        }
    }

    /// Block size needed to draw `font` at roughly `size_px` tall.
    pub fn block_scale(font: &MonoFont<'_>, size_px: f32) -> usize {
        let glyph_height = font.character_size.height as f32;
        (size_px / glyph_height).round().max(1.0) as usize
    }
}

impl TextRasterizer for MonoFontRasterizer {
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

        let font = self.font_for(style.weight);
        let scale = Self::block_scale(font, style.size_px);
        let mut raster = Raster::new(width, height);

        let logical = Size::new((width / scale) as u32, (height / scale) as u32);
        if logical.width == 0 || logical.height == 0 {
            return Err(RasterError::InvalidCanvas { width, height });
        }

        let mut canvas = BlockCanvas {
            offset_x: (width - logical.width as usize * scale) / 2,
            offset_y: (height - logical.height as usize * scale) / 2,
            raster: &mut raster,
            scale,
            logical,
        };

        let character_style = MonoTextStyle::new(font, Gray8::WHITE);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        let center = Point::new(logical.width as i32 / 2, logical.height as i32 / 2);

        Text::with_text_style(text, center, character_style, text_style).draw(&mut canvas)?;

        log::debug!(
            "Rasterized {:?} at {}px (block {}x{})",
            text,
            style.size_px,
            scale,
            scale
        );
        Ok(raster)
    }
}

/// Draw target that upsamples each logical pixel to a `scale` x `scale` block.
struct BlockCanvas<'a> {
    raster: &'a mut Raster,
    scale: usize,
    offset_x: usize,
    offset_y: usize,
    logical: Size,
}

impl DrawTarget for BlockCanvas<'_> {
    type Color = Gray8;
    type Error = RasterError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0
                || point.y < 0
                || point.x as u32 >= self.logical.width
                || point.y as u32 >= self.logical.height
            {
                continue;
            }

            let x0 = self.offset_x + point.x as usize * self.scale;
            let y0 = self.offset_y + point.y as usize * self.scale;
            for dy in 0..self.scale {
                for dx in 0..self.scale {
                    self.raster.set(x0 + dx, y0 + dy, color.luma());
                }
            }
        }
        Ok(())
    }
}

impl OriginDimensions for BlockCanvas<'_> {
    fn size(&self) -> Size {
        self.logical
    }
}
