//! Bold panel labels drawn with a bitmap font.
//!
//! Glyphs come from `embedded-graphics` and are blitted, scaled by an integer
//! factor, onto the same plotters drawing area as the panels.

use embedded_graphics::mono_font::ascii::FONT_9X18_BOLD;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};
use plotters::coord::Shift;
use plotters::drawing::DrawingArea;
use plotters::prelude::DrawingBackend;
use plotters::style::RGBColor;

use crate::layout::{PixelRect, points_to_px};

const LABEL_FONT: &MonoFont<'static> = &FONT_9X18_BOLD;
const LABEL_POINTS: f64 = 12.0;

#[derive(Debug, thiserror::Error)]
#[error("label drawing failed: {0}")]
pub struct LabelError(String);

/// Integer glyph magnification that brings the font closest to 12pt.
pub fn label_scale(dpi: u32) -> u32 {
    let glyph_h = LABEL_FONT.character_size.height as f64;
    (points_to_px(LABEL_POINTS, dpi) / glyph_h).round().max(1.0) as u32
}

/// Rendered size of `text` in pixels at the given scale.
pub fn label_size(text: &str, scale: u32) -> (u32, u32) {
    let style = MonoTextStyle::new(LABEL_FONT, Rgb888::BLACK);
    let metrics = style.measure_string(text, Point::zero(), Baseline::Top);
    let size = metrics.bounding_box.size;
    (size.width * scale, size.height * scale)
}

/// Draws `text` in black with its top-left corner at `rect`'s origin.
pub fn draw_label<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    text: &str,
    rect: PixelRect,
    scale: u32,
) -> Result<(), LabelError> {
    let mut canvas = LabelCanvas {
        area,
        origin: (rect.x, rect.y),
        scale: scale.max(1),
    };
    let style = MonoTextStyle::new(LABEL_FONT, Rgb888::BLACK);
    Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut canvas)?;
    Ok(())
}

/// `DrawTarget` view of a plotters drawing area, offset and magnified.
struct LabelCanvas<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
    origin: (i32, i32),
    scale: u32,
}

/// Glyph-space room left between `origin` and the far edges of the area.
impl<DB: DrawingBackend> OriginDimensions for LabelCanvas<'_, DB> {
    fn size(&self) -> Size {
        let (w, h) = self.area.dim_in_pixel();
        let room = |extent: u32, start: i32| (extent as i64 - start as i64).max(0) as u32;
        Size::new(
            room(w, self.origin.0) / self.scale,
            room(h, self.origin.1) / self.scale,
        )
    }
}

impl<DB: DrawingBackend> DrawTarget for LabelCanvas<'_, DB> {
    type Color = Rgb888;
    type Error = LabelError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = self.area.dim_in_pixel();
        let s = self.scale as i32;
        for Pixel(point, color) in pixels {
            let rgb = RGBColor(color.r(), color.g(), color.b());
            let x0 = self.origin.0 + point.x * s;
            let y0 = self.origin.1 + point.y * s;
            for y in y0..y0 + s {
                for x in x0..x0 + s {
                    if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
                        continue;
                    }
                    self.area
                        .draw_pixel((x, y), &rgb)
                        .map_err(|e| LabelError(e.to_string()))?;
                }
            }
        }
        Ok(())
    }
}
