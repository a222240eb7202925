//! Pixel geometry of the composite figure.
//!
//! Distances are specified in points (1/72 inch) and converted with the target
//! dpi, so the figure keeps its proportions at every resolution.

use serde::Serialize;

use crate::config::FIGURE_INCHES;

const OUTER_PAD_PT: f64 = 20.0;
const PANEL_GAP_PT: f64 = 20.0;
const TITLE_PAD_PT: f64 = 10.0;
const VERTICAL_PAD_PT: f64 = 5.0;
const BORDER_PT: f64 = 1.0;
const CROP_PAD_INCHES: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("figure has no panels")]
    NoPanels,

    #[error("panels do not fit the figure at {dpi} dpi")]
    NoRoom { dpi: u32 },

    #[error("canvas of {width}x{height} pixels is too large")]
    CanvasTooLarge { width: u64, height: u64 },
}

/// Axis-aligned pixel rectangle; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn union(&self, other: &PixelRect) -> PixelRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        PixelRect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }

    pub fn inflate(&self, by: u32) -> PixelRect {
        let by_i = by as i32;
        PixelRect::new(
            self.x - by_i,
            self.y - by_i,
            self.width + 2 * by,
            self.height + 2 * by,
        )
    }

    pub fn clamp_to(&self, width: u32, height: u32) -> PixelRect {
        let x = self.x.clamp(0, width as i32);
        let y = self.y.clamp(0, height as i32);
        let right = self.right().clamp(x, width as i32);
        let bottom = self.bottom().clamp(y, height as i32);
        PixelRect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }

    pub fn translate(&self, dx: i32, dy: i32) -> PixelRect {
        PixelRect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// What the layout needs to know about one panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelSpec {
    /// Grid shape as `(rows, cols)`.
    pub shape: (usize, usize),
    /// Rendered label size in pixels, `(width, height)`.
    pub label_size: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelGeometry {
    pub image: PixelRect,
    /// Image rect grown by the border width.
    pub frame: PixelRect,
    pub label: PixelRect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureLayout {
    pub dpi: u32,
    pub canvas: (u32, u32),
    pub border: u32,
    pub panels: Vec<PanelGeometry>,
    /// Tight bounding box of everything drawn, plus a small margin.
    pub crop: PixelRect,
}

pub fn points_to_px(points: f64, dpi: u32) -> f64 {
    points * dpi as f64 / 72.0
}

/// Border width: one point, never thinner than a pixel.
pub fn border_px(dpi: u32) -> u32 {
    points_to_px(BORDER_PT, dpi).round().max(1.0) as u32
}

impl FigureLayout {
    pub fn compute(dpi: u32, panels: &[PanelSpec]) -> Result<Self, LayoutError> {
        if panels.is_empty() {
            return Err(LayoutError::NoPanels);
        }

        let width = FIGURE_INCHES.0 as u64 * dpi as u64;
        let height = FIGURE_INCHES.1 as u64 * dpi as u64;
        let too_large = LayoutError::CanvasTooLarge { width, height };
        let canvas_w = u32::try_from(width).map_err(|_| too_large.clone())?;
        let canvas_h = u32::try_from(height).map_err(|_| too_large.clone())?;
        (canvas_w as usize)
            .checked_mul(canvas_h as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or(too_large)?;

        let n = panels.len() as f64;
        let outer = points_to_px(OUTER_PAD_PT, dpi);
        let gap = points_to_px(PANEL_GAP_PT, dpi);
        let title_pad = points_to_px(TITLE_PAD_PT, dpi);
        let label_h = panels.iter().map(|p| p.label_size.1).max().unwrap_or(0) as f64;
        let border = border_px(dpi);

        let cell_w = (canvas_w as f64 - 2.0 * outer - (n - 1.0) * gap) / n;
        let area_top = outer + points_to_px(VERTICAL_PAD_PT, dpi) + label_h + title_pad;
        let area_h = canvas_h as f64 - area_top - outer;
        if cell_w < 1.0 || area_h < 1.0 {
            return Err(LayoutError::NoRoom { dpi });
        }

        let mut geometry = Vec::with_capacity(panels.len());
        for (i, panel) in panels.iter().enumerate() {
            let (rows, cols) = panel.shape;
            let rows = rows.max(1) as f64;
            let cols = cols.max(1) as f64;

            // Square samples: one scale for both axes.
            let scale = (cell_w / cols).min(area_h / rows);
            let img_w = (cols * scale).round().clamp(1.0, cell_w.floor().max(1.0));
            let img_h = (rows * scale).round().clamp(1.0, area_h.floor().max(1.0));

            let cell_x = outer + i as f64 * (cell_w + gap);
            let img_x = (cell_x + (cell_w - img_w) / 2.0).round() as i32;
            let img_y = (area_top + (area_h - img_h) / 2.0).round() as i32;
            let image = PixelRect::new(img_x, img_y, img_w as u32, img_h as u32);

            let (label_w, label_h) = panel.label_size;
            let label_x = img_x + image.width as i32 / 2 - label_w as i32 / 2;
            let label_y = img_y - border as i32 - title_pad.round() as i32 - label_h as i32;
            let label = PixelRect::new(label_x, label_y, label_w, label_h);

            geometry.push(PanelGeometry {
                image,
                frame: image.inflate(border),
                label,
            });
        }

        let labels_fit = geometry.iter().all(|g| {
            g.label.x >= 0
                && g.label.y >= 0
                && g.label.right() <= canvas_w as i32
                && g.label.bottom() <= canvas_h as i32
        }) && geometry
            .windows(2)
            .all(|pair| pair[0].label.right() <= pair[1].label.x);
        if !labels_fit {
            return Err(LayoutError::NoRoom { dpi });
        }

        let content = geometry
            .iter()
            .map(|g| g.frame.union(&g.label))
            .reduce(|acc, r| acc.union(&r))
            .ok_or(LayoutError::NoPanels)?;
        let margin = (CROP_PAD_INCHES * dpi as f64).round() as u32;
        let crop = content.inflate(margin).clamp_to(canvas_w, canvas_h);

        log::debug!(
            "layout at {dpi} dpi: canvas {canvas_w}x{canvas_h}, crop {}x{} at ({}, {})",
            crop.width,
            crop.height,
            crop.x,
            crop.y
        );

        Ok(Self {
            dpi,
            canvas: (canvas_w, canvas_h),
            border,
            panels: geometry,
            crop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_DPI, MIN_DPI, PANEL_LABELS};
    use crate::label::{label_scale, label_size};

    fn square_panels(n: usize) -> Vec<PanelSpec> {
        (0..n)
            .map(|_| PanelSpec {
                shape: (10, 10),
                label_size: (90, 18),
            })
            .collect()
    }

    #[test]
    fn canvas_scales_with_dpi() {
        let layout = FigureLayout::compute(150, &square_panels(4)).unwrap();
        assert_eq!(layout.canvas, (2400, 600));
        assert_eq!(layout.border, 2);

        let layout = FigureLayout::compute(72, &square_panels(4)).unwrap();
        assert_eq!(layout.canvas, (1152, 288));
        assert_eq!(layout.border, 1);
    }

    #[test]
    fn panels_run_left_to_right_without_overlap() {
        let layout = FigureLayout::compute(150, &square_panels(4)).unwrap();
        assert_eq!(layout.panels.len(), 4);
        for pair in layout.panels.windows(2) {
            assert!(pair[0].frame.right() < pair[1].frame.x);
            assert!(pair[0].label.right() <= pair[1].label.x);
        }
        for panel in &layout.panels {
            assert_eq!(panel.image.width, panel.image.height);
            assert!(panel.label.bottom() < panel.frame.y);
            let label_center = panel.label.x + panel.label.width as i32 / 2;
            let image_center = panel.image.x + panel.image.width as i32 / 2;
            assert!((label_center - image_center).abs() <= 1);
        }
    }

    #[test]
    fn mismatched_shapes_keep_their_own_aspect() {
        let mut panels = square_panels(4);
        panels[1].shape = (10, 20);
        panels[2].shape = (40, 10);
        let layout = FigureLayout::compute(150, &panels).unwrap();

        let wide = layout.panels[1].image;
        assert!((wide.width as i32 - 2 * wide.height as i32).abs() <= 2);
        let tall = layout.panels[2].image;
        assert!((tall.height as i32 - 4 * tall.width as i32).abs() <= 2);
    }

    #[test]
    fn crop_hugs_content_inside_canvas() {
        let layout = FigureLayout::compute(150, &square_panels(4)).unwrap();
        let crop = layout.crop;
        assert!(crop.x >= 0 && crop.y >= 0);
        assert!(crop.right() <= 2400 && crop.bottom() <= 600);
        assert!(crop.width < 2400);
        for panel in &layout.panels {
            assert!(crop.contains(panel.frame.x, panel.label.y));
            assert!(crop.contains(panel.frame.right() - 1, panel.frame.bottom() - 1));
        }
    }

    #[test]
    fn tiny_dpi_has_no_room() {
        assert_eq!(
            FigureLayout::compute(4, &square_panels(4)),
            Err(LayoutError::NoRoom { dpi: 4 })
        );
        assert_eq!(FigureLayout::compute(150, &[]), Err(LayoutError::NoPanels));
    }

    fn labelled_panels(dpi: u32) -> Vec<PanelSpec> {
        let scale = label_scale(dpi);
        PANEL_LABELS
            .iter()
            .map(|label| PanelSpec {
                shape: (10, 10),
                label_size: label_size(label, scale),
            })
            .collect()
    }

    #[test]
    fn overlapping_labels_have_no_room() {
        assert_eq!(
            FigureLayout::compute(16, &labelled_panels(16)),
            Err(LayoutError::NoRoom { dpi: 16 })
        );
        assert_eq!(
            FigureLayout::compute(MIN_DPI - 1, &labelled_panels(MIN_DPI - 1)),
            Err(LayoutError::NoRoom { dpi: MIN_DPI - 1 })
        );
    }

    #[test]
    fn labels_fit_across_the_accepted_dpi_range() {
        for dpi in MIN_DPI..=MAX_DPI {
            let layout = FigureLayout::compute(dpi, &labelled_panels(dpi))
                .unwrap_or_else(|e| panic!("dpi {dpi}: {e}"));
            for pair in layout.panels.windows(2) {
                assert!(
                    pair[0].label.right() <= pair[1].label.x,
                    "dpi {dpi}: labels overlap"
                );
            }
            for panel in &layout.panels {
                let label = panel.label;
                assert!(
                    layout.crop.contains(label.x, label.y)
                        && layout.crop.contains(label.right() - 1, label.bottom() - 1),
                    "dpi {dpi}: label {label:?} outside crop {:?}",
                    layout.crop
                );
            }
        }
    }

    #[test]
    fn rect_helpers() {
        let a = PixelRect::new(10, 10, 5, 5);
        let b = PixelRect::new(0, 12, 2, 10);
        assert_eq!(a.union(&b), PixelRect::new(0, 10, 15, 12));
        assert_eq!(a.inflate(2), PixelRect::new(8, 8, 9, 9));
        assert_eq!(
            PixelRect::new(-5, -5, 20, 20).clamp_to(10, 8),
            PixelRect::new(0, 0, 10, 8)
        );
        assert!(a.contains(14, 14));
        assert!(!a.contains(15, 14));
    }
}
