use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageFormat, RgbImage, imageops};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;

use crate::color::{ColorError, parse_color};
use crate::config::{MAX_DPI, MIN_DPI, PANEL_LABELS, RenderConfig};
use crate::grid::{Grid, gray_level};
use crate::label::{LabelError, draw_label, label_scale, label_size};
use crate::layout::{FigureLayout, LayoutError, PanelSpec, PixelRect};

/// Errors that can occur while composing or exporting the figure.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("resolution must be between {min} and {max} dpi, got {dpi}")]
    InvalidResolution { dpi: u32, min: u32, max: u32 },

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Label(#[from] LabelError),

    #[error("drawing failed: {0}")]
    Drawing(String),

    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where one panel ended up, in output pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelReport {
    pub label: &'static str,
    pub rows: usize,
    pub cols: usize,
    pub image: PixelRect,
    pub frame: PixelRect,
    pub label_box: PixelRect,
}

/// Summary of a written figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemeReport {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
    pub background: String,
    pub panels: Vec<PanelReport>,
}

/// The cropped figure, before export.
#[derive(Debug, Clone)]
pub struct Composite {
    pub image: RgbImage,
    pub panels: Vec<PanelReport>,
}

fn drawing_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// Composes the four panels in memory and crops to the drawn content.
///
/// Grids bind to [`PANEL_LABELS`] by position. Grids of different shapes are
/// each fit to their own cell.
pub fn compose_meme(
    panels: [&Grid; 4],
    dpi: u32,
    background: &str,
) -> Result<Composite, RenderError> {
    if !(MIN_DPI..=MAX_DPI).contains(&dpi) {
        return Err(RenderError::InvalidResolution {
            dpi,
            min: MIN_DPI,
            max: MAX_DPI,
        });
    }
    let bg = parse_color(background)?;

    let scale = label_scale(dpi);
    let specs: Vec<PanelSpec> = panels
        .iter()
        .zip(PANEL_LABELS)
        .map(|(grid, label)| PanelSpec {
            shape: grid.shape(),
            label_size: label_size(label, scale),
        })
        .collect();

    if panels.iter().any(|g| g.shape() != panels[0].shape()) {
        log::debug!(
            "panel shapes differ ({:?}); each panel is scaled to its own cell",
            panels.iter().map(|g| g.shape()).collect::<Vec<_>>()
        );
    }

    let layout = FigureLayout::compute(dpi, &specs)?;
    let (width, height) = layout.canvas;
    let mut rgb = vec![0u8; width as usize * height as usize * 3];

    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        root.fill(&bg).map_err(drawing_err)?;

        for ((grid, label), geometry) in panels.iter().zip(PANEL_LABELS).zip(&layout.panels) {
            draw_grid(&root, grid, geometry.image, bg)?;
            draw_frame(&root, geometry.image, layout.border)?;
            draw_label(&root, label, geometry.label, scale)?;
        }

        root.present().map_err(drawing_err)?;
    }

    let canvas = RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| RenderError::Drawing("surface buffer does not match canvas".to_string()))?;
    let crop = layout.crop;
    let image = imageops::crop_imm(&canvas, crop.x as u32, crop.y as u32, crop.width, crop.height)
        .to_image();

    let reports = panels
        .iter()
        .zip(PANEL_LABELS)
        .zip(&layout.panels)
        .map(|((grid, label), geometry)| PanelReport {
            label,
            rows: grid.height(),
            cols: grid.width(),
            image: geometry.image.translate(-crop.x, -crop.y),
            frame: geometry.frame.translate(-crop.x, -crop.y),
            label_box: geometry.label.translate(-crop.x, -crop.y),
        })
        .collect();

    Ok(Composite {
        image,
        panels: reports,
    })
}

/// Renders the four-panel figure and writes it as a PNG to
/// `config.output_path`, replacing any existing file.
///
/// The PNG is fully encoded before the file is opened, so a failed encode
/// leaves nothing on disk.
pub fn render_meme(panels: [&Grid; 4], config: &RenderConfig) -> Result<MemeReport, RenderError> {
    let composite = compose_meme(panels, config.dpi, &config.background)?;

    let mut bytes = Vec::new();
    composite
        .image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

    fs::write(&config.output_path, &bytes).map_err(|source| RenderError::Io {
        path: config.output_path.clone(),
        source,
    })?;

    let (width, height) = composite.image.dimensions();
    log::debug!(
        "wrote {} ({width}x{height}, {} bytes)",
        config.output_path.display(),
        bytes.len()
    );

    Ok(MemeReport {
        output: config.output_path.clone(),
        width,
        height,
        dpi: config.dpi,
        background: config.background.clone(),
        panels: composite.panels,
    })
}

/// Nearest-neighbour blit of `grid` into `rect` on the fixed [0, 1] gray ramp.
fn draw_grid<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    grid: &Grid,
    rect: PixelRect,
    background: RGBColor,
) -> Result<(), RenderError> {
    let source_index = |dst: u32, dst_len: u32, src_len: usize| -> usize {
        let pos = (dst as f64 + 0.5) * src_len as f64 / dst_len as f64;
        (pos as usize).min(src_len - 1)
    };
    let columns: Vec<usize> = (0..rect.width)
        .map(|px| source_index(px, rect.width, grid.width()))
        .collect();

    let samples = grid.samples();
    for py in 0..rect.height {
        let row = source_index(py, rect.height, grid.height()) * grid.width();
        for (px, &col) in columns.iter().enumerate() {
            let color = match gray_level(samples[row + col]) {
                Some(v) => RGBColor(v, v, v),
                None => background,
            };
            area.draw_pixel((rect.x + px as i32, rect.y + py as i32), &color)
                .map_err(drawing_err)?;
        }
    }
    Ok(())
}

/// Solid black border, `width` pixels thick, just outside `rect`.
fn draw_frame<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    rect: PixelRect,
    width: u32,
) -> Result<(), RenderError> {
    for ring in 1..=width {
        let r = rect.inflate(ring);
        area.draw(&Rectangle::new(
            [(r.x, r.y), (r.right() - 1, r.bottom() - 1)],
            BLACK.stroke_width(1),
        ))
        .map_err(drawing_err)?;
    }
    Ok(())
}
