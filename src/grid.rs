use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;

/// Errors raised while building a [`Grid`] from raw samples or files.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("grid must have at least one row and one column")]
    Empty,

    #[error("row {row} has {found} samples, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{found} samples do not fill a {width}x{height} grid")]
    LengthMismatch {
        width: usize,
        height: usize,
        found: usize,
    },

    #[error("invalid grid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A rectangular, row-major grid of grayscale samples.
///
/// Samples are nominally in `[0, 1]`. Out-of-range values are kept as given and
/// only clipped when drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl Grid {
    pub fn from_vec(width: usize, height: usize, samples: Vec<f32>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        let expected = width
            .checked_mul(height)
            .ok_or(GridError::LengthMismatch {
                width,
                height,
                found: samples.len(),
            })?;
        if samples.len() != expected {
            return Err(GridError::LengthMismatch {
                width,
                height,
                found: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Builds a grid from nested rows, the layout of `ndarray.tolist()`.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut samples = Vec::with_capacity(width * height);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
            samples.extend(values);
        }

        Self::from_vec(width, height, samples)
    }

    pub fn filled(width: usize, height: usize, value: f32) -> Result<Self, GridError> {
        let len = width
            .checked_mul(height)
            .ok_or(GridError::LengthMismatch {
                width,
                height,
                found: 0,
            })?;
        Self::from_vec(width, height, vec![value; len])
    }

    pub fn from_luma(image: &GrayImage) -> Result<Self, GridError> {
        let (w, h) = image.dimensions();
        let samples = image.pixels().map(|p| p[0] as f32 / 255.0).collect();
        Self::from_vec(w as usize, h as usize, samples)
    }

    pub fn from_json_str(json: &str) -> Result<Self, GridError> {
        let rows: Vec<Vec<f32>> = serde_json::from_str(json)?;
        Self::from_rows(rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(rows, cols)`, matching the usual array shape order.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y * self.width + x).copied()
    }
}

/// Maps a sample onto the fixed `[0, 1]` gray ramp. NaN is masked.
pub fn gray_level(value: f32) -> Option<u8> {
    if value.is_nan() {
        return None;
    }
    Some((value.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Loads a grid from disk: `.json` files hold nested arrays, anything else is
/// decoded as an image and converted to luma.
pub fn load_grid(path: &Path) -> Result<Grid, GridError> {
    let is_json = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let text = fs::read_to_string(path).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        return Grid::from_json_str(&text);
    }

    let img = image::open(path).map_err(|source| GridError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Grid::from_luma(&img.to_luma8())
}
