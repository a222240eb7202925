use std::path::PathBuf;

pub const DEFAULT_DPI: u32 = 150;
pub const DEFAULT_BACKGROUND: &str = "white";

/// Smallest resolution at which the unscaled label font fits side by side
/// without labels touching each other or the canvas edge.
pub const MIN_DPI: u32 = 28;
pub const MAX_DPI: u32 = 1200;

/// Panel labels, left to right. Input grids bind to these by position.
pub const PANEL_LABELS: [&str; 4] = ["Reality", "Your Model", "Selection Bias", "Estimate"];

/// Figure size in inches, width x height.
pub const FIGURE_INCHES: (u32, u32) = (16, 4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub output_path: PathBuf,
    pub dpi: u32,
    pub background: String,
}

impl RenderConfig {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            dpi: DEFAULT_DPI,
            background: DEFAULT_BACKGROUND.to_string(),
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }
}
