pub mod color;
pub mod config;
pub mod grid;
pub mod label;
pub mod layout;
pub mod render;

pub use config::{DEFAULT_BACKGROUND, DEFAULT_DPI, PANEL_LABELS, RenderConfig};
pub use grid::{Grid, GridError, load_grid};
pub use render::{Composite, MemeReport, PanelReport, RenderError, compose_meme, render_meme};
