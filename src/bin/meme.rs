use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

use stats_meme::{DEFAULT_BACKGROUND, DEFAULT_DPI, RenderConfig, load_grid, render_meme};

#[derive(Parser, Debug)]
#[command(
    name = "meme",
    about = "Render the four-panel Reality / Your Model / Selection Bias / Estimate figure",
    version
)]
struct Cli {
    /// "Reality" panel: an image file or a .json grid
    #[arg(long)]
    reality: PathBuf,

    /// "Your Model" panel
    #[arg(long)]
    model: PathBuf,

    /// "Selection Bias" panel
    #[arg(long = "selection-bias")]
    selection_bias: PathBuf,

    /// "Estimate" panel
    #[arg(long)]
    estimate: PathBuf,

    /// Output PNG path
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Resolution in dots per inch
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,

    /// Background color: a name, #rrggbb, a base letter or a gray level
    #[arg(long, default_value = DEFAULT_BACKGROUND)]
    background: String,

    /// Print a JSON report of the written figure
    #[arg(long)]
    report: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let reality = load_grid(&cli.reality)?;
    let model = load_grid(&cli.model)?;
    let selection_bias = load_grid(&cli.selection_bias)?;
    let estimate = load_grid(&cli.estimate)?;

    let config = RenderConfig::new(&cli.output)
        .with_dpi(cli.dpi)
        .with_background(cli.background);

    let report = render_meme([&reality, &model, &selection_bias, &estimate], &config)?;
    log::info!(
        "Saved {} ({}x{} at {} dpi)",
        report.output.display(),
        report.width,
        report.height,
        report.dpi
    );

    if cli.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
