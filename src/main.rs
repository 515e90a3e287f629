//! Cromatui — color-matching elimination puzzle in the terminal.

mod app;
mod game;
mod highscores;
mod input;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::Parser;

/// Options derived from CLI that define the board and the elimination rule.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rows: u16,
    pub cols: u16,
    /// Cell size in terminal cells; also the unit of the carried cell
    /// positions/dimensions.
    pub cell_width: u16,
    pub cell_height: u16,
    /// Normalized color tolerance on a 0–1 scale.
    pub tolerance: f32,
    /// Fixed RNG seed for reproducible boards (None = OS entropy).
    pub seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref()).unwrap_or_default();
    let config = GameConfig {
        rows: args.rows.max(1),
        cols: args.cols.max(1),
        cell_width: args.cell_width.max(1),
        cell_height: args.cell_height.max(1),
        tolerance: args.tolerance,
        seed: args.seed,
    };
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Color-matching elimination puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "cromatui",
    version,
    about = "Color-matching elimination puzzle in the terminal. Click a cell to wipe out every cell of a similar color; each attempt costs more.",
    long_about = "Cromatui fills a grid with randomly colored cells. Selecting a live cell \
        eliminates it together with every other cell whose color is within the tolerance \
        distance, anywhere on the board. Each attempt scores the number of removed cells \
        minus the attempt number, so big sweeps early are worth the most. Clear the board \
        to finish; R deals a fresh one.\n\n\
        CONTROLS:\n  Mouse click   Select cell   Arrows / hjkl  Move cursor\n  Enter/Space   Select at cursor   R  Restart   Q / Esc  Quit\n\n\
        Use --theme to load a btop-style theme for the UI chrome; cell colors are always random."
)]
pub struct Args {
    /// Grid rows.
    #[arg(long, default_value = "6", value_name = "N")]
    pub rows: u16,

    /// Grid columns.
    #[arg(long, default_value = "8", value_name = "N")]
    pub cols: u16,

    /// Cell width in terminal cells.
    #[arg(long, default_value = "6", value_name = "W")]
    pub cell_width: u16,

    /// Cell height in terminal cells.
    #[arg(long, default_value = "3", value_name = "H")]
    pub cell_height: u16,

    /// Color tolerance on a 0-1 scale: cells within this normalized distance
    /// of the selected color are eliminated together. 1 or more clears the
    /// whole board in one click.
    #[arg(short, long, default_value = "0.2", value_name = "T")]
    pub tolerance: f32,

    /// RNG seed for a reproducible board.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]="value"). Uses One Dark if not set.
    #[arg(long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Disable the elimination fade animation.
    #[arg(long)]
    pub no_animation: bool,
}
