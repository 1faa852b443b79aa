mod app;
mod demo;
mod input;
mod render;
mod runtime;
mod terminal;
mod theme;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use keylayer_core::config::KeylayerConfig;
use keylayer_core::tracing_setup::init_tracing;

use crate::app::App;
use crate::runtime::run_app;

#[derive(Parser, Debug)]
#[command(name = "keylayer-tui", about = "Layered hotkey demo for the terminal")]
struct Args {
    /// Path to a JSON config file (defaults to <config dir>/keylayer/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with the "keep playing after a win" preference on
    #[arg(long)]
    continue_past_win: bool,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("keylayer").join("config.json"))
}

fn load_config(args: &Args) -> Result<KeylayerConfig> {
    let mut config = match &args.config {
        Some(path) => KeylayerConfig::load(path)?,
        None => match default_config_path() {
            Some(path) => KeylayerConfig::load_or_default(&path)?,
            None => KeylayerConfig::default(),
        },
    };
    if args.continue_past_win {
        config.continue_past_win = true;
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_tracing(&config).context("Failed to initialize logging")?;

    // Set up panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        eprintln!("\n\n=== PANIC ===");
        eprintln!("{}", panic_info);
        eprintln!("=============\n");
        original_hook(panic_info);
    }));

    let mut app = App::new(config.continue_past_win, config.panel_columns)?;
    let mut terminal = terminal::init()?;

    let result = run_app(&mut terminal, &mut app).await;

    terminal::restore()?;

    if let Err(err) = result {
        eprintln!("Error: {err}");
    }

    Ok(())
}
