use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use tracing_subscriber::EnvFilter;

use treescope::app::App;
use treescope::config::Config;

/// Terminal inspector for hierarchical object graphs.
#[derive(Debug, Parser)]
#[command(name = "treescope", version, about)]
struct Args {
    /// JSON document to inspect
    file: PathBuf,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Browse without expand/collapse input
    #[arg(long)]
    read_only: bool,

    /// Write logs to this file instead of the default location
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.log_file.as_deref()) {
        eprintln!("warning: logging disabled: {e:#}");
    }
    tracing::info!(file = %args.file.display(), "starting");

    let mut config = Config::load(args.config.as_deref());
    if args.read_only {
        config.view.interactive = false;
    }
    let mouse = config.view.mouse;

    let mut app = App::new(config, args.file)?;

    let mut terminal = ratatui::init();
    if mouse {
        let _ = execute!(std::io::stdout(), EnableMouseCapture);
    }

    let result = app.run(&mut terminal);

    if mouse {
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
    }
    ratatui::restore();
    result
}

/// Logs go to a file, never stdout: the terminal belongs to the UI.
fn init_tracing(explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match dirs::data_dir() {
            Some(dir) => dir.join("treescope").join("treescope.log"),
            None => return Ok(()),
        },
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("treescope=info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
