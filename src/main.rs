// kv: kiosk viewer. Full-screen gallery of one still per folder; Enter plays the
// folder's movie in an external player, Up/Down browse, Escape quits.
// Usage: kv [--settings PATH] [scan]

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_HASH: &str = env!("GIT_HASH");

mod catalog;
mod cli;
mod cursor;
mod display;
mod error;
mod launcher;
mod navigator;
mod render;
mod settings;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use catalog::Catalog;
use display::SdlDisplay;
use error::StartupError;
use launcher::SystemRunner;
use navigator::Navigator;
use settings::{DisplayConfig, Settings};

#[derive(Parser, Debug)]
#[command(name = "kv", about = "Kiosk viewer — picture gallery that launches movies", version = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH")))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Settings file (default: ./settings.toml, then the user config dir)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the video folder and list the image/movie pairs found
    Scan,
}

/// Everything the navigation loop needs, built before it starts.
struct Kiosk {
    settings: Settings,
    catalog: Catalog,
    display: SdlDisplay,
    config: DisplayConfig,
}

/// `RUST_LOG` as given when it is set and parses; otherwise kv logs at info.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("kv=info"))
}

fn init_tracing() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}

/// Settings and scan. Fails on a missing root or an empty catalog without touching the display.
fn load_catalog(settings_path: Option<&Path>) -> Result<(Settings, Catalog), StartupError> {
    let path = settings::locate(settings_path)?;
    let settings = Settings::load(&path)?;
    info!("settings: {}", path.display());

    let catalog = catalog::scan(
        &settings.video_folder,
        &settings.image_extensions,
        &settings.movie_extensions,
    )?;
    if catalog.is_empty() {
        return Err(StartupError::EmptyCatalog {
            root: settings.video_folder.clone(),
        });
    }
    Ok((settings, catalog))
}

/// Settings, scan, display. Any failure here ends the program before browsing.
fn startup(settings_path: Option<&Path>) -> Result<Kiosk, StartupError> {
    let (settings, catalog) = load_catalog(settings_path)?;
    let display = SdlDisplay::init()?;
    let config = settings.display_config(display.desktop_size()?);

    Ok(Kiosk {
        settings,
        catalog,
        display,
        config,
    })
}

fn run_kiosk(settings_path: Option<&Path>) -> i32 {
    let mut kiosk = match startup(settings_path) {
        Ok(k) => k,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };
    info!(
        "{} pairs, {}x{}{}",
        kiosk.catalog.len(),
        kiosk.config.width,
        kiosk.config.height,
        if kiosk.config.fullscreen { " fullscreen" } else { "" }
    );

    let mut runner = SystemRunner;
    let Some(mut nav) = Navigator::new(
        &kiosk.catalog,
        &kiosk.config,
        &kiosk.settings.player,
        &mut kiosk.display,
        &mut runner,
        kiosk.settings.cache_size,
    ) else {
        error!("nothing to browse");
        return 1;
    };

    match nav.run() {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

fn main() {
    init_tracing();
    let args = Cli::parse();
    info!("kv {}-{}", VERSION, GIT_HASH);

    let code = match args.command {
        Some(Commands::Scan) => cli::scan(args.settings.as_deref()),
        None => run_kiosk(args.settings.as_deref()),
    };
    std::process::exit(code);
}
