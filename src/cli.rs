//! CLI subcommand implementations.

use std::path::Path;

use tracing::error;

use crate::catalog;
use crate::settings::{self, Settings};

/// Scan the configured folder and print the catalog the kiosk would show.
/// Returns the process exit code.
pub fn scan(settings_path: Option<&Path>) -> i32 {
    let settings = match settings::locate(settings_path).and_then(|p| Settings::load(&p)) {
        Ok(s) => s,
        Err(e) => {
            error!("kv scan: {}", e);
            return 1;
        }
    };

    println!("Scanning {}...", settings.video_folder.display());
    let catalog = match catalog::scan(
        &settings.video_folder,
        &settings.image_extensions,
        &settings.movie_extensions,
    ) {
        Ok(c) => c,
        Err(e) => {
            error!("kv scan: {}", e);
            return 1;
        }
    };

    for (i, pair) in catalog.iter().enumerate() {
        println!(
            "{:>4}  {}  {}",
            i + 1,
            pair.image().display(),
            pair.video().display()
        );
    }
    println!("Done. {} pairs.", catalog.len());
    0
}
