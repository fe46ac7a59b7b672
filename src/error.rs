//! Error taxonomy.
//!
//! Startup errors are fatal and end the process with a non-zero status before
//! the navigation loop exists. Render and launch errors are transient: the
//! loop logs them and keeps browsing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The scan root could not be listed.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read video folder {}: {source}", .path.display())]
    PathNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// SDL reports failures as plain strings, so these carry the message only.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display init failed: {0}")]
    Init(String),
    #[error("cannot create window: {0}")]
    Window(String),
    #[error("draw failed: {0}")]
    Draw(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot load image {}: {source}", .path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Display(#[from] DisplayError),
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("player command is empty")]
    EmptyCommand,
    #[error("cannot start player {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("missing settings file (looked in: {})", join_paths(.searched))]
    Missing { searched: Vec<PathBuf> },
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Conditions that abort the program before browsing starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error("no folders with an image and a video found under {}", .root.display())]
    EmptyCatalog { root: PathBuf },
}

/// Conditions that end the navigation loop abnormally.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("none of the {attempts} catalog entries could be rendered")]
    NothingRenderable { attempts: usize },
    #[error("display surface is gone")]
    SurfaceLost,
    #[error(transparent)]
    Display(#[from] DisplayError),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
