//! `settings.toml`: where the movies live, how big the screen is, which player to run.
//!
//! Every key except `video_folder` has a default. Width and height fall back to the
//! desktop resolution, which only the display backend knows, so they stay optional
//! here and are resolved by [`Settings::display_config`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::catalog::ExtensionSet;
use crate::error::SettingsError;

pub const SETTINGS_FILE: &str = "settings.toml";

const DEFAULT_IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "gif", "png", "webp"];
const DEFAULT_MOVIE_EXTS: &[&str] = &["mkv", "mp4", "flv", "avi", "mov"];
const DEFAULT_CACHE_SIZE: usize = 4;

#[cfg(windows)]
const DEFAULT_COMMAND: &str = r"C:\Program Files\VideoLAN\VLC\vlc.exe";
#[cfg(not(windows))]
const DEFAULT_COMMAND: &str = "vlc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Player executable.
    pub command: String,
    /// Extra arguments placed before the video path.
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub video_folder: PathBuf,
    pub full_screen: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub image_extensions: ExtensionSet,
    pub movie_extensions: ExtensionSet,
    pub player: PlayerConfig,
    pub cache_size: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    video_folder: Option<PathBuf>,
    full_screen: Option<bool>,
    width: Option<u32>,
    height: Option<u32>,
    image_extensions: Option<Vec<String>>,
    movie_extensions: Option<Vec<String>>,
    command: Option<String>,
    args: Option<Vec<String>>,
    cache_size: Option<usize>,
}

impl Settings {
    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let raw: RawSettings = toml::from_str(text)?;

        let video_folder = raw.video_folder.ok_or(SettingsError::Invalid {
            key: "video_folder",
            reason: "missing".into(),
        })?;
        let width = positive("width", raw.width)?;
        let height = positive("height", raw.height)?;

        let image_extensions = extensions("image_extensions", raw.image_extensions, DEFAULT_IMAGE_EXTS)?;
        let movie_extensions = extensions("movie_extensions", raw.movie_extensions, DEFAULT_MOVIE_EXTS)?;

        let command = raw
            .command
            .map(|c| c.trim().to_string())
            .unwrap_or_else(|| DEFAULT_COMMAND.to_string());
        if command.is_empty() {
            return Err(SettingsError::Invalid {
                key: "command",
                reason: "empty".into(),
            });
        }

        Ok(Settings {
            video_folder,
            full_screen: raw.full_screen.unwrap_or(false),
            width,
            height,
            image_extensions,
            movie_extensions,
            player: PlayerConfig {
                command,
                args: raw.args.unwrap_or_default(),
            },
            cache_size: raw.cache_size.unwrap_or(DEFAULT_CACHE_SIZE).max(1),
        })
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("settings: {}", path.display());
        Self::parse(&text)
    }

    /// Fill in missing dimensions from the desktop resolution.
    pub fn display_config(&self, desktop: (u32, u32)) -> DisplayConfig {
        DisplayConfig {
            width: self.width.unwrap_or(desktop.0),
            height: self.height.unwrap_or(desktop.1),
            fullscreen: self.full_screen,
        }
    }
}

/// Find the settings file: explicit path, then the working directory, then the
/// per-user config directory.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, SettingsError> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    let searched = candidates();
    let found = searched.iter().find(|p| p.is_file()).cloned();
    found.ok_or(SettingsError::Missing { searched })
}

fn candidates() -> Vec<PathBuf> {
    let mut out = vec![PathBuf::from(SETTINGS_FILE)];
    if let Some(dirs) = directories::ProjectDirs::from("dev", "kv", "kv") {
        out.push(dirs.config_dir().join(SETTINGS_FILE));
    }
    out
}

fn positive(key: &'static str, value: Option<u32>) -> Result<Option<u32>, SettingsError> {
    match value {
        Some(0) => Err(SettingsError::Invalid {
            key,
            reason: "must be greater than zero".into(),
        }),
        v => Ok(v),
    }
}

fn extensions(
    key: &'static str,
    value: Option<Vec<String>>,
    default: &[&str],
) -> Result<ExtensionSet, SettingsError> {
    let set = match value {
        Some(list) => ExtensionSet::new(list),
        None => ExtensionSet::new(default.iter().copied()),
    };
    if set.is_empty() {
        return Err(SettingsError::Invalid {
            key,
            reason: "no extensions listed".into(),
        });
    }
    Ok(set)
}
