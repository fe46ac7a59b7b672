//! Catalog scanner: walk the video folder and pair one image with one video per directory.
//!
//! Traversal is top-down with entries sorted by file name, so the catalog order is
//! stable across runs over an unchanged tree. Within a folder the first matching
//! image and the first matching video (in that same order) win; extra candidates
//! are ignored.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::ops::Index;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::ScanError;

/// One gallery entry: the still shown in the browser and the movie played on confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPair {
    image: PathBuf,
    video: PathBuf,
}

impl MediaPair {
    pub fn new(image: impl Into<PathBuf>, video: impl Into<PathBuf>) -> Self {
        MediaPair {
            image: image.into(),
            video: video.into(),
        }
    }

    pub fn image(&self) -> &Path {
        &self.image
    }

    pub fn video(&self) -> &Path {
        &self.video
    }

    /// Name of the folder the pair came from, for window titles and listings.
    pub fn label(&self) -> String {
        self.image
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.image.to_string_lossy().into_owned())
    }
}

/// Ordered, immutable list of pairs built once per scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pairs: Vec<MediaPair>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaPair> {
        self.pairs.iter()
    }
}

impl Index<usize> for Catalog {
    type Output = MediaPair;

    fn index(&self, index: usize) -> &MediaPair {
        &self.pairs[index]
    }
}

impl FromIterator<MediaPair> for Catalog {
    fn from_iter<I: IntoIterator<Item = MediaPair>>(iter: I) -> Self {
        Catalog {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// Case-insensitive set of file extensions, stored without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet(Vec<String>);

impl ExtensionSet {
    pub fn new<I, S>(exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for ext in exts {
            let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !out.contains(&ext) {
                out.push(ext);
            }
        }
        ExtensionSet(out)
    }

    /// Names that are not valid UTF-8 still match when their extension is.
    pub fn matches(&self, file_name: impl AsRef<OsStr>) -> bool {
        Path::new(file_name.as_ref())
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| self.0.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// A directory and the names of the regular files directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub path: PathBuf,
    pub files: Vec<OsString>,
}

/// List every directory under `root` (root included) with its direct files.
///
/// Fails only when `root` itself cannot be read. Unreadable subdirectories and
/// broken entries are logged and skipped.
pub fn list_directory_tree(root: &Path) -> Result<Vec<Folder>, ScanError> {
    std::fs::read_dir(root).map_err(|source| ScanError::PathNotFound {
        path: root.to_path_buf(),
        source,
    })?;

    let mut folders: Vec<Folder> = Vec::new();
    let mut by_path: HashMap<PathBuf, usize> = HashMap::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "scan: skipping unreadable entry");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            by_path.insert(entry.path().to_path_buf(), folders.len());
            folders.push(Folder {
                path: entry.into_path(),
                files: Vec::new(),
            });
        } else if entry.file_type().is_file() {
            let slot = entry.path().parent().and_then(|p| by_path.get(p)).copied();
            if let Some(i) = slot {
                folders[i].files.push(entry.file_name().to_owned());
            }
        }
    }

    Ok(folders)
}

/// Pair the first image with the first video of every folder that has both.
pub fn pair_folders(folders: &[Folder], images: &ExtensionSet, videos: &ExtensionSet) -> Catalog {
    folders
        .iter()
        .filter_map(|folder| {
            let image = folder.files.iter().find(|f| images.matches(f))?;
            let video = folder.files.iter().find(|f| videos.matches(f))?;
            debug!(
                "pair: {} + {}",
                Path::new(image).display(),
                Path::new(video).display()
            );
            Some(MediaPair::new(
                folder.path.join(image),
                folder.path.join(video),
            ))
        })
        .collect()
}

/// Scan `root` and build the catalog. An empty catalog is a valid result here.
pub fn scan(root: &Path, images: &ExtensionSet, videos: &ExtensionSet) -> Result<Catalog, ScanError> {
    let folders = list_directory_tree(root)?;
    let catalog = pair_folders(&folders, images, videos);
    info!(
        "scan: {} — {} folders, {} pairs",
        root.display(),
        folders.len(),
        catalog.len()
    );
    Ok(catalog)
}
