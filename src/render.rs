//! Display renderer: decode a pair's image, stretch it to the output size, put it on screen.
//!
//! Flow:
//!   1. FrameCache::get_or_load(path) → decodes + scales on a miss, LRU-touches on a hit
//!   2. Surface::blit(frame) → covers the whole surface from the origin
//!   3. Surface::present() → commits
//!
//! Everything runs on the navigation thread; there is no background decoding.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use tracing::debug;

use crate::catalog::MediaPair;
use crate::display::Surface;
use crate::error::RenderError;
use crate::settings::DisplayConfig;

/// Decoded, already-scaled image: raw RGBA pixels, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    fn fits(&self, config: &DisplayConfig) -> bool {
        self.width == config.width && self.height == config.height
    }

    /// Bytes per row.
    pub fn pitch(&self) -> usize {
        self.width as usize * 4
    }
}

/// Decode `path` and stretch it to exactly `config.width × config.height`.
pub fn load_frame(path: &Path, config: &DisplayConfig) -> Result<Frame, RenderError> {
    let img = image::open(path).map_err(|source| RenderError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let scaled = imageops::resize(&img, config.width, config.height, FilterType::Triangle);
    Ok(Frame {
        width: scaled.width(),
        height: scaled.height(),
        rgba: scaled.into_raw(),
    })
}

/// LRU cache of scaled frames keyed by image path.
pub struct FrameCache {
    capacity: usize,
    map: HashMap<PathBuf, Frame>,
    /// LRU order: front = oldest, back = newest
    order: VecDeque<PathBuf>,
}

impl FrameCache {
    pub fn new(capacity: usize) -> Self {
        FrameCache {
            capacity: capacity.max(1),
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    #[cfg(test)]
    pub fn has(&self, path: &Path) -> bool {
        self.map.contains_key(path)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Return the frame for `path`, decoding it on a miss.
    ///
    /// A cached frame of the wrong size counts as a miss. Failed decodes are not cached.
    pub fn get_or_load(&mut self, path: &Path, config: &DisplayConfig) -> Result<&Frame, RenderError> {
        let cached = self.map.get(path).is_some_and(|f| f.fits(config));
        if cached {
            self.touch(path);
        } else {
            let frame = load_frame(path, config)?;
            self.insert(path, frame);
        }
        Ok(&self.map[path])
    }

    fn insert(&mut self, path: &Path, frame: Frame) {
        if self.map.remove(path).is_some() {
            self.order.retain(|p| p != path);
        }

        // Evict if at capacity
        while self.map.len() >= self.capacity {
            match self.order.pop_front() {
                Some(old) => {
                    debug!("frame cache: evict {}", old.display());
                    self.map.remove(&old);
                }
                None => break,
            }
        }

        self.map.insert(path.to_path_buf(), frame);
        self.order.push_back(path.to_path_buf());
    }

    /// Move a path to the back of the LRU (most recently used).
    fn touch(&mut self, path: &Path) {
        if let Some(pos) = self.order.iter().position(|p| p == path) {
            self.order.remove(pos);
        }
        self.order.push_back(path.to_path_buf());
    }
}

/// Show `pair`'s image full-surface. Idempotent for a given pair and config.
pub fn render<S: Surface>(
    surface: &mut S,
    pair: &MediaPair,
    config: &DisplayConfig,
    cache: &mut FrameCache,
) -> Result<(), RenderError> {
    let frame = cache.get_or_load(pair.image(), config)?;
    surface.blit(frame)?;
    surface.present();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DisplayError;
    use image::{Rgb, RgbImage};

    #[derive(Default)]
    struct RecordingSurface {
        blits: Vec<Frame>,
        presents: usize,
    }

    impl Surface for RecordingSurface {
        fn blit(&mut self, frame: &Frame) -> Result<(), DisplayError> {
            self.blits.push(frame.clone());
            Ok(())
        }

        fn present(&mut self) {
            self.presents += 1;
        }

        fn set_title(&mut self, _title: &str) {}
    }

    struct BrokenSurface;

    impl Surface for BrokenSurface {
        fn blit(&mut self, _frame: &Frame) -> Result<(), DisplayError> {
            Err(DisplayError::Draw("texture upload failed".into()))
        }

        fn present(&mut self) {
            panic!("present after failed blit");
        }

        fn set_title(&mut self, _title: &str) {}
    }

    fn config(width: u32, height: u32) -> DisplayConfig {
        DisplayConfig {
            width,
            height,
            fullscreen: false,
        }
    }

    /// Write a small two-colour PNG (left half red, right half blue).
    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let img = RgbImage::from_fn(w, h, |x, _| {
            if x < w / 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    fn pair_for(image: &Path) -> MediaPair {
        MediaPair::new(image, image.with_extension("mp4"))
    }

    // ── load_frame ──────────────────────────────────────────────────────

    #[test]
    fn frame_is_stretched_to_exact_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 40, 10);

        let frame = load_frame(&path, &config(16, 32)).unwrap();
        assert_eq!((frame.width, frame.height), (16, 32));
        assert_eq!(frame.rgba.len(), 16 * 32 * 4);
        assert_eq!(frame.pitch(), 64);
    }

    #[test]
    fn frame_keeps_left_right_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "halves.png", 8, 8);

        let frame = load_frame(&path, &config(4, 4)).unwrap();
        let first = &frame.rgba[0..4];
        assert!(first[0] > 250 && first[2] < 5 && first[3] == 255, "{first:?}");
        let last = &frame.rgba[frame.rgba.len() - 4..];
        assert!(last[0] < 5 && last[2] > 250 && last[3] == 255, "{last:?}");
    }

    #[test]
    fn missing_file_is_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_frame(&dir.path().join("gone.jpg"), &config(4, 4)).unwrap_err();
        assert!(matches!(err, RenderError::ImageLoad { .. }));
    }

    #[test]
    fn garbage_file_is_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        let err = load_frame(&path, &config(4, 4)).unwrap_err();
        assert!(matches!(err, RenderError::ImageLoad { .. }));
    }

    // ── render ──────────────────────────────────────────────────────────

    #[test]
    fn render_blits_then_presents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 6, 6);
        let mut surface = RecordingSurface::default();
        let mut cache = FrameCache::new(2);

        render(&mut surface, &pair_for(&path), &config(3, 3), &mut cache).unwrap();
        assert_eq!(surface.blits.len(), 1);
        assert_eq!(surface.presents, 1);
    }

    #[test]
    fn render_twice_is_pixel_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 30, 20);
        let pair = pair_for(&path);
        let cfg = config(12, 7);

        let mut surface = RecordingSurface::default();
        let mut cache = FrameCache::new(2);
        render(&mut surface, &pair, &cfg, &mut cache).unwrap();
        render(&mut surface, &pair, &cfg, &mut cache).unwrap();

        // and once more through a cold cache
        let mut cold = FrameCache::new(1);
        render(&mut surface, &pair, &cfg, &mut cold).unwrap();

        assert_eq!(surface.blits.len(), 3);
        assert_eq!(surface.blits[0], surface.blits[1]);
        assert_eq!(surface.blits[0], surface.blits[2]);
    }

    #[test]
    fn render_surfaces_load_error_without_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = RecordingSurface::default();
        let mut cache = FrameCache::new(2);
        let pair = pair_for(&dir.path().join("deleted.png"));

        let err = render(&mut surface, &pair, &config(4, 4), &mut cache).unwrap_err();
        assert!(matches!(err, RenderError::ImageLoad { .. }));
        assert!(surface.blits.is_empty());
        assert_eq!(surface.presents, 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn render_surfaces_display_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 4, 4);
        let mut cache = FrameCache::new(2);

        let err = render(&mut BrokenSurface, &pair_for(&path), &config(4, 4), &mut cache).unwrap_err();
        assert!(matches!(err, RenderError::Display(DisplayError::Draw(_))));
    }

    // ── FrameCache ──────────────────────────────────────────────────────

    #[test]
    fn cache_evicts_least_recently_used() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 4, 4);
        let b = write_png(dir.path(), "b.png", 4, 4);
        let c = write_png(dir.path(), "c.png", 4, 4);
        let cfg = config(2, 2);
        let mut cache = FrameCache::new(2);

        cache.get_or_load(&a, &cfg).unwrap();
        cache.get_or_load(&b, &cfg).unwrap();
        cache.get_or_load(&a, &cfg).unwrap(); // a is now newest
        cache.get_or_load(&c, &cfg).unwrap(); // evicts b

        assert_eq!(cache.len(), 2);
        assert!(cache.has(&a));
        assert!(!cache.has(&b));
        assert!(cache.has(&c));
    }

    #[test]
    fn cache_hit_survives_file_deletion() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 4, 4);
        let cfg = config(2, 2);
        let mut cache = FrameCache::new(1);

        let first = cache.get_or_load(&a, &cfg).unwrap().clone();
        std::fs::remove_file(&a).unwrap();
        let second = cache.get_or_load(&a, &cfg).unwrap();
        assert_eq!(&first, second);
    }

    #[test]
    fn cache_reloads_when_size_changes() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 8, 8);
        let mut cache = FrameCache::new(3);

        cache.get_or_load(&a, &config(2, 2)).unwrap();
        let frame = cache.get_or_load(&a, &config(4, 3)).unwrap();
        assert_eq!((frame.width, frame.height), (4, 3));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 4, 4);
        let mut cache = FrameCache::new(0);
        cache.get_or_load(&a, &config(2, 2)).unwrap();
        assert_eq!(cache.len(), 1);
    }
}
