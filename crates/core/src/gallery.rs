//! Folder navigation and slideshow timing.
//!
//! The viewer steps through the supported images that sit next to the open
//! file, sorted by file name. The same list feeds the filmstrip.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{AppError, Result};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp", "gif"];

/// True if the path has a supported image extension (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Lists the supported images directly inside `dir`, sorted by file name.
pub fn scan_folder(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e
                    .into_io_error()
                    .map(AppError::Io)
                    .unwrap_or_else(|| AppError::config(format!("cannot read {}", dir.display()))));
            }
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_supported_image(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), count = files.len(), "folder scanned");
    Ok(files)
}

/// Position within the images of one folder.
#[derive(Clone, Debug, Default)]
pub struct FolderNavigator {
    files: Vec<PathBuf>,
    index: Option<usize>,
}

impl FolderNavigator {
    /// Scans the folder containing `file` and positions on it.
    ///
    /// If `file` itself is not in the list (e.g. unsupported extension), the
    /// navigator has no current index until one is selected.
    pub fn for_file(file: &Path) -> Result<Self> {
        let dir = match file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let files = scan_folder(&dir)?;
        let index = files
            .iter()
            .position(|p| p.file_name() == file.file_name());
        Ok(Self { files, index })
    }

    pub fn from_files(files: Vec<PathBuf>, index: Option<usize>) -> Self {
        let index = index.filter(|i| *i < files.len());
        Self { files, index }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<&Path> {
        self.index.and_then(|i| self.files.get(i)).map(PathBuf::as_path)
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.index, Some(i) if i > 0)
    }

    pub fn has_next(&self) -> bool {
        matches!(self.index, Some(i) if i + 1 < self.files.len())
    }

    /// Steps back one file; stays put at the first one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoNeighbour`] at the start of the list.
    pub fn previous(&mut self) -> Result<&Path> {
        match self.index {
            Some(i) if i > 0 => self.select(i - 1),
            _ => Err(AppError::NoNeighbour),
        }
    }

    /// Steps forward one file; stays put at the last one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoNeighbour`] at the end of the list.
    pub fn next(&mut self) -> Result<&Path> {
        match self.index {
            Some(i) if i + 1 < self.files.len() => self.select(i + 1),
            _ => Err(AppError::NoNeighbour),
        }
    }

    /// Jumps to a filmstrip entry.
    pub fn select(&mut self, index: usize) -> Result<&Path> {
        let path = self.files.get(index).ok_or(AppError::NoNeighbour)?;
        self.index = Some(index);
        Ok(path.as_path())
    }
}

/// Timer that advances through a folder once.
#[derive(Clone, Debug)]
pub struct Slideshow {
    interval: Duration,
    last_advance: Instant,
}

impl Slideshow {
    /// Starts a slideshow over `nav`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotEnoughFiles`] for fewer than two images.
    pub fn start(nav: &FolderNavigator, interval: Duration, now: Instant) -> Result<Self> {
        if nav.len() < 2 {
            return Err(AppError::NotEnoughFiles);
        }
        Ok(Self {
            interval,
            last_advance: now,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next advance, for scheduling a repaint.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.interval.saturating_sub(now.saturating_duration_since(self.last_advance))
    }

    /// Advances `nav` if the interval has elapsed.
    pub fn tick(&mut self, nav: &mut FolderNavigator, now: Instant) -> SlideshowTick {
        if now.saturating_duration_since(self.last_advance) < self.interval {
            return SlideshowTick::Wait;
        }
        self.last_advance = now;
        match nav.next() {
            Ok(path) => SlideshowTick::Show(path.to_path_buf()),
            Err(_) => SlideshowTick::Finished,
        }
    }
}

/// What the viewer should do after a [`Slideshow::tick`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlideshowTick {
    Wait,
    Show(PathBuf),
    /// The last file was reached; the slideshow should stop.
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_supported_image(Path::new("a/B.JPG")));
        assert!(is_supported_image(Path::new("photo.webp")));
        assert!(!is_supported_image(Path::new("clip.mp4")));
        assert!(!is_supported_image(Path::new("README")));
    }

    #[test]
    fn from_files_drops_out_of_range_index() {
        let nav = FolderNavigator::from_files(vec![PathBuf::from("a.png")], Some(3));
        assert_eq!(nav.index(), None);
        assert!(!nav.has_next());
    }
}
