//! pixview Core Library
//!
//! This library provides the core functionality of the pixview image viewer:
//! fit-to-window and zoom scaling, mapping screen selections back to source
//! pixels, and a bounded undo/redo history of image edits.
//!
//! # Overview
//!
//! - **Display transform**: render sizes and zoom stepping via [`transform`]
//! - **Crop mapping**: letterbox-aware selection mapping via [`selection`]
//! - **Edits**: rotate, crop, resize, effects and file I/O via [`image_processing`]
//! - **History**: bounded undo/redo via [`history`], wired up in [`document`]
//! - **Navigation**: folder stepping and slideshow timing via [`gallery`]
//! - **User Interface**: the egui viewer window via [`ui`]
//!
//! # Quick Start
//!
//! The simplest way to use the library is through the [`PixView`] facade:
//!
//! ```ignore
//! use pixview_core::{PixView, Size};
//!
//! let app = PixView::new()?;
//! let plan = app.layout(Size::from_u32(1920, 1080), Size::from_u32(800, 600), None)?;
//! println!("{}", plan.size);
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: Configuration loading and management
//! - [`document`]: An open image with its edit history
//! - [`error`]: Error types and result aliases
//! - [`gallery`]: Folder scanning, navigation and slideshow
//! - [`geometry`]: Coordinate-space tagged points, sizes and rectangles
//! - [`history`]: Bounded undo/redo stacks
//! - [`image_processing`]: Image manipulation utilities
//! - [`selection`]: Crop gesture and screen-to-source mapping
//! - [`transform`]: Zoom and fit-to-window scaling
//! - [`ui`]: User interface components

pub mod config;
pub mod document;
pub mod error;
pub mod gallery;
pub mod geometry;
pub mod history;
pub mod image_processing;
pub mod selection;
pub mod transform;
pub mod ui;

use std::path::{Path, PathBuf};

// Re-export primary types for convenience
pub use config::{Config, ConfigBuilder};
pub use document::Document;
pub use error::{AppError, Result};
pub use gallery::{FolderNavigator, Slideshow, SlideshowTick};
pub use geometry::{CropRegion, ImageSize, Point, Rect, Screen, SelectionRect, Size, ViewportSize};
pub use history::EditHistory;
pub use image_processing::{Adjustments, Edit, ImageProcessor, ResizeTarget};
pub use selection::{CropGesture, CropMapper};
pub use transform::{DisplayTransform, Pan, RenderPlan, ZoomState};

/// Main entry point for the pixview engine.
///
/// This struct bundles a [`Config`] with the engines derived from it. It's
/// the recommended way to use the library for scripted work; the viewer
/// window builds the same pieces itself.
///
/// # Example
///
/// ```ignore
/// use pixview_core::PixView;
///
/// let app = PixView::new()?;
/// app.run_viewer(None)?;
/// ```
pub struct PixView {
    config: Config,
    engine: DisplayTransform,
    mapper: CropMapper,
}

impl PixView {
    /// Creates an instance configured from the environment (including `.env`).
    ///
    /// # Errors
    ///
    /// Returns an error if a `PIXVIEW_*` variable is malformed or the
    /// resulting configuration is inconsistent.
    pub fn new() -> Result<Self> {
        Ok(Self::with_config(Config::load()?))
    }

    /// Creates an instance with custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            engine: DisplayTransform::from_config(&config),
            mapper: CropMapper::from_config(&config),
            config,
        }
    }

    /// Computes the on-screen size of `image` inside `viewport`.
    ///
    /// `zoom` of `None` means fit-to-window; `Some(f)` is clamped to the
    /// configured zoom range first.
    pub fn layout(&self, image: ImageSize, viewport: ViewportSize, zoom: Option<f64>) -> Result<RenderPlan> {
        let mut state = match zoom {
            Some(f) => self.engine.zoom_to(ZoomState::fit(), f),
            None => ZoomState::fit(),
        };
        self.engine.compute_render_size(image, viewport, &mut state)
    }

    /// Maps a drag from `start` to `end` (viewport coordinates, no pan) to
    /// a crop region of `image`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SelectionCancelled`] for a click and
    /// [`AppError::EmptySelection`] when the drag misses the image or is
    /// too small.
    pub fn map_crop(
        &self,
        image: ImageSize,
        viewport: ViewportSize,
        zoom: Option<f64>,
        start: Point<Screen>,
        end: Point<Screen>,
    ) -> Result<CropRegion> {
        let plan = self.layout(image, viewport, zoom)?;
        let label = transform::label_size(viewport, plan.size);
        self.mapper.map_drag(start, end, label, plan.size, image)
    }

    /// Opens an image as an editable document.
    pub fn open(&self, path: &Path) -> Result<Document> {
        Document::open(path, &self.config)
    }

    /// Launches the viewer window.
    pub fn run_viewer(&self, path: Option<PathBuf>) -> Result<()> {
        ui::run_viewer(path, self.config.clone())
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
