//! User interface components for pixview.
//!
//! This module provides the egui viewer window: canvas, toolbar, status
//! bar and filmstrip. It only feeds engine results back and forth; the
//! arithmetic lives in [`crate::transform`] and [`crate::selection`].
//!
//! # Architecture
//!
//! The UI is split into focused submodules:
//! - [`state`]: Interaction state machine and status messages
//! - [`settings`]: User preferences and persistence
//! - [`rendering`]: Window/label coordinate conversion and overlay drawing
//! - [`viewer`]: Main application logic
//!
//! # Usage
//!
//! ```ignore
//! use pixview_core::{ui, Config};
//!
//! let config = Config::load()?;
//! ui::run_viewer(Some("photo.jpg".into()), config)?;
//! ```

mod rendering;
mod settings;
mod state;
mod viewer;

// Public API exports
pub use settings::Settings;
pub use state::{ResizeDialog, ResizeMode, StatusMessage, UiState};
pub use viewer::ViewerApp;

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;

/// Opens the viewer window and blocks until it is closed.
///
/// # Arguments
/// * `path` - Image to open on start; its folder feeds the filmstrip
/// * `config` - Zoom, crop, history and slideshow configuration
///
/// # Errors
/// Returns an error if the native window cannot be created.
pub fn run_viewer(path: Option<PathBuf>, config: Config) -> Result<()> {
    viewer::run(path, config)
}
