//! One open image together with its edit history and zoom state.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::geometry::{CropRegion, ImageSize, ViewportSize};
use crate::history::EditHistory;
use crate::image_processing::{Edit, ImageProcessor};
use crate::transform::{DisplayTransform, RenderPlan, ZoomState};
use image::DynamicImage;
use tracing::info;

/// The image being viewed and edited.
///
/// All mutations go through [`Document::apply`], which records the replaced
/// buffer for undo.
pub struct Document {
    path: Option<PathBuf>,
    /// Size of the file on disk when it was last opened or saved.
    file_size: Option<u64>,
    image: DynamicImage,
    history: EditHistory<DynamicImage>,
    pub zoom: ZoomState,
}

impl Document {
    /// Opens and decodes an image file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn open(path: &Path, config: &Config) -> Result<Self> {
        let image = ImageProcessor::load(path)?;
        let mut doc = Self::from_image(image, config);
        doc.set_path(path);
        Ok(doc)
    }

    /// Wraps an already decoded image, e.g. one pasted or generated.
    pub fn from_image(image: DynamicImage, config: &Config) -> Self {
        Self {
            path: None,
            file_size: None,
            image: ImageProcessor::normalize(image),
            history: EditHistory::with_depth(config.history_depth),
            zoom: ZoomState::fit(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Bytes on disk; unsaved edits are not reflected.
    pub fn file_size(&self) -> Option<u64> {
        self.file_size
    }

    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn size(&self) -> ImageSize {
        ImageProcessor::size(&self.image)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Applies an edit, recording the previous image only if it succeeds.
    ///
    /// # Errors
    ///
    /// Propagates the edit's error; the document is unchanged in that case.
    pub fn apply(&mut self, edit: Edit) -> Result<()> {
        let edited = ImageProcessor::apply(&self.image, &edit)?;
        let previous = std::mem::replace(&mut self.image, edited);
        self.history.record(previous);
        if edit.changes_geometry() {
            self.zoom.fit_to_window = true;
        }
        info!(%edit, undo = self.history.undo_len(), "edit committed");
        Ok(())
    }

    /// Commits a crop produced by a finished crop gesture.
    pub fn commit_crop(&mut self, region: CropRegion) -> Result<()> {
        self.apply(Edit::Crop(region))
    }

    /// # Errors
    ///
    /// Returns [`AppError::NothingToUndo`] when the history is empty.
    pub fn undo(&mut self) -> Result<()> {
        let current = self.take_image();
        match self.history.undo(current) {
            Ok(previous) => {
                self.image = previous;
                info!(undo = self.history.undo_len(), redo = self.history.redo_len(), "undo");
                Ok(())
            }
            Err(current) => {
                self.image = current;
                Err(AppError::NothingToUndo)
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`AppError::NothingToRedo`] when nothing was undone.
    pub fn redo(&mut self) -> Result<()> {
        let current = self.take_image();
        match self.history.redo(current) {
            Ok(next) => {
                self.image = next;
                info!(undo = self.history.undo_len(), redo = self.history.redo_len(), "redo");
                Ok(())
            }
            Err(current) => {
                self.image = current;
                Err(AppError::NothingToRedo)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Recomputes the render size for `viewport`, updating the zoom factor in
    /// fit mode.
    pub fn render_plan(&mut self, viewport: ViewportSize, engine: &DisplayTransform) -> Result<RenderPlan> {
        engine.compute_render_size(self.size(), viewport, &mut self.zoom)
    }

    /// Saves the current image and remembers `path` as its location.
    pub fn save_as(&mut self, path: &Path, jpeg_quality: Option<u8>) -> Result<()> {
        ImageProcessor::save(&self.image, path, jpeg_quality)?;
        self.set_path(path);
        Ok(())
    }

    /// Writes a resized copy without touching the open image.
    pub fn export_resized(&self, path: &Path, width: u32, height: u32, jpeg_quality: Option<u8>) -> Result<()> {
        let resized = ImageProcessor::resize(&self.image, width, height)?;
        ImageProcessor::save(&resized, path, jpeg_quality)
    }

    fn set_path(&mut self, path: &Path) {
        self.file_size = std::fs::metadata(path).ok().map(|m| m.len());
        self.path = Some(path.to_path_buf());
    }

    fn take_image(&mut self) -> DynamicImage {
        std::mem::replace(&mut self.image, DynamicImage::new_rgb8(0, 0))
    }
}
