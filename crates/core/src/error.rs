//! Error types for the pixview-core library.
//!
//! This module provides granular error variants for different failure modes,
//! enabling precise error handling and user-friendly error messages.
//!
//! Geometry and gesture errors are expected during normal interaction (a
//! click instead of a drag, a window resized to zero) and are meant to be
//! swallowed by the UI; see [`AppError::is_recoverable`].

use thiserror::Error;

/// Errors that can occur within the pixview-core library.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (invalid values, bad bounds).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A viewport, image or pixmap has a zero dimension.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The selection area is empty or smaller than the minimum size.
    #[error("Selection area is empty or too small")]
    EmptySelection,

    /// The crop gesture ended where it started, or was cancelled.
    #[error("Selection cancelled")]
    SelectionCancelled,

    /// A crop region does not fit inside the image.
    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    /// A resize request has unusable dimensions.
    #[error("Invalid resize: {0}")]
    InvalidResize(String),

    /// A brightness/contrast/gamma adjustment is out of range.
    #[error("Invalid adjustment: {0}")]
    InvalidAdjustment(String),

    /// The undo stack is empty.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// The redo stack is empty.
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Folder navigation reached the first or last file.
    #[error("No more files in this direction")]
    NoNeighbour,

    /// A slideshow needs at least two files.
    #[error("Not enough files in the folder for a slideshow")]
    NotEnoughFiles,

    /// The file extension is not a supported image format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding or encoding through the `image` crate failed.
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// UI-related errors (rendering, window management).
    #[error("UI error: {0}")]
    Ui(String),

    /// Clipboard access failed.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a degenerate geometry error with the given message.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }

    /// Creates an invalid crop error with the given message.
    pub fn crop(msg: impl Into<String>) -> Self {
        Self::InvalidCrop(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }

    /// Returns true for errors that only mean "nothing happens".
    ///
    /// The caller should leave its state untouched and carry on without
    /// surfacing a message.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DegenerateGeometry(_)
                | Self::EmptySelection
                | Self::SelectionCancelled
                | Self::NothingToUndo
                | Self::NothingToRedo
                | Self::NoNeighbour
        )
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
