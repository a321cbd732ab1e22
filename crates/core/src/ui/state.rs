//! UI state types.
//!
//! This module contains the interaction state machine of the viewer.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::gallery::Slideshow;
use crate::geometry::CropRegion;
use crate::image_processing::{ImageProcessor, ResizeTarget, DEFAULT_JPEG_QUALITY};
use crate::selection::CropGesture;

/// Current interaction mode of the viewer.
///
/// The UI follows a simple state machine:
/// `Viewing` -> `Cropping` (crop toggled) -> `Viewing` (applied / Escape)
///           \-> `Slideshow` (F5) -> `Viewing` (Escape / last file / click)
#[derive(Clone, Debug, Default)]
pub enum UiState {
    /// Zoom, pan and navigation.
    #[default]
    Viewing,
    /// Pointer drags draw a rubber band instead of panning.
    Cropping {
        gesture: CropGesture,
        /// Region mapped from the last finished drag, waiting for "Apply".
        pending: Option<CropRegion>,
    },
    /// Fullscreen, chrome hidden, advancing on a timer.
    Slideshow(Slideshow),
}

impl UiState {
    pub fn cropping() -> Self {
        Self::Cropping {
            gesture: CropGesture::default(),
            pending: None,
        }
    }

    pub fn is_cropping(&self) -> bool {
        matches!(self, Self::Cropping { .. })
    }

    pub fn is_slideshow(&self) -> bool {
        matches!(self, Self::Slideshow(_))
    }

    /// Drops the rubber band and any region waiting for "Apply".
    ///
    /// A pending region belongs to the buffer it was mapped against, so
    /// this must run whenever the image changes. Crop mode stays on.
    pub fn discard_selection(&mut self) {
        if let Self::Cropping { gesture, pending } = self {
            gesture.cancel();
            *pending = None;
        }
    }
}

/// Which field of the resize window drives the new size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResizeMode {
    #[default]
    Width,
    Height,
    Percent,
    Exact,
}

/// Inputs of the resize window, seeded from the current image.
#[derive(Clone, Debug, PartialEq)]
pub struct ResizeDialog {
    pub source: (u32, u32),
    pub mode: ResizeMode,
    pub width: u32,
    pub height: u32,
    pub percent: f64,
    /// Only used when exporting a JPEG copy.
    pub quality: u8,
}

impl ResizeDialog {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            source: (width, height),
            mode: ResizeMode::default(),
            width,
            height,
            percent: 100.0,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn target(&self) -> ResizeTarget {
        match self.mode {
            ResizeMode::Width => ResizeTarget::Width(self.width),
            ResizeMode::Height => ResizeTarget::Height(self.height),
            ResizeMode::Percent => ResizeTarget::Percent(self.percent),
            ResizeMode::Exact => ResizeTarget::Exact {
                width: self.width,
                height: self.height,
            },
        }
    }

    /// The size the image would get, or why the inputs are unusable.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let (w, h) = self.source;
        ImageProcessor::resized_dimensions(w, h, self.target())
    }
}

/// Transient text shown in the status bar.
#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub text: String,
    pub until: Instant,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            until: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.until
    }
}
