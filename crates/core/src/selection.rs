//! Crop selection handling and coordinate mapping.
//!
//! This module contains the crop gesture state machine and the mapping from
//! a rubber-band rectangle in widget coordinates to a [`CropRegion`] in
//! source pixels.
//!
//! # Coordinate Mapping
//!
//! The rendered pixmap is centered inside its hosting widget, which can be
//! larger than the pixmap (letterboxing) when the aspect ratios of viewport
//! and image differ. A drag is first shifted into pixmap-local space, clipped
//! to the pixmap, and then scaled up to image pixels. The two axes are scaled
//! independently: rounding the render size to whole pixels makes them differ
//! slightly even though rendering preserves aspect ratio.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::geometry::{CropRegion, ImageSize, Offset, Pixmap, Point, Rect, Screen, SelectionRect, Size};
use crate::transform::pixmap_origin;
use tracing::debug;

/// Maps finished crop gestures to source pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropMapper {
    min_selection: f64,
}

impl Default for CropMapper {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CropMapper {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_selection: config.min_selection,
        }
    }

    /// Maps a drag from `start` to `end`.
    ///
    /// A drag that ends where it started is a click and cancels the gesture
    /// instead of producing a 0x0 region.
    ///
    /// # Errors
    ///
    /// [`AppError::SelectionCancelled`] for a click, otherwise the errors of
    /// [`Self::screen_to_source`].
    pub fn map_drag(
        &self,
        start: Point<Screen>,
        end: Point<Screen>,
        label: Size<Screen>,
        pixmap: Size<Pixmap>,
        image: ImageSize,
    ) -> Result<CropRegion> {
        if start == end {
            return Err(AppError::SelectionCancelled);
        }
        self.screen_to_source(Rect::from_two_points(start, end), label, pixmap, image)
    }

    /// Converts a selection in widget coordinates to a crop region.
    ///
    /// Parts of the selection over the letterbox margin or beyond the widget
    /// are clipped away; the result always lies inside the image.
    ///
    /// # Arguments
    /// * `selection` - The dragged rectangle, relative to the widget
    /// * `label` - Size of the widget hosting the pixmap
    /// * `pixmap` - Size the image is currently rendered at
    /// * `image` - Size of the source image
    ///
    /// # Errors
    ///
    /// - [`AppError::DegenerateGeometry`] if the pixmap or image has a zero side
    /// - [`AppError::EmptySelection`] if the clipped selection is not larger
    ///   than the minimum selection size along both axes
    pub fn screen_to_source(
        &self,
        selection: SelectionRect,
        label: Size<Screen>,
        pixmap: Size<Pixmap>,
        image: ImageSize,
    ) -> Result<CropRegion> {
        if pixmap.is_degenerate() {
            return Err(AppError::degenerate(format!("pixmap size {pixmap}")));
        }
        if image.is_degenerate() {
            return Err(AppError::degenerate(format!("image size {image}")));
        }

        let origin = pixmap_origin(label, pixmap);
        let local: Rect<Pixmap> = selection
            .translate(Offset::new(-origin.x, -origin.y))
            .cast();
        let clipped = local.intersect(&Rect::from_min_size(Point::new(0.0, 0.0), pixmap));

        if clipped.width() <= self.min_selection || clipped.height() <= self.min_selection {
            debug!(
                w = clipped.width(),
                h = clipped.height(),
                min = self.min_selection,
                "selection too small"
            );
            return Err(AppError::EmptySelection);
        }

        let scale_x = image.width / pixmap.width;
        let scale_y = image.height / pixmap.height;

        // `as u32` saturates: negatives become 0, overflow becomes u32::MAX.
        let (img_w, img_h) = (image.width as u32, image.height as u32);
        let x = ((clipped.min.x * scale_x).floor() as u32).min(img_w);
        let y = ((clipped.min.y * scale_y).floor() as u32).min(img_h);
        let w = ((clipped.width() * scale_x).floor() as u32).min(img_w - x);
        let h = ((clipped.height() * scale_y).floor() as u32).min(img_h - y);

        if w == 0 || h == 0 {
            return Err(AppError::EmptySelection);
        }

        let region = CropRegion::new(x, y, w, h);
        debug!(%region, scale_x, scale_y, "selection mapped to source");
        Ok(region)
    }
}

/// Result of feeding a pointer event into a [`CropGesture`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    /// User started a new selection drag.
    Started,
    /// User is actively dragging.
    Dragging,
    /// User completed a drag with distinct start and end points.
    Completed(SelectionRect),
    /// User released without moving, or the gesture was aborted.
    Cancelled,
    /// No selection event occurred.
    None,
}

/// Pointer-down, drag, pointer-up sequence defining a candidate crop.
///
/// The rectangle is only meaningful while a gesture is in progress or
/// right after it completed; [`Self::cancel`] discards it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CropGesture {
    start: Option<Point<Screen>>,
    current: Option<Point<Screen>>,
    finalized: bool,
}

impl CropGesture {
    pub fn press(&mut self, at: Point<Screen>) -> SelectionEvent {
        self.start = Some(at);
        self.current = Some(at);
        self.finalized = false;
        SelectionEvent::Started
    }

    pub fn drag(&mut self, to: Point<Screen>) -> SelectionEvent {
        if self.start.is_none() || self.finalized {
            return SelectionEvent::None;
        }
        self.current = Some(to);
        SelectionEvent::Dragging
    }

    pub fn release(&mut self, at: Point<Screen>) -> SelectionEvent {
        let Some(start) = self.start else {
            return SelectionEvent::None;
        };
        if self.finalized {
            return SelectionEvent::None;
        }
        if start == at {
            self.cancel();
            return SelectionEvent::Cancelled;
        }
        self.current = Some(at);
        self.finalized = true;
        SelectionEvent::Completed(Rect::from_two_points(start, at))
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// True between press and release.
    pub fn is_dragging(&self) -> bool {
        self.start.is_some() && !self.finalized
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The normalised rubber-band rectangle, if any.
    pub fn selection(&self) -> Option<SelectionRect> {
        match (self.start, self.current) {
            (Some(s), Some(c)) => Some(Rect::from_two_points(s, c)),
            _ => None,
        }
    }
}
