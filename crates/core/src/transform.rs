//! Zoom and fit-to-window scaling.
//!
//! [`DisplayTransform`] turns an image size, a viewport size and a
//! [`ZoomState`] into the size the image must be painted at. It holds only
//! configuration; every call is plain O(1) arithmetic, so it is safe to run
//! on each live-resize tick.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::geometry::{ImageSize, Offset, Pixmap, Point, Screen, Size, ViewportSize};
use tracing::debug;

/// Slider range used by the status bar zoom control, in percent.
pub const SLIDER_MIN_PERCENT: u32 = 10;
pub const SLIDER_MAX_PERCENT: u32 = 800;

/// Current zoom mode and factor.
///
/// In fit mode `factor` is whatever the last render plan derived and is
/// only kept so labels and sliders can show the real on-screen scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomState {
    pub factor: f64,
    pub fit_to_window: bool,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::fit()
    }
}

impl ZoomState {
    pub const fn fit() -> Self {
        Self {
            factor: 1.0,
            fit_to_window: true,
        }
    }

    pub const fn manual(factor: f64) -> Self {
        Self {
            factor,
            fit_to_window: false,
        }
    }

    /// Zoom as a whole percentage for labels and the slider.
    ///
    /// Truncates, so a 41.67% fit reads `41`. The small bias keeps factors
    /// such as `0.29` (28.999...% in binary) from dropping a point.
    pub fn percent(&self) -> u32 {
        (self.factor * 100.0 + 1e-9).floor().max(0.0) as u32
    }
}

/// The size to paint the next frame at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderPlan {
    pub size: Size<Pixmap>,
    pub factor: f64,
}

impl RenderPlan {
    pub fn pixels(&self) -> (u32, u32) {
        self.size.to_pixels()
    }

    /// The effective factor as the status bar shows it.
    pub fn percent(&self) -> u32 {
        ZoomState::manual(self.factor).percent()
    }
}

/// Zoom limits and fit policy, derived from [`Config`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayTransform {
    min_zoom: f64,
    max_zoom: f64,
    step: f64,
    fit_upscale_cap: Option<f64>,
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl DisplayTransform {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            step: config.zoom_step,
            fit_upscale_cap: config.fit_upscale_cap,
        }
    }

    /// Computes the render size and writes the effective factor back into
    /// `zoom`.
    ///
    /// Calling it again with unchanged inputs yields the same plan and leaves
    /// `zoom` as it was. On degenerate input `zoom` is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DegenerateGeometry`] when the image or viewport has
    /// a zero dimension.
    pub fn compute_render_size(
        &self,
        image: ImageSize,
        viewport: ViewportSize,
        zoom: &mut ZoomState,
    ) -> Result<RenderPlan> {
        let plan = self.plan(image, viewport, *zoom)?;
        if zoom.fit_to_window {
            zoom.factor = plan.factor;
        }
        Ok(plan)
    }

    /// Pure form of [`Self::compute_render_size`].
    pub fn plan(&self, image: ImageSize, viewport: ViewportSize, zoom: ZoomState) -> Result<RenderPlan> {
        if image.is_degenerate() {
            return Err(AppError::degenerate(format!("image size {image}")));
        }
        if viewport.is_degenerate() {
            return Err(AppError::degenerate(format!("viewport size {viewport}")));
        }

        let factor = if zoom.fit_to_window {
            let fit_scale = (viewport.width / image.width).min(viewport.height / image.height);
            if fit_scale >= 1.0 {
                match self.fit_upscale_cap {
                    Some(cap) => fit_scale.min(cap),
                    None => 1.0,
                }
            } else {
                fit_scale
            }
        } else {
            zoom.factor
        };

        if !(factor.is_finite() && factor > 0.0) {
            return Err(AppError::degenerate(format!("zoom factor {factor}")));
        }

        let (w, h) = image.scaled(factor).to_pixels();
        let plan = RenderPlan {
            size: Size::from_u32(w, h),
            factor,
        };
        debug!(%image, %viewport, fit = zoom.fit_to_window, factor, w, h, "render plan");
        Ok(plan)
    }

    /// Clamps `requested` into the zoom bounds and leaves fit mode.
    ///
    /// Non-finite or non-positive requests leave `zoom` unchanged.
    pub fn zoom_to(&self, zoom: ZoomState, requested: f64) -> ZoomState {
        if !(requested.is_finite() && requested > 0.0) {
            return zoom;
        }
        ZoomState::manual(requested.clamp(self.min_zoom, self.max_zoom))
    }

    pub fn zoom_in(&self, zoom: ZoomState) -> ZoomState {
        self.zoom_to(zoom, zoom.factor * self.step)
    }

    pub fn zoom_out(&self, zoom: ZoomState) -> ZoomState {
        self.zoom_to(zoom, zoom.factor / self.step)
    }

    /// Returns to fit mode. The factor stays stale until the next
    /// [`Self::compute_render_size`].
    pub fn reset_to_fit(&self, zoom: ZoomState) -> ZoomState {
        ZoomState {
            factor: zoom.factor,
            fit_to_window: true,
        }
    }

    /// Applies a zoom slider position given in percent.
    pub fn from_slider_percent(&self, zoom: ZoomState, percent: u32) -> ZoomState {
        let percent = percent.clamp(SLIDER_MIN_PERCENT, SLIDER_MAX_PERCENT);
        self.zoom_to(zoom, f64::from(percent) / 100.0)
    }
}

/// Top-left of a pixmap centered inside a label of `label` size.
///
/// Negative components never occur in practice because the label is sized
/// to at least the pixmap; see [`label_size`].
pub fn pixmap_origin(label: Size<Screen>, pixmap: Size<Pixmap>) -> Point<Screen> {
    Point::new(
        (label.width - pixmap.width) / 2.0,
        (label.height - pixmap.height) / 2.0,
    )
}

/// The widget hosting the pixmap fills the viewport and grows with the
/// pixmap when zoomed in past it.
pub fn label_size(viewport: ViewportSize, pixmap: Size<Pixmap>) -> Size<Screen> {
    viewport.cast::<Screen>().max(pixmap.cast())
}

/// Scroll position of a pixmap larger than the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pan {
    offset: Offset<Pixmap>,
}

impl Pan {
    pub fn offset(&self) -> Offset<Pixmap> {
        self.offset
    }

    /// True when the pixmap overflows the viewport along either axis.
    pub fn is_pannable(viewport: ViewportSize, pixmap: Size<Pixmap>) -> bool {
        pixmap.width > viewport.width || pixmap.height > viewport.height
    }

    /// Moves against a pointer drag of `delta`, like a scroll area does.
    pub fn drag_by(&mut self, delta: Offset<Screen>, viewport: ViewportSize, pixmap: Size<Pixmap>) {
        self.offset = Offset::new(self.offset.dx - delta.dx, self.offset.dy - delta.dy);
        self.clamp(viewport, pixmap);
    }

    /// Keeps the offset within `[0, pixmap - viewport]` per axis.
    pub fn clamp(&mut self, viewport: ViewportSize, pixmap: Size<Pixmap>) {
        let max_x = (pixmap.width - viewport.width).max(0.0);
        let max_y = (pixmap.height - viewport.height).max(0.0);
        self.offset = Offset::new(self.offset.dx.clamp(0.0, max_x), self.offset.dy.clamp(0.0, max_y));
    }

    /// Centers the view, used after a zoom change.
    pub fn center(&mut self, viewport: ViewportSize, pixmap: Size<Pixmap>) {
        self.offset = Offset::new(
            ((pixmap.width - viewport.width) / 2.0).max(0.0),
            ((pixmap.height - viewport.height) / 2.0).max(0.0),
        );
    }

    pub fn reset(&mut self) {
        self.offset = Offset::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_mode_ignores_viewport_shape() {
        let engine = DisplayTransform::default();
        let mut zoom = ZoomState::manual(2.0);
        let plan = engine
            .compute_render_size(Size::new(100.0, 50.0), Size::new(10.0, 10.0), &mut zoom)
            .unwrap();
        assert_eq!(plan.pixels(), (200, 100));
        assert_eq!(zoom.factor, 2.0);
    }

    #[test]
    fn degenerate_input_leaves_zoom_untouched() {
        let engine = DisplayTransform::default();
        let mut zoom = ZoomState {
            factor: 0.5,
            fit_to_window: true,
        };
        let err = engine
            .compute_render_size(Size::new(0.0, 50.0), Size::new(10.0, 10.0), &mut zoom)
            .unwrap_err();
        assert!(matches!(err, AppError::DegenerateGeometry(_)));
        assert_eq!(zoom.factor, 0.5);
    }

    #[test]
    fn slider_is_clamped_to_its_range() {
        let engine = DisplayTransform::default();
        let zoom = engine.from_slider_percent(ZoomState::fit(), 5);
        assert!(!zoom.fit_to_window);
        assert_eq!(zoom.percent(), 10);
    }

    #[test]
    fn percent_truncates_like_the_zoom_label() {
        assert_eq!(ZoomState::manual(800.0 / 1920.0).percent(), 41);
        assert_eq!(ZoomState::manual(0.999).percent(), 99);
        assert_eq!(ZoomState::manual(0.29).percent(), 29);
        assert_eq!(ZoomState::manual(2.5).percent(), 250);
    }

    #[test]
    fn pan_center_splits_the_overflow() {
        let mut pan = Pan::default();
        pan.center(Size::new(100.0, 100.0), Size::new(300.0, 80.0));
        assert_eq!(pan.offset(), Offset::new(100.0, 0.0));
    }

    #[test]
    fn pan_stays_within_overflow() {
        let viewport = Size::new(100.0, 100.0);
        let pixmap = Size::new(300.0, 80.0);
        let mut pan = Pan::default();
        pan.drag_by(Offset::new(-500.0, -500.0), viewport, pixmap);
        assert_eq!(pan.offset(), Offset::new(200.0, 0.0));
        pan.drag_by(Offset::new(50.0, 0.0), viewport, pixmap);
        assert_eq!(pan.offset(), Offset::new(150.0, 0.0));
    }
}
