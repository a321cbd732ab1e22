use approx::assert_relative_eq;

use pixview_core::config::Config;
use pixview_core::geometry::Size;
use pixview_core::transform::{label_size, pixmap_origin, DisplayTransform, Pan, ZoomState};
use pixview_core::AppError;

#[test]
fn test_render_size_is_idempotent() {
    let engine = DisplayTransform::default();
    let image = Size::from_u32(3000, 2000);
    let viewport = Size::new(1024.0, 700.0);

    let mut zoom = ZoomState::fit();
    let first = engine.compute_render_size(image, viewport, &mut zoom).unwrap();
    let zoom_after_first = zoom;
    let second = engine.compute_render_size(image, viewport, &mut zoom).unwrap();

    assert_eq!(first, second);
    assert_eq!(zoom, zoom_after_first);
    assert_eq!(first.factor.to_bits(), second.factor.to_bits());
}

#[test]
fn test_fit_never_upscales_past_native() {
    let engine = DisplayTransform::default();
    let mut zoom = ZoomState::fit();
    let plan = engine
        .compute_render_size(Size::from_u32(800, 600), Size::new(2000.0, 2000.0), &mut zoom)
        .unwrap();

    assert_eq!(plan.pixels(), (800, 600));
    assert_eq!(plan.factor, 1.0);
    assert_eq!(zoom.factor, 1.0);
    assert!(zoom.fit_to_window);
}

#[test]
fn test_fit_downscale_preserves_aspect() {
    let engine = DisplayTransform::default();

    let mut zoom = ZoomState::fit();
    let plan = engine
        .compute_render_size(Size::from_u32(1920, 1080), Size::new(800.0, 450.0), &mut zoom)
        .unwrap();
    assert_eq!(plan.pixels(), (800, 450));
    assert_relative_eq!(plan.factor, 800.0 / 1920.0, epsilon = 1e-12);

    let mut zoom = ZoomState::fit();
    let plan = engine
        .compute_render_size(Size::from_u32(1920, 1080), Size::new(800.0, 600.0), &mut zoom)
        .unwrap();
    assert_eq!(plan.pixels(), (800, 450));
    assert_relative_eq!(zoom.factor, 800.0 / 1920.0, epsilon = 1e-12);
}

#[test]
fn test_fit_upscale_cap_enlarges_small_images() {
    let config = Config::builder().with_fit_upscale_cap(Some(1.5)).build().unwrap();
    let engine = DisplayTransform::from_config(&config);

    let mut zoom = ZoomState::fit();
    let plan = engine
        .compute_render_size(Size::from_u32(400, 300), Size::new(2000.0, 2000.0), &mut zoom)
        .unwrap();
    assert_eq!(plan.pixels(), (600, 450));
    assert_relative_eq!(zoom.factor, 1.5);
}

#[test]
fn test_manual_zoom_ignores_viewport() {
    let engine = DisplayTransform::default();
    let mut zoom = engine.zoom_to(ZoomState::fit(), 2.0);
    let plan = engine
        .compute_render_size(Size::from_u32(640, 480), Size::new(100.0, 100.0), &mut zoom)
        .unwrap();

    assert_eq!(plan.pixels(), (1280, 960));
    assert!(!zoom.fit_to_window);
    assert_eq!(zoom.factor, 2.0);
}

#[test]
fn test_tiny_render_size_is_at_least_one_pixel() {
    let engine = DisplayTransform::default();
    let mut zoom = engine.zoom_to(ZoomState::fit(), 0.1);
    let plan = engine
        .compute_render_size(Size::from_u32(3, 2), Size::new(500.0, 500.0), &mut zoom)
        .unwrap();
    assert_eq!(plan.pixels(), (1, 1));
}

#[test]
fn test_degenerate_input_leaves_zoom_untouched() {
    let engine = DisplayTransform::default();
    let mut zoom = ZoomState {
        factor: 0.75,
        fit_to_window: true,
    };

    let err = engine
        .compute_render_size(Size::from_u32(0, 100), Size::new(800.0, 600.0), &mut zoom)
        .unwrap_err();
    assert!(matches!(err, AppError::DegenerateGeometry(_)));

    let err = engine
        .compute_render_size(Size::from_u32(100, 100), Size::new(800.0, 0.0), &mut zoom)
        .unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(zoom.factor, 0.75);
}

#[test]
fn test_zoom_in_is_bounded() {
    let engine = DisplayTransform::default();
    let mut zoom = ZoomState::manual(1.0);
    for _ in 0..50 {
        zoom = engine.zoom_in(zoom);
        assert!(zoom.factor <= 8.0);
    }
    assert_eq!(zoom.factor, 8.0);
}

#[test]
fn test_zoom_out_is_bounded() {
    let engine = DisplayTransform::default();
    let mut zoom = ZoomState::manual(1.0);
    for _ in 0..50 {
        zoom = engine.zoom_out(zoom);
        assert!(zoom.factor >= 0.1);
    }
    assert_eq!(zoom.factor, 0.1);
}

#[test]
fn test_zoom_in_then_out_returns_to_start() {
    let engine = DisplayTransform::default();
    let start = ZoomState::manual(0.6);
    let back = engine.zoom_out(engine.zoom_in(start));
    assert_relative_eq!(back.factor, 0.6, epsilon = 1e-12);
}

#[test]
fn test_zoom_from_fit_uses_effective_factor() {
    let engine = DisplayTransform::default();
    let mut zoom = ZoomState::fit();
    engine
        .compute_render_size(Size::from_u32(2000, 1000), Size::new(1000.0, 1000.0), &mut zoom)
        .unwrap();
    assert_relative_eq!(zoom.factor, 0.5);

    let zoomed = engine.zoom_in(zoom);
    assert!(!zoomed.fit_to_window);
    assert_relative_eq!(zoomed.factor, 0.625);
}

#[test]
fn test_non_finite_zoom_request_is_ignored() {
    let engine = DisplayTransform::default();
    let zoom = ZoomState::manual(2.0);
    assert_eq!(engine.zoom_to(zoom, f64::NAN), zoom);
    assert_eq!(engine.zoom_to(zoom, f64::INFINITY), zoom);
    assert_eq!(engine.zoom_to(zoom, -1.0), zoom);
}

#[test]
fn test_slider_maps_percent_to_factor() {
    let engine = DisplayTransform::default();
    let zoom = engine.from_slider_percent(ZoomState::fit(), 250);
    assert_relative_eq!(zoom.factor, 2.5);
    assert_eq!(zoom.percent(), 250);

    let zoom = engine.from_slider_percent(ZoomState::fit(), 5000);
    assert_eq!(zoom.factor, 8.0);
}

#[test]
fn test_fit_percent_truncates() {
    let engine = DisplayTransform::default();
    let mut zoom = ZoomState::fit();
    let plan = engine
        .compute_render_size(Size::from_u32(1920, 1080), Size::new(800.0, 600.0), &mut zoom)
        .unwrap();

    assert_eq!(plan.pixels(), (800, 450));
    assert_eq!(plan.percent(), 41);
    assert_eq!(zoom.percent(), 41);
}

#[test]
fn test_reset_to_fit_recomputes_factor() {
    let engine = DisplayTransform::default();
    let mut zoom = engine.reset_to_fit(ZoomState::manual(4.0));
    assert!(zoom.fit_to_window);
    engine
        .compute_render_size(Size::from_u32(1600, 1200), Size::new(800.0, 600.0), &mut zoom)
        .unwrap();
    assert_relative_eq!(zoom.factor, 0.5);
}

#[test]
fn test_letterbox_origin_centers_pixmap() {
    let label = label_size(Size::new(600.0, 600.0), Size::new(500.0, 500.0));
    let origin = pixmap_origin(label, Size::new(500.0, 500.0));
    assert_eq!((origin.x, origin.y), (50.0, 50.0));

    // Zoomed past the viewport: the label grows, no margin remains.
    let label = label_size(Size::new(600.0, 600.0), Size::new(1200.0, 400.0));
    assert_eq!((label.width, label.height), (1200.0, 600.0));
    let origin = pixmap_origin(label, Size::new(1200.0, 400.0));
    assert_eq!((origin.x, origin.y), (0.0, 100.0));
}

#[test]
fn test_pan_is_clamped_to_overflow() {
    let viewport = Size::new(800.0, 600.0);
    let pixmap = Size::new(1600.0, 600.0);
    assert!(Pan::is_pannable(viewport, pixmap));

    let mut pan = Pan::default();
    pan.drag_by(pixview_core::geometry::Offset::new(-5000.0, -100.0), viewport, pixmap);
    assert_eq!(pan.offset().dx, 800.0);
    assert_eq!(pan.offset().dy, 0.0);

    pan.drag_by(pixview_core::geometry::Offset::new(300.0, 0.0), viewport, pixmap);
    assert_eq!(pan.offset().dx, 500.0);
}
