mod common;

use pixview_core::config::Config;
use pixview_core::document::Document;
use pixview_core::geometry::{CropRegion, Size};
use pixview_core::history::EditHistory;
use pixview_core::image_processing::{Adjustments, Edit};
use pixview_core::transform::{DisplayTransform, ZoomState};
use pixview_core::AppError;

use common::gradient_image;

fn edits() -> Vec<Edit> {
    vec![
        Edit::RotateRight,
        Edit::FlipHorizontal,
        Edit::Crop(CropRegion::new(2, 3, 10, 8)),
        Edit::Sepia,
        Edit::Invert,
        Edit::RotateLeft,
        Edit::Adjust(Adjustments {
            brightness: 20.0,
            contrast: -10.0,
            gamma: 1.2,
        }),
    ]
}

#[test]
fn test_n_edits_then_n_undos_restores_original() {
    let original = gradient_image(24, 16);
    let mut doc = Document::from_image(original.clone(), &Config::default());

    let ops = edits();
    for edit in &ops {
        doc.apply(*edit).unwrap();
    }
    assert_ne!(doc.image().as_bytes(), original.as_bytes());

    for _ in &ops {
        doc.undo().unwrap();
    }
    assert_eq!(doc.dimensions(), (24, 16));
    assert_eq!(doc.image().as_bytes(), original.as_bytes());
    assert!(!doc.can_undo());
    assert!(matches!(doc.undo(), Err(AppError::NothingToUndo)));
}

#[test]
fn test_undo_then_redo_is_identity() {
    let mut doc = Document::from_image(gradient_image(20, 10), &Config::default());
    doc.apply(Edit::RotateRight).unwrap();
    doc.apply(Edit::Grayscale).unwrap();
    let before_undo = doc.image().clone();

    doc.undo().unwrap();
    assert!(doc.can_redo());
    doc.redo().unwrap();

    assert_eq!(doc.image().as_bytes(), before_undo.as_bytes());
    assert_eq!(doc.dimensions(), (10, 20));
    assert!(matches!(doc.redo(), Err(AppError::NothingToRedo)));
}

#[test]
fn test_new_edit_clears_redo() {
    let mut doc = Document::from_image(gradient_image(8, 8), &Config::default());
    doc.apply(Edit::Invert).unwrap();
    doc.undo().unwrap();
    assert!(doc.can_redo());

    doc.apply(Edit::FlipVertical).unwrap();
    assert!(!doc.can_redo());
}

#[test]
fn test_failed_edit_is_not_recorded() {
    let original = gradient_image(10, 10);
    let mut doc = Document::from_image(original.clone(), &Config::default());

    let err = doc.commit_crop(CropRegion::new(5, 5, 10, 10)).unwrap_err();
    assert!(matches!(err, AppError::InvalidCrop(_)));
    assert!(!doc.can_undo());
    assert_eq!(doc.image().as_bytes(), original.as_bytes());
}

#[test]
fn test_history_depth_drops_oldest() {
    let config = Config::builder().with_history_depth(3).build().unwrap();
    let mut doc = Document::from_image(gradient_image(6, 4), &config);
    for _ in 0..5 {
        doc.apply(Edit::Invert).unwrap();
    }

    let mut undone = 0;
    while doc.undo().is_ok() {
        undone += 1;
    }
    assert_eq!(undone, 3);
}

#[test]
fn test_geometry_edits_return_to_fit() {
    let engine = DisplayTransform::default();
    let mut doc = Document::from_image(gradient_image(400, 200), &Config::default());
    doc.zoom = engine.zoom_to(doc.zoom, 3.0);

    doc.apply(Edit::Sepia).unwrap();
    assert!(!doc.zoom.fit_to_window);

    doc.apply(Edit::RotateRight).unwrap();
    assert!(doc.zoom.fit_to_window);

    let plan = doc.render_plan(Size::new(100.0, 100.0), &engine).unwrap();
    assert_eq!(plan.pixels(), (50, 100));
    assert_eq!(doc.zoom, ZoomState { factor: 0.25, fit_to_window: true });
}

#[test]
fn test_crop_commit_uses_source_region() {
    let mut doc = Document::from_image(gradient_image(40, 30), &Config::default());
    doc.commit_crop(CropRegion::new(10, 5, 20, 15)).unwrap();
    assert_eq!(doc.dimensions(), (20, 15));

    let rgb = doc.image().to_rgb8();
    // Top-left pixel of the crop came from (10, 5).
    assert_eq!(rgb.get_pixel(0, 0).0[0], 10);
    assert_eq!(rgb.get_pixel(0, 0).0[1], 5);
}

#[test]
fn test_edit_history_generic_stack() {
    let mut history = EditHistory::with_depth(2);
    history.record(1);
    history.record(2);
    history.record(3);
    assert_eq!(history.undo_len(), 2);

    assert_eq!(history.undo(4), Ok(3));
    assert_eq!(history.undo(3), Ok(2));
    assert_eq!(history.undo(2), Err(2));
    assert_eq!(history.redo(2), Ok(3));
    assert_eq!(history.redo(3), Ok(4));
    assert_eq!(history.redo(4), Err(4));
}
