//! Painting helpers and conversions between egui and engine coordinates.
//!
//! egui reports absolute window positions; the engine wants positions
//! relative to the label hosting the pixmap. [`CanvasLayout`] holds the
//! per-frame placement so both directions use the same numbers.

use eframe::egui;

use crate::geometry::{Pixmap, Point, Screen, SelectionRect, Size, ViewportSize};
use crate::transform::{label_size, pixmap_origin, Pan};

/// Where the label and pixmap sit in window coordinates this frame.
#[derive(Clone, Copy, Debug)]
pub struct CanvasLayout {
    /// Top-left of the label in window coordinates (viewport origin minus pan).
    pub label_origin: egui::Pos2,
    pub label: Size<Screen>,
    pub pixmap: Size<Pixmap>,
    /// The pixmap in window coordinates.
    pub image_rect: egui::Rect,
}

impl CanvasLayout {
    pub fn new(viewport_rect: egui::Rect, pixmap: Size<Pixmap>, pan: &Pan) -> Self {
        let label = label_size(viewport_size(viewport_rect), pixmap);
        let offset = pan.offset();
        let label_origin = viewport_rect.min - egui::vec2(offset.dx as f32, offset.dy as f32);
        let origin = pixmap_origin(label, pixmap);
        let image_rect = egui::Rect::from_min_size(
            label_origin + egui::vec2(origin.x as f32, origin.y as f32),
            egui::vec2(pixmap.width as f32, pixmap.height as f32),
        );
        Self {
            label_origin,
            label,
            pixmap,
            image_rect,
        }
    }

    pub fn to_label(&self, pos: egui::Pos2) -> Point<Screen> {
        Point::new(
            f64::from(pos.x - self.label_origin.x),
            f64::from(pos.y - self.label_origin.y),
        )
    }

    pub fn to_window(&self, rect: SelectionRect) -> egui::Rect {
        egui::Rect::from_min_max(
            self.label_origin + egui::vec2(rect.min.x as f32, rect.min.y as f32),
            self.label_origin + egui::vec2(rect.max.x as f32, rect.max.y as f32),
        )
    }
}

pub fn viewport_size(rect: egui::Rect) -> ViewportSize {
    Size::new(f64::from(rect.width()), f64::from(rect.height()))
}

/// Dims the pixmap outside the selection so the kept area stands out.
///
/// # Arguments
/// * `painter` - The egui painter to draw with
/// * `image_rect` - The pixmap in window coordinates
/// * `selection` - The rubber band in window coordinates
/// * `alpha` - Darkness level (0-255, higher = darker)
pub fn draw_crop_shade(
    painter: &egui::Painter,
    image_rect: egui::Rect,
    selection: egui::Rect,
    alpha: u8,
) {
    let color = egui::Color32::from_black_alpha(alpha);
    let keep = selection.intersect(image_rect);
    if !keep.is_positive() {
        painter.rect_filled(image_rect, 0.0, color);
        return;
    }

    let bands = [
        // above
        egui::Rect::from_min_max(image_rect.min, egui::pos2(image_rect.max.x, keep.min.y)),
        // below
        egui::Rect::from_min_max(egui::pos2(image_rect.min.x, keep.max.y), image_rect.max),
        // left
        egui::Rect::from_min_max(
            egui::pos2(image_rect.min.x, keep.min.y),
            egui::pos2(keep.min.x, keep.max.y),
        ),
        // right
        egui::Rect::from_min_max(
            egui::pos2(keep.max.x, keep.min.y),
            egui::pos2(image_rect.max.x, keep.max.y),
        ),
    ];
    for band in bands {
        if band.is_positive() {
            painter.rect_filled(band, 0.0, color);
        }
    }
}

/// Draws the rubber-band border.
pub fn draw_selection_border(painter: &egui::Painter, selection: egui::Rect, color: egui::Color32) {
    painter.rect_stroke(
        selection,
        0.0,
        egui::Stroke::new(1.5, color),
        egui::StrokeKind::Middle,
    );
}

/// Position for the "Apply crop" button: centered under the selection,
/// or above it when there is no room below.
///
/// Returns the anchor position and pivot alignment.
pub fn crop_button_position(
    selection: egui::Rect,
    viewport: egui::Rect,
    button_height: f32,
    spacing: f32,
) -> (egui::Pos2, egui::Align2) {
    let x = selection
        .center()
        .x
        .clamp(viewport.min.x + 40.0, (viewport.max.x - 40.0).max(viewport.min.x + 40.0));

    let below = selection.max.y + spacing;
    if below + button_height <= viewport.max.y {
        (egui::pos2(x, below), egui::Align2::CENTER_TOP)
    } else {
        (egui::pos2(x, selection.min.y - spacing), egui::Align2::CENTER_BOTTOM)
    }
}

/// File size as the status bar shows it: KB below one MiB, MB above.
pub fn format_file_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KIB * KIB {
        format!("{:.1} KB", bytes / KIB)
    } else {
        format!("{:.1} MB", bytes / (KIB * KIB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn from_window(layout: &CanvasLayout, rect: egui::Rect) -> SelectionRect {
        Rect::from_two_points(layout.to_label(rect.min), layout.to_label(rect.max))
    }

    #[test]
    fn layout_round_trips_window_points() {
        let viewport = egui::Rect::from_min_size(egui::pos2(0.0, 40.0), egui::vec2(600.0, 600.0));
        let layout = CanvasLayout::new(viewport, Size::new(500.0, 500.0), &Pan::default());
        assert_eq!(layout.image_rect.min, egui::pos2(50.0, 90.0));

        let window = egui::Rect::from_min_max(egui::pos2(150.0, 190.0), egui::pos2(350.0, 390.0));
        let sel = from_window(&layout, window);
        assert_eq!(sel.min, Point::new(150.0, 150.0));
        assert_eq!(layout.to_window(sel), window);
    }

    #[test]
    fn button_flips_above_near_bottom_edge() {
        let viewport = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0));
        let sel = egui::Rect::from_min_max(egui::pos2(100.0, 500.0), egui::pos2(300.0, 590.0));
        let (_, pivot) = crop_button_position(sel, viewport, 30.0, 8.0);
        assert_eq!(pivot, egui::Align2::CENTER_BOTTOM);
    }

    #[test]
    fn file_size_switches_unit_at_one_mebibyte() {
        assert_eq!(format_file_size(0), "0.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024 - 1), "1024.0 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024 / 2), "2.5 MB");
    }
}
