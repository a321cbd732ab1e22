//! Main viewer application.
//!
//! This module contains the `ViewerApp` struct which implements the
//! `eframe::App` trait. It only stores engine values and feeds them back in;
//! all geometry is computed by [`crate::transform`] and [`crate::selection`].

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::rendering::{
    crop_button_position, draw_crop_shade, draw_selection_border, format_file_size, viewport_size,
    CanvasLayout,
};
use super::settings::Settings;
use super::state::{ResizeDialog, ResizeMode, StatusMessage, UiState};
use crate::config::Config;
use crate::document::Document;
use crate::error::{AppError, Result};
use crate::gallery::{FolderNavigator, Slideshow, SlideshowTick, SUPPORTED_IMAGE_EXTENSIONS};
use crate::geometry::{CropRegion, Offset};
use crate::image_processing::{Adjustments, Edit, ImageProcessor};
use crate::selection::{CropMapper, SelectionEvent};
use crate::transform::{DisplayTransform, Pan, ZoomState, SLIDER_MAX_PERCENT, SLIDER_MIN_PERCENT};
use eframe::egui;
use tracing::{debug, warn};

const STATUS_TTL: Duration = Duration::from_secs(3);
const ERROR_TTL: Duration = Duration::from_secs(5);
const MAX_RESIZE_SIDE: u32 = 20_000;

/// The image viewer application.
pub struct ViewerApp {
    config: Config,
    engine: DisplayTransform,
    mapper: CropMapper,

    // Image state
    document: Option<Document>,
    texture: Option<egui::TextureHandle>,
    texture_dirty: bool,

    // Navigation
    nav: FolderNavigator,

    // Interaction
    state: UiState,
    pan: Pan,
    /// Center the view on the next frame, after a zoom step.
    recenter: bool,

    // Chrome
    settings: Settings,
    status: Option<StatusMessage>,
    resize_dialog: Option<ResizeDialog>,
    adjust_dialog: Option<Adjustments>,
    show_info: bool,
}

impl ViewerApp {
    /// Creates a viewer, optionally opening `path` right away.
    pub fn new(config: Config, path: Option<PathBuf>) -> Self {
        let mut app = Self {
            engine: DisplayTransform::from_config(&config),
            mapper: CropMapper::from_config(&config),
            config,
            document: None,
            texture: None,
            texture_dirty: false,
            nav: FolderNavigator::default(),
            state: UiState::Viewing,
            pan: Pan::default(),
            recenter: false,
            settings: Settings::load(),
            status: None,
            resize_dialog: None,
            adjust_dialog: None,
            show_info: false,
        };
        if let Some(path) = path {
            app.open(&path);
        }
        app
    }

    fn open(&mut self, path: &Path) {
        match Document::open(path, &self.config) {
            Ok(doc) => {
                self.document = Some(doc);
                self.image_changed();
                self.pan.reset();
                if !self.state.is_slideshow() {
                    self.state = UiState::Viewing;
                }
                self.settings.remember_directory_of(path);
                self.persist_settings();
                match FolderNavigator::for_file(path) {
                    Ok(nav) => self.nav = nav,
                    Err(e) => warn!(error = %e, "folder scan failed"),
                }
            }
            Err(e) => self.report(&e),
        }
    }

    /// The buffer was replaced: re-upload it and drop any crop selection
    /// mapped against the old one.
    fn image_changed(&mut self) {
        self.texture_dirty = true;
        self.state.discard_selection();
    }

    fn persist_settings(&self) {
        if let Err(e) = self.settings.save() {
            warn!(error = %e, "failed to save settings");
        }
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage::new(text, STATUS_TTL));
    }

    /// Shows an error unless it only means "nothing happens".
    fn report(&mut self, err: &AppError) {
        if err.is_recoverable() {
            debug!(error = %err, "ignored");
            return;
        }
        warn!(error = %err, "operation failed");
        self.status = Some(StatusMessage::new(format!("Error: {err}"), ERROR_TTL));
    }

    fn edit(&mut self, edit: Edit) {
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        match doc.apply(edit) {
            Ok(()) => {
                self.image_changed();
                if edit.changes_geometry() {
                    self.pan.reset();
                }
                self.set_status(format!("Applied {edit}"));
            }
            Err(e) => self.report(&e),
        }
    }

    fn commit_crop(&mut self, region: CropRegion) {
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        match doc.commit_crop(region) {
            Ok(()) => {
                self.state = UiState::Viewing;
                self.image_changed();
                self.pan.reset();
                self.set_status(format!("Cropped to {}x{}", region.w, region.h));
            }
            Err(e) => self.report(&e),
        }
    }

    fn undo(&mut self) {
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        match doc.undo() {
            Ok(()) => self.image_changed(),
            Err(e) => self.report(&e),
        }
    }

    fn redo(&mut self) {
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        match doc.redo() {
            Ok(()) => self.image_changed(),
            Err(e) => self.report(&e),
        }
    }

    fn zoom_with(&mut self, f: impl FnOnce(&DisplayTransform, ZoomState) -> ZoomState) {
        if let Some(doc) = self.document.as_mut() {
            doc.zoom = f(&self.engine, doc.zoom);
            self.recenter = true;
        }
    }

    fn fit_to_window(&mut self) {
        self.zoom_with(DisplayTransform::reset_to_fit);
        self.recenter = false;
        self.pan.reset();
    }

    fn navigate(&mut self, forward: bool) {
        let next = if forward { self.nav.next() } else { self.nav.previous() };
        match next.map(Path::to_path_buf) {
            Ok(path) => self.open(&path),
            Err(e) => self.report(&e),
        }
    }

    fn toggle_crop_mode(&mut self) {
        if self.state.is_cropping() {
            self.state = UiState::Viewing;
            self.set_status("Crop mode disabled.");
        } else if self.document.is_some() {
            self.state = UiState::cropping();
            self.set_status("Crop mode enabled. Drag to select an area.");
        }
    }

    fn start_slideshow(&mut self, ctx: &egui::Context) {
        match Slideshow::start(&self.nav, self.config.slideshow_interval, Instant::now()) {
            Ok(show) => {
                let secs = show.interval().as_secs_f32();
                self.state = UiState::Slideshow(show);
                ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(true));
                self.set_status(format!("Slideshow started ({secs:.0}s per image). Esc to stop."));
            }
            Err(e) => self.report(&e),
        }
    }

    fn stop_slideshow(&mut self, ctx: &egui::Context) {
        if self.state.is_slideshow() {
            self.state = UiState::Viewing;
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(false));
            self.set_status("Slideshow stopped.");
        }
    }

    fn tick_slideshow(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let tick = match &mut self.state {
            UiState::Slideshow(show) => {
                let tick = show.tick(&mut self.nav, now);
                ctx.request_repaint_after(show.remaining(now));
                tick
            }
            _ => return,
        };
        match tick {
            SlideshowTick::Wait => {}
            SlideshowTick::Show(path) => self.open(&path),
            SlideshowTick::Finished => self.stop_slideshow(ctx),
        }
    }

    fn open_dialog(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("Images", SUPPORTED_IMAGE_EXTENSIONS);
        if let Some(dir) = self.settings.last_directory() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.pick_file() {
            self.open(&path);
        }
    }

    fn save_as_dialog(&mut self) {
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        let mut dialog = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("JPG", &["jpg", "jpeg"])
            .add_filter("BMP", &["bmp"]);
        if let Some(name) = doc.file_name() {
            dialog = dialog.set_file_name(name);
        }
        if let Some(dir) = self.settings.last_directory() {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };
        match doc.save_as(&path, None) {
            Ok(()) => {
                self.settings.remember_directory_of(&path);
                self.persist_settings();
                self.set_status(format!("Image saved to {}", path.display()));
            }
            Err(e) => self.report(&e),
        }
    }

    fn copy_to_clipboard(&mut self) -> Result<()> {
        let Some(doc) = self.document.as_ref() else {
            return Ok(());
        };
        let rgba = ImageProcessor::to_rgba(doc.image());
        let data = arboard::ImageData {
            width: rgba.width() as usize,
            height: rgba.height() as usize,
            bytes: std::borrow::Cow::Borrowed(rgba.as_raw()),
        };
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_image(data))
            .map_err(|e| AppError::Clipboard(e.to_string()))?;
        self.set_status("Image copied to clipboard");
        Ok(())
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, Modifiers};

        let pressed = |key: Key| ctx.input_mut(|i| i.consume_key(Modifiers::NONE, key));
        let command = |key: Key| ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, key));

        if pressed(Key::Escape) {
            // Slideshow first, then the gesture, then crop mode itself.
            let has_selection = matches!(
                &self.state,
                UiState::Cropping { gesture, .. } if gesture.selection().is_some()
            );
            if self.state.is_slideshow() {
                self.stop_slideshow(ctx);
            } else if has_selection {
                self.state.discard_selection();
            } else if self.state.is_cropping() {
                self.toggle_crop_mode();
            }
        }

        if self.state.is_slideshow() {
            return;
        }

        if command(Key::Plus) || command(Key::Equals) {
            self.zoom_with(DisplayTransform::zoom_in);
        }
        if command(Key::Minus) {
            self.zoom_with(DisplayTransform::zoom_out);
        }
        if command(Key::Num0) {
            self.fit_to_window();
        }
        if command(Key::Z) {
            self.undo();
        }
        if command(Key::Y) {
            self.redo();
        }
        if command(Key::O) {
            self.open_dialog();
        }
        if command(Key::S) {
            self.save_as_dialog();
        }
        if command(Key::C) {
            if let Err(e) = self.copy_to_clipboard() {
                self.report(&e);
            }
        }
        if pressed(Key::ArrowRight) {
            self.navigate(true);
        }
        if pressed(Key::ArrowLeft) {
            self.navigate(false);
        }
        if pressed(Key::C) {
            self.toggle_crop_mode();
        }
        if pressed(Key::R) {
            self.edit(Edit::RotateRight);
        }
        if pressed(Key::L) {
            self.edit(Edit::RotateLeft);
        }
        if pressed(Key::F5) {
            self.start_slideshow(ctx);
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let has_image = self.document.is_some();
        let (can_undo, can_redo) = self
            .document
            .as_ref()
            .map(|d| (d.can_undo(), d.can_redo()))
            .unwrap_or((false, false));

        ui.horizontal(|ui| {
            if ui.button("Open").clicked() {
                self.open_dialog();
            }
            if ui.add_enabled(has_image, egui::Button::new("Save As")).clicked() {
                self.save_as_dialog();
            }
            if ui.add_enabled(has_image, egui::Button::new("Copy")).clicked() {
                if let Err(e) = self.copy_to_clipboard() {
                    self.report(&e);
                }
            }
            ui.separator();

            if ui.add_enabled(self.nav.has_previous(), egui::Button::new("◀")).clicked() {
                self.navigate(false);
            }
            if ui.add_enabled(self.nav.has_next(), egui::Button::new("▶")).clicked() {
                self.navigate(true);
            }
            if ui.add_enabled(self.nav.len() > 1, egui::Button::new("Slideshow")).clicked() {
                self.start_slideshow(ctx);
            }
            ui.separator();

            ui.add_enabled_ui(has_image, |ui| {
                if ui.button("−").clicked() {
                    self.zoom_with(DisplayTransform::zoom_out);
                }
                if ui.button("+").clicked() {
                    self.zoom_with(DisplayTransform::zoom_in);
                }
                if ui.button("Fit").clicked() {
                    self.fit_to_window();
                }
                ui.separator();
                if ui.button("⟲").clicked() {
                    self.edit(Edit::RotateLeft);
                }
                if ui.button("⟳").clicked() {
                    self.edit(Edit::RotateRight);
                }
                if ui.button("⇔").clicked() {
                    self.edit(Edit::FlipHorizontal);
                }
                if ui.button("⇕").clicked() {
                    self.edit(Edit::FlipVertical);
                }
                if ui.selectable_label(self.state.is_cropping(), "Crop").clicked() {
                    self.toggle_crop_mode();
                }
                ui.menu_button("Effects", |ui| {
                    for (label, edit) in [
                        ("Grayscale", Edit::Grayscale),
                        ("Sepia", Edit::Sepia),
                        ("Invert", Edit::Invert),
                        ("Blur", Edit::Blur { sigma: 2.0 }),
                        ("Sharpen", Edit::Sharpen { sigma: 1.5, threshold: 2 }),
                    ] {
                        if ui.button(label).clicked() {
                            self.edit(edit);
                            ui.close();
                        }
                    }
                    ui.separator();
                    if ui.button("Brightness / Contrast / Gamma…").clicked() {
                        self.adjust_dialog = Some(Adjustments::default());
                        ui.close();
                    }
                });
                if ui.button("Resize…").clicked() {
                    self.resize_dialog = self
                        .document
                        .as_ref()
                        .map(|d| {
                            let (w, h) = d.dimensions();
                            ResizeDialog::new(w, h)
                        });
                }
                if ui.selectable_label(self.show_info, "Info").clicked() {
                    self.show_info = !self.show_info;
                }
            });
            ui.separator();

            if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                self.undo();
            }
            if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                self.redo();
            }
            ui.separator();
            if ui.checkbox(&mut self.settings.filmstrip_visible, "Filmstrip").changed() {
                self.persist_settings();
            }
        });
    }

    fn render_status_bar(&mut self, ui: &mut egui::Ui) {
        if self
            .status
            .as_ref()
            .is_some_and(|s| s.is_expired(Instant::now()))
        {
            self.status = None;
        }

        ui.horizontal(|ui| {
            if let Some(doc) = self.document.as_mut() {
                let (w, h) = doc.dimensions();
                ui.label(doc.file_name().unwrap_or_else(|| "untitled".to_string()));
                ui.separator();
                ui.label(format!("{w} x {h}"));
                if let Some(bytes) = doc.file_size() {
                    ui.separator();
                    ui.label(format_file_size(bytes));
                }
                ui.separator();
                ui.label(format!("{}%", doc.zoom.percent()));

                let mut percent = doc.zoom.percent().clamp(SLIDER_MIN_PERCENT, SLIDER_MAX_PERCENT);
                let slider = ui.add(
                    egui::Slider::new(&mut percent, SLIDER_MIN_PERCENT..=SLIDER_MAX_PERCENT)
                        .show_value(false),
                );
                if slider.changed() {
                    doc.zoom = self.engine.from_slider_percent(doc.zoom, percent);
                }
            }
            if let Some(status) = &self.status {
                ui.separator();
                ui.label(&status.text);
            }
        });
    }

    fn render_filmstrip(&mut self, ui: &mut egui::Ui) {
        let mut selected = None;
        egui::ScrollArea::horizontal().show(ui, |ui| {
            ui.horizontal(|ui| {
                for (i, path) in self.nav.files().iter().enumerate() {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    if ui.selectable_label(self.nav.index() == Some(i), name).clicked() {
                        selected = Some(i);
                    }
                }
            });
        });
        if let Some(i) = selected {
            match self.nav.select(i).map(Path::to_path_buf) {
                Ok(path) => self.open(&path),
                Err(e) => self.report(&e),
            }
        }
    }

    fn render_resize_window(&mut self, ctx: &egui::Context) {
        let Some(current) = self.document.as_ref().map(Document::dimensions) else {
            self.resize_dialog = None;
            return;
        };
        let Some(dialog) = self.resize_dialog.as_mut() else {
            return;
        };
        // An edit or undo behind the window changed the size it was seeded from.
        if dialog.source != current {
            *dialog = ResizeDialog::new(current.0, current.1);
        }

        let mut open = true;
        let mut apply = false;
        let mut export = false;
        egui::Window::new("Resize")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Current size: {} x {}", current.0, current.1));
                ui.horizontal(|ui| {
                    ui.radio_value(&mut dialog.mode, ResizeMode::Width, "Width");
                    ui.radio_value(&mut dialog.mode, ResizeMode::Height, "Height");
                    ui.radio_value(&mut dialog.mode, ResizeMode::Percent, "Percentage");
                    ui.radio_value(&mut dialog.mode, ResizeMode::Exact, "Exact");
                });
                match dialog.mode {
                    ResizeMode::Width => {
                        ui.add(egui::DragValue::new(&mut dialog.width).range(1..=MAX_RESIZE_SIDE).suffix(" px"));
                    }
                    ResizeMode::Height => {
                        ui.add(egui::DragValue::new(&mut dialog.height).range(1..=MAX_RESIZE_SIDE).suffix(" px"));
                    }
                    ResizeMode::Percent => {
                        ui.add(egui::Slider::new(&mut dialog.percent, 1.0..=200.0).suffix("%"));
                    }
                    ResizeMode::Exact => {
                        ui.horizontal(|ui| {
                            ui.add(egui::DragValue::new(&mut dialog.width).range(1..=MAX_RESIZE_SIDE));
                            ui.label("x");
                            ui.add(egui::DragValue::new(&mut dialog.height).range(1..=MAX_RESIZE_SIDE));
                        });
                    }
                }
                ui.add(egui::Slider::new(&mut dialog.quality, 1..=100).text("JPEG quality"));

                let valid = match dialog.dimensions() {
                    Ok((w, h)) => {
                        ui.label(format!("New size: {w} x {h}"));
                        true
                    }
                    Err(e) => {
                        ui.colored_label(egui::Color32::LIGHT_RED, e.to_string());
                        false
                    }
                };
                ui.horizontal(|ui| {
                    apply = ui.add_enabled(valid, egui::Button::new("Apply")).clicked();
                    export = ui.add_enabled(valid, egui::Button::new("Save copy…")).clicked();
                });
            });

        let request = dialog.dimensions().ok().map(|dims| (dims, dialog.quality));
        if !open || apply || export {
            self.resize_dialog = None;
        }
        let Some(((width, height), quality)) = request else {
            return;
        };
        if apply {
            self.edit(Edit::Resize { width, height });
        } else if export {
            self.export_resized_dialog(width, height, quality);
        }
    }

    /// Writes a resized copy next to the original, leaving the open image as is.
    fn export_resized_dialog(&mut self, width: u32, height: u32, quality: u8) {
        let Some(doc) = self.document.as_ref() else {
            return;
        };
        let stem = doc
            .path()
            .and_then(Path::file_stem)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mut dialog = rfd::FileDialog::new()
            .add_filter("JPG", &["jpg", "jpeg"])
            .add_filter("PNG", &["png"])
            .add_filter("BMP", &["bmp"])
            .set_file_name(format!("{stem}_resized.jpg"));
        if let Some(dir) = self.settings.last_directory() {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };
        match doc.export_resized(&path, width, height, Some(quality)) {
            Ok(()) => {
                self.settings.remember_directory_of(&path);
                self.persist_settings();
                self.set_status(format!("Resized copy saved to {}", path.display()));
            }
            Err(e) => self.report(&e),
        }
    }

    fn render_adjust_window(&mut self, ctx: &egui::Context) {
        let Some(adjust) = self.adjust_dialog.as_mut() else {
            return;
        };
        let mut open = true;
        let mut apply = false;
        egui::Window::new("Brightness / Contrast / Gamma")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add(egui::Slider::new(&mut adjust.brightness, -100.0..=100.0).text("Brightness"));
                ui.add(egui::Slider::new(&mut adjust.contrast, -100.0..=100.0).text("Contrast"));
                ui.add(egui::Slider::new(&mut adjust.gamma, 0.1..=5.0).text("Gamma"));
                ui.horizontal(|ui| {
                    apply = ui.button("Apply").clicked();
                    if ui.button("Reset").clicked() {
                        *adjust = Adjustments::default();
                    }
                });
            });

        let adjustments = *adjust;
        if !open || apply {
            self.adjust_dialog = None;
        }
        if apply {
            self.edit(Edit::Adjust(adjustments));
        }
    }

    fn render_info_window(&mut self, ctx: &egui::Context) {
        let Some(doc) = self.document.as_ref() else {
            return;
        };
        let (w, h) = doc.dimensions();
        egui::Window::new("File Info")
            .open(&mut self.show_info)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("file_info").num_columns(2).show(ui, |ui| {
                    ui.label("Filename:");
                    ui.label(doc.file_name().unwrap_or_else(|| "untitled".to_string()));
                    ui.end_row();
                    if let Some(dir) = doc.path().and_then(Path::parent) {
                        ui.label("Path:");
                        ui.label(dir.display().to_string());
                        ui.end_row();
                    }
                    ui.label("Dimensions:");
                    ui.label(format!("{w} x {h} pixels"));
                    ui.end_row();
                    ui.label("Channels:");
                    ui.label(ImageProcessor::channel_count(doc.image()).to_string());
                    ui.end_row();
                    if let Some(bytes) = doc.file_size() {
                        ui.label("File size:");
                        ui.label(format!("{} ({bytes} bytes)", format_file_size(bytes)));
                        ui.end_row();
                    }
                });
            });
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        if !self.texture_dirty {
            return;
        }
        self.texture_dirty = false;
        self.texture = self.document.as_ref().map(|doc| {
            let rgba = ImageProcessor::to_rgba(doc.image());
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR)
        });
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let viewport_rect = ui.max_rect();
        let viewport = viewport_size(viewport_rect);

        let Some(doc) = self.document.as_mut() else {
            ui.centered_and_justified(|ui| {
                ui.label("Open an image (Ctrl+O) or drop one here");
            });
            return;
        };

        let plan = match doc.render_plan(viewport, &self.engine) {
            Ok(plan) => plan,
            Err(e) => {
                self.report(&e);
                return;
            }
        };
        let image_size = doc.size();
        if std::mem::take(&mut self.recenter) {
            self.pan.center(viewport, plan.size);
        }
        self.pan.clamp(viewport, plan.size);
        let layout = CanvasLayout::new(viewport_rect, plan.size, &self.pan);

        if let Some(texture) = &self.texture {
            ui.painter().image(
                texture.id(),
                layout.image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        let response = ui.interact(viewport_rect, ui.id().with("canvas"), egui::Sense::click_and_drag());

        // Ctrl + wheel / pinch
        if response.hovered() {
            let zoom_delta = ctx.input(|i| i.zoom_delta());
            if zoom_delta != 1.0 {
                doc.zoom = if zoom_delta > 1.0 {
                    self.engine.zoom_in(doc.zoom)
                } else {
                    self.engine.zoom_out(doc.zoom)
                };
                self.recenter = true;
                ctx.request_repaint();
            }
        }

        let mut commit = None;
        match &mut self.state {
            UiState::Cropping { gesture, pending } => {
                if response.drag_started() {
                    let start = ctx
                        .input(|i| i.pointer.press_origin())
                        .or(response.interact_pointer_pos());
                    if let Some(pos) = start {
                        gesture.press(layout.to_label(pos));
                        *pending = None;
                    }
                } else if response.dragged() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        gesture.drag(layout.to_label(pos));
                    }
                } else if response.drag_stopped() {
                    let end = response
                        .interact_pointer_pos()
                        .or(ctx.input(|i| i.pointer.latest_pos()));
                    if let Some(pos) = end {
                        if let SelectionEvent::Completed(rect) = gesture.release(layout.to_label(pos)) {
                            match self.mapper.screen_to_source(rect, layout.label, layout.pixmap, image_size) {
                                Ok(region) => *pending = Some(region),
                                Err(e) => {
                                    debug!(error = %e, "crop gesture discarded");
                                    gesture.cancel();
                                }
                            }
                        }
                    }
                } else if response.clicked() {
                    gesture.cancel();
                    *pending = None;
                }

                if let Some(sel) = gesture.selection() {
                    let window_sel = layout.to_window(sel);
                    let painter = ui.painter();
                    draw_crop_shade(painter, layout.image_rect, window_sel, 140);
                    draw_selection_border(painter, window_sel, egui::Color32::WHITE);

                    if let Some(region) = *pending {
                        let (pos, pivot) = crop_button_position(window_sel, viewport_rect, 28.0, 8.0);
                        egui::Area::new(egui::Id::new("apply_crop"))
                            .fixed_pos(pos)
                            .pivot(pivot)
                            .show(ctx, |ui| {
                                if ui.button(format!("Apply crop ({}x{})", region.w, region.h)).clicked() {
                                    commit = Some(region);
                                }
                            });
                    }
                }
            }
            UiState::Slideshow(_) => {
                if response.clicked() {
                    self.stop_slideshow(ctx);
                }
            }
            UiState::Viewing => {
                if response.dragged() && Pan::is_pannable(viewport, plan.size) {
                    let delta = response.drag_delta();
                    self.pan
                        .drag_by(Offset::new(f64::from(delta.x), f64::from(delta.y)), viewport, plan.size);
                }
            }
        }

        if let Some(region) = commit {
            self.commit_crop(region);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        let dropped = ctx.input(|i| i.raw.dropped_files.iter().find_map(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.open(&path);
        }

        self.handle_shortcuts(ctx);
        self.tick_slideshow(ctx);
        self.upload_texture(ctx);

        if !self.state.is_slideshow() {
            egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
                self.render_toolbar(ui, ctx);
            });
            egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
                self.render_status_bar(ui);
            });
            if self.settings.filmstrip_visible && self.nav.len() > 1 {
                egui::TopBottomPanel::bottom("filmstrip").show(ctx, |ui| {
                    self.render_filmstrip(ui);
                });
            }
            self.render_resize_window(ctx);
            self.render_adjust_window(ctx);
            self.render_info_window(ctx);
        }

        let panel_frame = egui::Frame::default()
            .inner_margin(egui::Margin::same(0))
            .outer_margin(egui::Margin::same(0))
            .fill(egui::Color32::from_rgb(20, 20, 20));

        egui::CentralPanel::default()
            .frame(panel_frame)
            .show(ctx, |ui| {
                self.render_canvas(ui, ctx);
            });
    }
}

/// Opens the viewer window and blocks until it is closed.
///
/// # Arguments
/// * `path` - Image to open on start, if any
/// * `config` - Zoom, crop and history configuration
pub fn run(path: Option<PathBuf>, config: Config) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([480.0, 320.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "pixview",
        options,
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(config, path)) as Box<dyn eframe::App>)),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))
}
