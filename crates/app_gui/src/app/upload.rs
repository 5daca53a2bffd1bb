//! Upload view: drop zone, preview, analyze trigger and verdict.

use super::UiApp;
use eframe::egui;
use neuroscan_core::{CandidateFile, FileFilter, PreviewImage};
use rfd::FileDialog;
use std::time::Duration;

const PREVIEW_EDGE: f32 = 256.0;
const ACCENT: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);
const REPAINT_WHILE_PROCESSING: Duration = Duration::from_millis(100);

impl UiApp {
    pub(super) fn render_upload(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        self.handle_dropped_files(ctx);
        self.page.poll();
        if self.page.is_processing() {
            ctx.request_repaint_after(REPAINT_WHILE_PROCESSING);
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(16.0);
                    ui.heading("Medical Image Analysis");
                    ui.label("Upload an MRI scan for automatic tumor detection.");
                });
                ui.add_space(16.0);

                self.render_drop_zone(ui);
                self.render_preview(ctx, ui);

                if self.page.is_processing() {
                    ui.add_space(12.0);
                    ui.vertical_centered(|ui| {
                        ui.add(egui::Spinner::new().size(24.0).color(ACCENT));
                        ui.label("Processing MRI for tumor detection...");
                    });
                }

                if let Some(verdict) = self.page.result() {
                    ui.add_space(12.0);
                    egui::Frame::new()
                        .fill(egui::Color32::from_rgb(240, 253, 244))
                        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(187, 247, 208)))
                        .corner_radius(8.0)
                        .inner_margin(egui::Margin::same(12))
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.vertical_centered(|ui| {
                                ui.colored_label(egui::Color32::from_rgb(21, 128, 61), verdict);
                            });
                        });
                }

                let mut dismiss = false;
                if let Some(err) = self.page.error() {
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        ui.colored_label(egui::Color32::from_rgb(185, 28, 28), err.to_string());
                        dismiss = ui.small_button("Dismiss").clicked();
                    });
                }
                if dismiss {
                    self.page.dismiss_error();
                }

                ui.add_space(16.0);
                let button = egui::Button::new("Analyze MRI")
                    .min_size(egui::vec2(ui.available_width(), 40.0));
                if ui.add_enabled(self.page.can_analyze(), button).clicked() && self.page.analyze()
                {
                    ctx.request_repaint_after(REPAINT_WHILE_PROCESSING);
                }
            });
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
            )
        });
        self.page.set_drag_active(hovering);
        if dropped.is_empty() {
            return;
        }
        let files: Vec<CandidateFile> = dropped.into_iter().filter_map(candidate_from_drop).collect();
        self.page.accept_files(files);
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui) {
        let active = self.page.drag_active();
        let (stroke, fill) = if active {
            (
                egui::Stroke::new(2.0, ACCENT),
                egui::Color32::from_rgb(239, 246, 255),
            )
        } else {
            (
                egui::Stroke::new(2.0, egui::Color32::GRAY),
                egui::Color32::TRANSPARENT,
            )
        };
        let response = egui::Frame::new()
            .stroke(stroke)
            .fill(fill)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::same(24))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("⬆").size(32.0));
                    ui.label("Drag & drop your MRI scan here, or click to upload");
                });
            })
            .response
            .interact(egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand);

        if response.clicked()
            && let Some(path) = FileDialog::new()
                .add_filter("MRI scan", FileFilter.dialog_extensions())
                .pick_file()
        {
            self.page.accept_files(vec![CandidateFile::from_path(path)]);
        }
    }

    fn render_preview(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let Some(preview) = self.page.preview() else {
            self.preview_texture = None;
            return;
        };
        let id = preview.id();
        if self.preview_texture.as_ref().is_some_and(|(cached, _)| *cached != id) {
            self.preview_texture = None;
        }
        if self.preview_texture.is_none()
            && let Some(img) = preview.image()
        {
            self.preview_texture = Some((id, load_preview_texture(ctx, id, img)));
        }

        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("Preview:").strong());
            let desired = egui::vec2(PREVIEW_EDGE, PREVIEW_EDGE);
            let (resp, painter) = ui.allocate_painter(desired, egui::Sense::hover());
            let r = resp.rect;
            match &self.preview_texture {
                Some((_, tex)) => {
                    let [w, h] = tex.size_vec2().into();
                    let fit = r.size().x / w.max(h);
                    let rect = egui::Rect::from_center_size(r.center(), egui::vec2(w * fit, h * fit));
                    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    painter.image(tex.id(), uv, rect, egui::Color32::WHITE);
                }
                None => {
                    painter.rect_filled(r, 8.0, egui::Color32::from_gray(40));
                    painter.rect_stroke(
                        r,
                        8.0,
                        egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
                        egui::StrokeKind::Inside,
                    );
                    painter.text(
                        r.center(),
                        egui::Align2::CENTER_CENTER,
                        "No preview available",
                        egui::FontId::proportional(14.0),
                        egui::Color32::LIGHT_GRAY,
                    );
                }
            }
            if let Some(file) = self.page.selected() {
                ui.small(&file.name);
            }
        });
    }
}

fn load_preview_texture(ctx: &egui::Context, id: u64, img: &PreviewImage) -> egui::TextureHandle {
    let size = [img.width as usize, img.height as usize];
    let color = egui::ColorImage::from_rgba_unmultiplied(size, &img.rgba);
    ctx.load_texture(format!("preview:{id}"), color, egui::TextureOptions::LINEAR)
}

fn candidate_from_drop(file: egui::DroppedFile) -> Option<CandidateFile> {
    let candidate = if let Some(path) = file.path {
        CandidateFile::from_path(path)
    } else if let Some(bytes) = file.bytes {
        CandidateFile::from_bytes(file.name, bytes)
    } else {
        tracing::warn!("Dropped item without path or contents: {}", file.name);
        return None;
    };
    Some(if file.mime.is_empty() {
        candidate
    } else {
        candidate.with_mime(file.mime)
    })
}
