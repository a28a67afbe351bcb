/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Main eframe::App implementation
//! Background tasks push into Arc<Mutex<Vec>> queues; the UI drains them every frame.

use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::config::ServiceConfig;
use crate::export::{self, ExportReport};
use crate::model::{AnalysisResult, AppState, SelectedDocument};
use crate::overlay;
use crate::results;
use crate::service::{self, AnalysisClient};

#[cfg(target_arch = "wasm32")]
use crate::web_download;
#[cfg(target_arch = "wasm32")]
use crate::web_picker;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;

/// Finished analysis: request id and result or display message
type AnalysisOutcome = (u64, Result<AnalysisResult, String>);

/// Picked or dropped file: name, reported MIME type, contents
type IncomingFile = (String, Option<String>, Vec<u8>);

/// Decoded image preview. `source_size` is the original pixel size the
/// service coordinates refer to; the texture may be downscaled.
struct Preview {
    texture: egui::TextureHandle,
    source_size: egui::Vec2,
}

pub struct StampAnalyzerApp {
    state: AppState,
    config: ServiceConfig,
    client: Result<AnalysisClient, String>,
    /// Async analysis tasks push completed results here
    completed_queue: Arc<Mutex<Vec<AnalysisOutcome>>>,
    /// File picker pushes new files here
    file_queue: Arc<Mutex<Vec<IncomingFile>>>,
    preview: Option<Preview>,
}

impl StampAnalyzerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ServiceConfig) -> Self {
        let client = AnalysisClient::new(&config).map_err(|e| {
            log::error!("Failed to build analysis client: {}", e);
            e.to_string()
        });
        log::info!("Analysis service endpoint: {}", config.endpoint);
        if config.user_id().is_none() {
            log::warn!("No user configured; analysis is disabled");
        }

        Self {
            state: AppState::new(),
            config,
            client,
            completed_queue: Arc::new(Mutex::new(Vec::new())),
            file_queue: Arc::new(Mutex::new(Vec::new())),
            preview: None,
        }
    }

    fn accept_file(&mut self, ctx: &egui::Context, name: String, mime: Option<String>, bytes: Vec<u8>) {
        match SelectedDocument::new(name, mime, bytes) {
            Ok(document) => {
                log::info!(
                    "Selected {} ({:?}, {})",
                    document.filename,
                    document.kind,
                    document.size_label()
                );
                self.preview = if document.is_pdf() {
                    None
                } else {
                    decode_preview(ctx, &document.filename, &document.bytes)
                };
                if self.preview.is_none() && !document.is_pdf() {
                    log::warn!("Could not decode preview for {}", document.filename);
                }
                self.state.select_document(document);
            }
            Err(message) => {
                log::warn!("{}", message);
                self.state.error = Some(message);
            }
        }
    }

    fn pick_file(&mut self, ctx: &egui::Context) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let picked = rfd::FileDialog::new()
                .set_title("Choose a document")
                .add_filter("Images and PDF", SUPPORTED_EXTENSIONS)
                .pick_file();
            if let Some(path) = picked {
                match std::fs::read(&path) {
                    Ok(bytes) => self.accept_file(ctx, file_name(&path), None, bytes),
                    Err(e) => {
                        self.state.error = Some(format!("Failed to read {}: {}", path.display(), e))
                    }
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let file_queue = Arc::clone(&self.file_queue);
            let ctx = ctx.clone();
            spawn_local(async move {
                match web_picker::pick_file().await {
                    Ok(Some(file)) => {
                        file_queue.lock().unwrap().push(file);
                        ctx.request_repaint();
                    }
                    Ok(None) => {}
                    Err(e) => log::error!("{}", e),
                }
            });
        }
    }

    /// Send the selected document to the analysis service
    fn start_analysis(&mut self, ctx: &egui::Context) {
        let client = match &self.client {
            Ok(client) => client.clone(),
            Err(e) => {
                self.state.error = Some(e.clone());
                return;
            }
        };
        let Some(request) = self.state.begin_analysis(self.config.user_id()) else {
            return;
        };

        log::info!(
            "Analysis #{} started for {} -> {}",
            request.id,
            request.filename,
            client.endpoint()
        );
        let completed_queue = Arc::clone(&self.completed_queue);
        let ctx = ctx.clone();

        service::spawn(async move {
            let outcome = client
                .analyze_stamps_and_signatures(&request)
                .await
                .map_err(|e| {
                    log::error!("Analysis #{} failed: {}", request.id, e);
                    e.to_string()
                });
            completed_queue.lock().unwrap().push((request.id, outcome));
            ctx.request_repaint();
        });
    }

    /// Poll for completed analyses and picked files (called each frame)
    fn poll_queues(&mut self, ctx: &egui::Context) {
        let completed: Vec<AnalysisOutcome> = self.completed_queue.lock().unwrap().drain(..).collect();
        for (request_id, outcome) in completed {
            if self.state.complete_analysis(request_id, outcome) {
                log::info!("Analysis #{} finished: {}", request_id, self.state.status_message);
            } else {
                log::info!("Discarding stale analysis #{}", request_id);
            }
        }

        let files: Vec<IncomingFile> = self.file_queue.lock().unwrap().drain(..).collect();
        for (name, mime, bytes) in files {
            self.accept_file(ctx, name, mime, bytes);
        }
    }

    fn download_results(&mut self) {
        let (Some(document), Some(result)) = (&self.state.document, &self.state.result) else {
            return;
        };
        let now = chrono::Utc::now();
        let json = match ExportReport::new(&document.filename, result, now).to_json() {
            Ok(json) => json,
            Err(e) => {
                self.state.error = Some(format!("Failed to build report: {}", e));
                return;
            }
        };
        let filename = export::report_filename(now);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let Some(path) = rfd::FileDialog::new()
                .set_file_name(&filename)
                .add_filter("JSON", &["json"])
                .save_file()
            else {
                return;
            };
            match std::fs::write(&path, json) {
                Ok(()) => {
                    log::info!("Report saved to {}", path.display());
                    self.state.status_message = format!("Saved {}", path.display());
                }
                Err(e) => {
                    log::error!("Failed to save report: {}", e);
                    self.state.error = Some(format!("Failed to save {}: {}", path.display(), e));
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        if let Err(e) = web_download::download_json(&filename, &json) {
            log::error!("Report download failed: {}", e);
            self.state.error = Some(format!("Download failed: {}", e));
        }
    }

    fn clear(&mut self) {
        self.state.reset();
        self.preview = None;
    }

    fn document_toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        if self.state.document.is_none() {
            if ui.button("Choose File").clicked() {
                self.pick_file(ctx);
            }
            return;
        }
        let Some(document) = &self.state.document else {
            return;
        };

        ui.vertical(|ui| {
            ui.strong(&document.filename);
            ui.small(document.size_label());
        });
        ui.separator();

        let analyzing = self.state.is_analyzing();
        let can_analyze = !analyzing && self.config.user_id().is_some();
        let label = if analyzing { "Analyzing..." } else { "Analyze" };
        if analyzing {
            ui.spinner();
        }
        if ui
            .add_enabled(can_analyze, egui::Button::new(label))
            .clicked()
        {
            self.start_analysis(ctx);
        }
        if ui.button("Choose Different File").clicked() {
            self.pick_file(ctx);
        }
        if ui.button("Clear").clicked() {
            self.clear();
        }
    }

    fn document_preview(&self, ui: &mut egui::Ui) {
        let Some(document) = &self.state.document else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new(
                        "Drop a document image or PDF here\nor click 'Choose File' above",
                    )
                    .size(18.0)
                    .color(egui::Color32::GRAY),
                );
            });
            return;
        };

        if document.is_pdf() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading("PDF document");
                ui.label(&document.filename);
                ui.colored_label(
                    egui::Color32::GRAY,
                    "Bounding boxes are only drawn for image documents",
                );
                #[cfg(target_arch = "wasm32")]
                if ui.button("Open PDF").clicked()
                    && let Err(e) = web_download::open_in_new_tab(&document.bytes, &document.mime)
                {
                    log::error!("{}", e);
                }
            });
            return;
        }

        let Some(preview) = &self.preview else {
            ui.centered_and_justified(|ui| {
                ui.colored_label(egui::Color32::GRAY, "Preview unavailable for this image");
            });
            return;
        };

        let available = ui.available_size();
        let [tw, th] = preview.texture.size();
        let scale = (available.x / tw as f32).min(available.y / th as f32);
        let display_size = egui::vec2(tw as f32, th as f32) * scale;

        ui.vertical_centered(|ui| {
            let response = ui.image(egui::load::SizedTexture::new(
                preview.texture.id(),
                display_size,
            ));
            if let Some(result) = &self.state.result {
                let boxes = overlay::overlay_boxes(result);
                overlay::paint_overlays(ui.painter(), response.rect, preview.source_size, &boxes);
            }
        });
    }
}

impl eframe::App for StampAnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_queues(ctx);

        // Keep repainting while analysis is in flight
        if self.state.is_analyzing() {
            ctx.request_repaint();
        }

        // Handle drag-and-drop; only the first file is taken
        let dropped: Option<IncomingFile> = ctx.input(|i| {
            i.raw.dropped_files.first().and_then(|file| {
                let mime = Some(file.mime.clone()).filter(|m| !m.is_empty());
                if let Some(bytes) = &file.bytes {
                    return Some((file.name.clone(), mime, bytes.to_vec()));
                }
                #[cfg(not(target_arch = "wasm32"))]
                if let Some(path) = &file.path {
                    match std::fs::read(path) {
                        Ok(bytes) => return Some((file_name(path), mime, bytes)),
                        Err(e) => log::error!("Failed to read {}: {}", path.display(), e),
                    }
                }
                None
            })
        });
        if let Some((name, mime, bytes)) = dropped {
            self.accept_file(ctx, name, mime, bytes);
        }

        // Top panel: title + controls
        egui::Panel::top("top_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading("Stamp & Signature Analyzer");
            ui.label("Upload a document to detect and validate official stamps and signatures");
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                self.document_toolbar(ui, ctx);
            });

            // Status bar
            ui.horizontal(|ui| {
                ui.label(&self.state.status_message);
                if self.config.user_id().is_none() {
                    ui.colored_label(
                        egui::Color32::from_rgb(245, 158, 11),
                        format!("| No user configured: {}", USER_HINT),
                    );
                }
            });

            if let Some(error) = &self.state.error {
                ui.colored_label(egui::Color32::from_rgb(255, 100, 100), format!("⚠ {}", error));
            }
            ui.add_space(2.0);
        });

        // Side panels must be added before CentralPanel
        let mut download = false;
        if let Some(result) = &self.state.result {
            egui::Panel::right("analysis_results")
                .resizable(true)
                .default_size(340.0)
                .min_size(260.0)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.strong("Analysis Results");
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            download = ui.button("Download Results").clicked();
                        });
                    });
                    ui.separator();
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        results::render_results(ui, result);
                    });
                });
        }

        if download {
            self.download_results();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.document_preview(ui);
        });
    }
}

#[cfg(not(target_arch = "wasm32"))]
const USER_HINT: &str = "set STAMP_ANALYZER_USER_ID or user_id in stamp-analyzer.toml";
#[cfg(target_arch = "wasm32")]
const USER_HINT: &str = "add ?user=<id> to the page URL";

#[cfg(not(target_arch = "wasm32"))]
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "pdf",
];

#[cfg(not(target_arch = "wasm32"))]
fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn decode_preview(ctx: &egui::Context, name: &str, bytes: &[u8]) -> Option<Preview> {
    if bytes.is_empty() {
        return None;
    }
    let img = image::load_from_memory(bytes).ok()?;
    let source_size = egui::vec2(img.width() as f32, img.height() as f32);
    // Resize if too large for preview (max 1024px on longest side)
    let img = if img.width() > 1024 || img.height() > 1024 {
        img.resize(1024, 1024, image::imageops::FilterType::Triangle)
    } else {
        img
    };
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels = rgba.into_raw();
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &pixels);
    Some(Preview {
        texture: ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR),
        source_size,
    })
}
