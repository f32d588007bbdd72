use super::state::{get_progress_percentage, get_status_text};
use super::{Activity, UploaderPlayground};
use egui::{Align, Color32, RichText};
use file_uploader::utils::file_size::format_bytes;
use file_uploader::{FileId, ManagedFile, UploadStatus, UploaderKind};
use tracing::warn;

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
const FAILURE: Color32 = Color32::from_rgb(220, 50, 50);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);

/// Row interactions, applied once the list has been drawn.
enum RowAction {
    Upload(FileId),
    Remove(FileId),
    Rename(FileId),
    Open(String),
}

impl UploaderPlayground {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let total_height = ui.available_height();
            let footer_height = 40.0;
            let footer_margin = 15.0;
            let content_height = total_height - footer_height - footer_margin;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("File Uploader Playground");
                        ui.add_space(5.0);
                        ui.label(
                            RichText::new("Queue files and send them through any uploader")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });

                    ui.add_space(20.0);
                    self.render_uploader_settings(ui);

                    ui.add_space(20.0);
                    self.render_dropzone(ui);

                    let files = self.uploader.files();
                    if !files.is_empty() {
                        ui.add_space(20.0);
                        self.render_files(ui, &files);
                    }

                    ui.add_space(20.0);
                    self.render_actions(ui, &files);

                    if !files.is_empty() {
                        ui.add_space(20.0);
                        ui.group(|ui| {
                            let progress_bar =
                                egui::ProgressBar::new(get_progress_percentage(&files))
                                    .show_percentage()
                                    .animate(self.uploader.is_uploading())
                                    .fill(ACCENT);
                            ui.add(progress_bar);
                            ui.label(get_status_text(&files));
                        });
                    }

                    if !self.state.activity.is_empty() {
                        ui.add_space(10.0);
                        self.render_details(ui);
                    }

                    ui.add_space(20.0);
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(footer_margin);
                self.render_footer(ui);
            });
        });
    }

    fn render_uploader_settings(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Uploader");
                let mut selected = self.selected_kind;
                egui::ComboBox::from_id_source("uploader_kind")
                    .selected_text(selected.as_str())
                    .show_ui(ui, |ui| {
                        for kind in UploaderKind::ALL {
                            ui.selectable_value(&mut selected, kind, kind.as_str());
                        }
                    });
                if selected != self.selected_kind {
                    self.switch_uploader(selected);
                }
            });

            ui.add_space(8.0);

            match self.selected_kind {
                UploaderKind::Local => {
                    let slider = egui::Slider::new(&mut self.delay_ms, 0..=5000)
                        .text("Simulated delay")
                        .suffix(" ms");
                    if ui.add(slider).changed() {
                        self.apply_local_delay();
                    }
                }
                UploaderKind::Custom => {
                    ui.horizontal(|ui| {
                        ui.label("Endpoint");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.endpoint)
                                .desired_width(ui.available_width() - 60.0),
                        );
                        if ui.button("Apply").clicked() {
                            self.apply_endpoint();
                        }
                    });

                    ui.add_space(4.0);
                    ui.collapsing("Import from curl", |ui| {
                        ui.label("ℹ").on_hover_text_at_pointer(
                            "Copy an upload request as cURL from your browser's network tab.\n\
                            Its URL, headers and form fields become the custom uploader settings.",
                        );
                        ui.add(
                            egui::TextEdit::multiline(&mut self.curl_text)
                                .desired_width(ui.available_width())
                                .desired_rows(4)
                                .font(egui::TextStyle::Monospace)
                                .hint_text("curl 'https://api.example.com/upload' -H 'Authorization: Bearer <token>' -F 'file=@photo.png'"),
                        );
                        let can_import = !self.curl_text.trim().is_empty();
                        if ui
                            .add_enabled(can_import, egui::Button::new("Import"))
                            .clicked()
                        {
                            self.import_curl();
                        }
                    });
                }
                UploaderKind::Cloudinary => {
                    egui::Grid::new("cloudinary_settings")
                        .num_columns(2)
                        .show(ui, |ui| {
                            ui.label("Cloud name");
                            ui.text_edit_singleline(&mut self.cloud_name);
                            ui.end_row();
                            ui.label("Upload preset");
                            ui.text_edit_singleline(&mut self.upload_preset);
                            ui.end_row();
                        });
                    if ui.button("Apply").clicked() {
                        self.apply_cloudinary();
                    }
                }
                UploaderKind::S3 => {
                    ui.label(
                        RichText::new(
                            "Pre-signed URLs are issued by the host application. \
                            The playground presigner only points at a placeholder.",
                        )
                        .color(MUTED),
                    );
                }
            }
        });
    }

    fn render_dropzone(&mut self, ui: &mut egui::Ui) {
        let accepts = self.uploader.accepts_input();
        let hovering = self.state.drag_hover && accepts;
        let stroke = if hovering {
            egui::Stroke::new(2.0, ACCENT)
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke
        };

        egui::Frame::group(ui.style()).stroke(stroke).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.add_space(8.0);
                ui.label(if hovering {
                    "Drop the files here..."
                } else {
                    "Drag and drop files here, or"
                });
                ui.add_space(4.0);
                ui.add_enabled_ui(accepts, |ui| {
                    if ui.button("📄 Select Files").clicked() {
                        self.pick_files();
                    }
                    if ui.button("📁 Select Folder").clicked() {
                        self.pick_folder();
                    }
                });

                let hint = self.uploader.bounds().describe();
                if !hint.is_empty() {
                    ui.add_space(4.0);
                    ui.label(RichText::new(hint).color(MUTED));
                }
                if let Some(notice) = &self.state.notice {
                    ui.colored_label(MUTED, notice);
                }
                ui.add_space(8.0);
            });
        });
    }

    fn render_files(&mut self, ui: &mut egui::Ui, files: &[ManagedFile]) {
        let mut actions = Vec::new();

        for file in files {
            ui.group(|ui| {
                ui.horizontal(|ui| {
                    let draft = self
                        .state
                        .name_drafts
                        .entry(file.id)
                        .or_insert_with(|| file.name.clone());
                    let response = ui.add_enabled(
                        file.is_pending(),
                        egui::TextEdit::singleline(draft).desired_width(220.0),
                    );
                    if response.lost_focus() {
                        actions.push(RowAction::Rename(file.id));
                    }
                    ui.label(RichText::new(format_bytes(file.size())).color(MUTED));

                    ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                        let removable = !matches!(file.status, UploadStatus::Uploading);
                        if ui
                            .add_enabled(removable, egui::Button::new("🗑"))
                            .on_hover_text("Remove")
                            .clicked()
                        {
                            actions.push(RowAction::Remove(file.id));
                        }
                        if file.is_pending()
                            && ui.button("📤").on_hover_text("Upload").clicked()
                        {
                            actions.push(RowAction::Upload(file.id));
                        }
                        if let Some(location) = file.location().filter(|l| l.starts_with("http"))
                        {
                            if ui.button("🔗").on_hover_text(location).clicked() {
                                actions.push(RowAction::Open(location.to_string()));
                            }
                        }
                    });
                });

                match &file.status {
                    UploadStatus::Pending => {
                        ui.colored_label(MUTED, "Ready to upload");
                    }
                    UploadStatus::Uploading => {
                        ui.add(
                            egui::ProgressBar::new(f32::from(file.progress) / 100.0)
                                .show_percentage()
                                .fill(ACCENT),
                        );
                    }
                    UploadStatus::Success { location } => {
                        ui.colored_label(SUCCESS, format!("✅ {}", location));
                    }
                    UploadStatus::Error { message } => {
                        ui.colored_label(FAILURE, format!("❌ {}", message));
                    }
                }
            });
            ui.add_space(4.0);
        }

        for action in actions {
            match action {
                RowAction::Upload(id) => self.upload_one(id),
                RowAction::Remove(id) => self.uploader.remove_file(id),
                RowAction::Rename(id) => self.commit_rename(id),
                RowAction::Open(url) => {
                    if let Err(e) = open::that(&url) {
                        warn!("Failed to open {}: {}", url, e);
                    }
                }
            }
        }
    }

    fn render_actions(&mut self, ui: &mut egui::Ui, files: &[ManagedFile]) {
        let uploading = self.uploader.is_uploading();
        let pending = files.iter().filter(|f| f.is_pending()).count();

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(pending > 0 && !uploading, |ui| {
                let label = format!(
                    "📤 Upload {} File{}",
                    pending,
                    if pending == 1 { "" } else { "s" }
                );
                let button = egui::Button::new(label).min_size(egui::vec2(200.0, 40.0));
                if ui.add(button).clicked() {
                    self.start_upload();
                }
            });

            if !files.is_empty() {
                ui.add_space(5.0);
                if ui
                    .add_enabled(!uploading, egui::Button::new("🗑 Clear All"))
                    .clicked()
                {
                    self.reset_upload_state();
                }
            }
        });
    }

    fn render_details(&mut self, ui: &mut egui::Ui) {
        if ui
            .button(if self.state.show_details {
                "Hide Details"
            } else {
                "Show Details"
            })
            .clicked()
        {
            self.state.show_details = !self.state.show_details;
        }

        if self.state.show_details {
            egui::ScrollArea::vertical()
                .max_height(200.0)
                .show(ui, |ui| {
                    egui::Frame::none()
                        .fill(ui.style().visuals.extreme_bg_color)
                        .show(ui, |ui| {
                            ui.add_space(8.0);
                            for entry in &self.state.activity {
                                ui.horizontal(|ui| match entry {
                                    Activity::Added(count) => {
                                        ui.label("➕");
                                        ui.colored_label(MUTED, format!("Added {} file(s)", count));
                                    }
                                    Activity::Started(name) => {
                                        ui.label("⏳");
                                        ui.colored_label(MUTED, format!("{} - Uploading...", name));
                                    }
                                    Activity::Succeeded(name, location) => {
                                        ui.label("✅");
                                        let text = match location {
                                            Some(location) => format!("{} - {}", name, location),
                                            None => name.clone(),
                                        };
                                        ui.colored_label(SUCCESS, text);
                                    }
                                    Activity::Failed(name, message) => {
                                        ui.label("❌");
                                        ui.colored_label(FAILURE, format!("{} - {}", name, message));
                                    }
                                    Activity::Removed(name) => {
                                        ui.label("🗑");
                                        ui.colored_label(MUTED, format!("{} - Removed", name));
                                    }
                                    Activity::BatchComplete { successful, failed } => {
                                        ui.label("🏁");
                                        ui.colored_label(
                                            ACCENT,
                                            format!(
                                                "Batch complete | ✅ Success: {} | ❌ Failed: {}",
                                                successful, failed
                                            ),
                                        );
                                    }
                                });
                                ui.add_space(4.0);
                            }
                            ui.add_space(8.0);
                        });
                });
        }
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new(format!("Form value: {}", self.uploader.form_value()))
                    .monospace()
                    .color(MUTED),
            );
        });

        if let Some(error) = &self.state.error_message {
            ui.add_space(5.0);
            ui.vertical_centered(|ui| {
                ui.colored_label(FAILURE, error);
            });
        }
    }
}
