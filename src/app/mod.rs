mod state;
mod ui;

use eframe::{egui, App};
use file_uploader::config::{CloudinaryConfig, CustomConfig, LocalConfig};
use file_uploader::utils::curl_parser::CurlImport;
use file_uploader::utils::folder::collect_folder;
use file_uploader::{
    ChannelEvents, FileId, FileUploader, RawFile, UploadBounds, UploadStatus, UploaderConfig,
    UploaderEvent, UploaderKind,
};
use rfd::FileDialog;
use state::{Activity, PlaygroundState};
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{info, warn};

/// Interactive playground around one [`FileUploader`].
pub struct UploaderPlayground {
    runtime: Runtime,
    uploader: FileUploader,
    events: Receiver<UploaderEvent>,
    state: PlaygroundState,
    selected_kind: UploaderKind,
    curl_text: String,
    endpoint: String,
    cloud_name: String,
    upload_preset: String,
    delay_ms: u64,
}

impl UploaderPlayground {
    pub fn new(_cc: &eframe::CreationContext<'_>, runtime: Runtime) -> Self {
        let bounds = match UploadBounds::from_env() {
            bounds if bounds == UploadBounds::default() => UploadBounds::playground(),
            bounds => bounds,
        };
        let config = UploaderConfig::from_env().unwrap_or_else(|e| {
            warn!("Falling back to the local uploader: {}", e);
            UploaderConfig::default()
        });
        info!(
            "Initializing uploader playground ({} uploader, {:?})",
            config.kind(),
            bounds
        );

        let (sink, events) = ChannelEvents::new();
        let uploader = FileUploader::builder()
            .bounds(bounds)
            .uploader(config)
            .events(sink)
            .build();

        let mut playground = Self {
            runtime,
            selected_kind: uploader.uploader_kind(),
            uploader,
            events,
            state: PlaygroundState::default(),
            curl_text: String::new(),
            endpoint: String::new(),
            cloud_name: String::new(),
            upload_preset: String::new(),
            delay_ms: 500,
        };
        playground.sync_fields();
        playground
    }

    /// Copies the active configuration into the editable fields.
    fn sync_fields(&mut self) {
        match self.uploader.uploader_config() {
            UploaderConfig::Local(local) => {
                if let Some(delay) = local.simulation_delay {
                    self.delay_ms = delay.as_millis() as u64;
                }
            }
            UploaderConfig::Custom(custom) => self.endpoint = custom.endpoint,
            UploaderConfig::Cloudinary(cloudinary) => {
                self.cloud_name = cloudinary.cloud_name;
                self.upload_preset = cloudinary.upload_preset;
            }
            UploaderConfig::S3(_) => {}
        }
        self.selected_kind = self.uploader.uploader_kind();
    }

    pub fn switch_uploader(&mut self, kind: UploaderKind) {
        self.uploader.switch_uploader(kind);
        self.state.error_message = None;
        self.sync_fields();
    }

    pub fn apply_local_delay(&mut self) {
        self.uploader.set_uploader(UploaderConfig::Local(LocalConfig {
            simulation_delay: Some(Duration::from_millis(self.delay_ms)),
        }));
    }

    pub fn apply_endpoint(&mut self) {
        let config = match self.uploader.uploader_config() {
            UploaderConfig::Custom(custom) => CustomConfig {
                endpoint: self.endpoint.trim().to_string(),
                ..custom
            },
            _ => CustomConfig::new(self.endpoint.trim()),
        };
        self.uploader.set_uploader(UploaderConfig::Custom(config));
    }

    pub fn apply_cloudinary(&mut self) {
        self.uploader
            .set_uploader(UploaderConfig::Cloudinary(CloudinaryConfig::new(
                self.cloud_name.trim(),
                self.upload_preset.trim(),
            )));
    }

    pub fn import_curl(&mut self) {
        match CurlImport::parse(&self.curl_text) {
            Ok(config) => {
                info!(
                    "Imported custom endpoint {} with {} header(s)",
                    config.endpoint,
                    config.headers.len()
                );
                self.uploader.set_uploader(UploaderConfig::Custom(config));
                self.state.error_message = None;
                self.sync_fields();
            }
            Err(e) => {
                warn!("Error parsing curl command: {}", e);
                self.state.error_message = Some(e.to_string());
            }
        }
    }

    pub fn pick_files(&mut self) {
        let dialog = FileDialog::new();
        let paths = if self.uploader.bounds().multiple {
            dialog.pick_files().unwrap_or_default()
        } else {
            dialog.pick_file().into_iter().collect()
        };
        let files = paths.into_iter().filter_map(|p| Self::read(&p)).collect();
        self.offer(files);
    }

    pub fn pick_folder(&mut self) {
        if let Some(folder) = FileDialog::new().pick_folder() {
            info!("Collecting files from {}", folder.display());
            self.offer(collect_folder(&folder));
        }
    }

    fn read(path: &Path) -> Option<RawFile> {
        match RawFile::from_path(path) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn dropped(file: &egui::DroppedFile) -> Option<RawFile> {
        if let Some(path) = &file.path {
            return Self::read(path);
        }
        let bytes = file.bytes.as_ref()?;
        let media_type = mime_guess::from_path(&file.name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Some(RawFile::new(file.name.clone(), media_type, bytes.to_vec()))
    }

    /// Hands a selection to the dropzone rules and reports what was filtered out.
    fn offer(&mut self, files: Vec<RawFile>) {
        if files.is_empty() {
            return;
        }
        let filtered = self.uploader.drop_files(files);
        self.state.notice = (!filtered.is_empty()).then(|| {
            let names: Vec<_> = filtered.iter().map(RawFile::name).collect();
            format!("Skipped: {}", names.join(", "))
        });
    }

    pub fn start_upload(&mut self) {
        self.state.error_message = None;
        let uploader = self.uploader.clone();
        self.runtime.spawn(async move { uploader.start_all_uploads().await });
    }

    pub fn upload_one(&self, id: FileId) {
        let uploader = self.uploader.clone();
        self.runtime.spawn(async move { uploader.upload_file(id).await });
    }

    pub fn commit_rename(&mut self, id: FileId) {
        if let Some(name) = self.state.name_drafts.remove(&id) {
            let name = name.trim();
            if !name.is_empty() {
                self.uploader.rename_file(id, name);
            }
        }
    }

    pub fn reset_upload_state(&mut self) {
        info!("Clearing the upload queue");
        for file in self.uploader.files() {
            self.uploader.remove_file(file.id);
        }
        self.drain_events();
        self.state.clear();
    }

    fn drain_events(&mut self) -> bool {
        let mut had_updates = false;
        while let Ok(event) = self.events.try_recv() {
            had_updates = true;
            self.state.apply(event);
        }
        had_updates
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        self.state.drag_hover = ctx.input(|i| !i.raw.hovered_files.is_empty());
        if !dropped.is_empty() {
            let files = dropped.iter().filter_map(Self::dropped).collect();
            self.offer(files);
        }

        let had_updates = self.drain_events();
        let in_flight = self
            .uploader
            .files()
            .iter()
            .any(|f| matches!(f.status, UploadStatus::Uploading));
        if had_updates || in_flight {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}

impl App for UploaderPlayground {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
