use crate::config::{UploadBounds, UploaderConfig, UploaderKind};
use crate::error::{TransportError, ValidationError};
use crate::transport::{self, ProgressFn};
use crate::upload::events::{NoopEvents, UploadEvents};
use crate::upload::preview::{PreviewHandle, PreviewRegistry};
use crate::upload::types::{FileId, ManagedFile, RawFile, UploadStatus};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// A tracked entry together with the preview reference it owns.
struct TrackedFile {
    file: ManagedFile,
    // Released when the entry leaves the table.
    _preview: PreviewHandle,
}

struct Inner {
    bounds: UploadBounds,
    config: RwLock<UploaderConfig>,
    client: reqwest::Client,
    events: Arc<dyn UploadEvents>,
    previews: PreviewRegistry,
    entries: DashMap<FileId, TrackedFile>,
    order: RwLock<Vec<FileId>>,
    batch_in_flight: AtomicBool,
}

impl Inner {
    fn apply_progress(&self, id: FileId, percent: u8) {
        let snapshot = {
            let Some(mut entry) = self.entries.get_mut(&id) else {
                return;
            };
            if entry.file.status != UploadStatus::Uploading {
                return;
            }
            entry.file.progress = entry.file.progress.max(percent.min(100));
            entry.file.clone()
        };

        debug!("Progress {}% for {}", snapshot.progress, snapshot.name);
        self.events.on_upload_progress(&snapshot, snapshot.progress);
    }
}

/// Holds the batch flag for one running batch and clears it on every exit path.
struct BatchGuard {
    inner: Arc<Inner>,
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        self.inner.batch_in_flight.store(false, Ordering::SeqCst);
    }
}

pub struct FileUploaderBuilder {
    bounds: UploadBounds,
    config: UploaderConfig,
    events: Arc<dyn UploadEvents>,
    client: Option<reqwest::Client>,
}

impl FileUploaderBuilder {
    pub fn bounds(mut self, bounds: UploadBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn uploader(mut self, config: UploaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn events(mut self, events: impl UploadEvents + 'static) -> Self {
        self.events = Arc::new(events);
        self
    }

    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> FileUploader {
        FileUploader {
            inner: Arc::new(Inner {
                bounds: self.bounds,
                config: RwLock::new(self.config),
                client: self.client.unwrap_or_default(),
                events: self.events,
                previews: PreviewRegistry::new(),
                entries: DashMap::new(),
                order: RwLock::new(Vec::new()),
                batch_in_flight: AtomicBool::new(false),
            }),
        }
    }
}

/// Upload queue manager.
///
/// Owns the tracked files, their lifecycle and their preview references, and dispatches
/// uploads to the transport selected by the active [`UploaderConfig`]. Cloning yields
/// another handle to the same queue.
#[derive(Clone)]
pub struct FileUploader {
    inner: Arc<Inner>,
}

impl FileUploader {
    pub fn builder() -> FileUploaderBuilder {
        FileUploaderBuilder {
            bounds: UploadBounds::default(),
            config: UploaderConfig::default(),
            events: Arc::new(NoopEvents),
            client: None,
        }
    }

    pub fn new(bounds: UploadBounds, config: UploaderConfig) -> Self {
        Self::builder().bounds(bounds).uploader(config).build()
    }

    pub fn bounds(&self) -> &UploadBounds {
        &self.inner.bounds
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.inner.previews
    }

    pub fn uploader_config(&self) -> UploaderConfig {
        self.inner.config.read().clone()
    }

    pub fn uploader_kind(&self) -> UploaderKind {
        self.inner.config.read().kind()
    }

    /// Replaces the transport configuration used by uploads started from now on.
    pub fn set_uploader(&self, config: UploaderConfig) {
        info!("Uploader set to {}", config.kind());
        *self.inner.config.write() = config;
    }

    /// Activates `kind` with its default configuration.
    pub fn switch_uploader(&self, kind: UploaderKind) {
        self.set_uploader(UploaderConfig::defaults_for(kind));
    }

    /// Tracked files in insertion order.
    pub fn files(&self) -> Vec<ManagedFile> {
        let order = self.inner.order.read();
        order
            .iter()
            .filter_map(|id| self.inner.entries.get(id).map(|e| e.file.clone()))
            .collect()
    }

    pub fn get(&self, id: FileId) -> Option<ManagedFile> {
        self.inner.entries.get(&id).map(|e| e.file.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.order.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an upload batch is in flight.
    pub fn is_uploading(&self) -> bool {
        self.inner.batch_in_flight.load(Ordering::SeqCst)
    }

    pub fn accepts_input(&self) -> bool {
        !self.inner.bounds.disabled && !self.is_uploading()
    }

    pub fn pending_count(&self) -> usize {
        self.files().iter().filter(|f| f.is_pending()).count()
    }

    /// Resolved locations of successful entries, in queue order.
    pub fn uploaded_locations(&self) -> Vec<String> {
        self.files()
            .iter()
            .filter_map(|f| f.location().map(str::to_string))
            .collect()
    }

    /// JSON array of [`Self::uploaded_locations`], suitable as a form field value.
    pub fn form_value(&self) -> String {
        serde_json::Value::from(self.uploaded_locations()).to_string()
    }

    /// Validates and enqueues `raw_files` in order.
    ///
    /// Files over capacity or over the size limit are reported through
    /// `on_upload_error` and dropped; the accepted ones are reported once through
    /// `on_files_added`.
    pub fn add_files(&self, raw_files: impl IntoIterator<Item = RawFile>) {
        let bounds = &self.inner.bounds;
        let mut added = Vec::new();
        let mut rejected = Vec::new();

        {
            let mut order = self.inner.order.write();
            for raw in raw_files {
                let rejection = if order.len() >= bounds.max_files {
                    Some(ValidationError::TooManyFiles {
                        max: bounds.max_files,
                    })
                } else if raw.len() > bounds.max_size {
                    Some(ValidationError::FileTooLarge {
                        max: bounds.max_size,
                    })
                } else {
                    None
                };

                if let Some(err) = rejection {
                    warn!("Rejected {}: {}", raw.name(), err);
                    rejected.push((ManagedFile::new(raw, None), err));
                    continue;
                }

                let preview = self.inner.previews.create(&raw);
                let file = ManagedFile::new(raw, Some(preview.url().to_string()));
                self.inner.entries.insert(
                    file.id,
                    TrackedFile {
                        file: file.clone(),
                        _preview: preview,
                    },
                );
                order.push(file.id);
                added.push(file);
            }
        }

        for (file, err) in &rejected {
            self.inner.events.on_upload_error(file, &err.to_string());
        }

        info!("Added {} file(s), rejected {}", added.len(), rejected.len());
        self.inner.events.on_files_added(&added);
    }

    /// Presentation-side entry point: applies the accept filter and single-file rule
    /// before [`Self::add_files`]. Returns the files that were filtered out.
    pub fn drop_files(&self, raw_files: Vec<RawFile>) -> Vec<RawFile> {
        if !self.accepts_input() {
            debug!("Ignoring {} dropped file(s) while input is closed", raw_files.len());
            return raw_files;
        }

        let (accepted, filtered) = self.inner.bounds.filter_selection(raw_files);
        for file in &filtered {
            debug!("Filtered out {} ({})", file.name(), file.media_type());
        }
        self.add_files(accepted);
        filtered
    }

    /// Stops tracking `id` and releases its preview. No-op for unknown identifiers.
    pub fn remove_file(&self, id: FileId) {
        let removed = {
            let mut order = self.inner.order.write();
            let removed = self.inner.entries.remove(&id);
            if removed.is_some() {
                order.retain(|tracked| *tracked != id);
            }
            removed
        };

        let Some((_, TrackedFile { file, _preview: preview })) = removed else {
            debug!("Remove ignored, {} is not tracked", id);
            return;
        };
        drop(preview);

        info!("Removed {} ({})", file.name, file.status.label());
        self.inner.events.on_file_removed(&file);
    }

    /// Changes the display name only. No-op for unknown identifiers.
    pub fn rename_file(&self, id: FileId, new_name: impl Into<String>) {
        match self.inner.entries.get_mut(&id) {
            Some(mut entry) => entry.file.name = new_name.into(),
            None => debug!("Rename ignored, {} is not tracked", id),
        }
    }

    /// Uploads one pending entry through the active transport.
    ///
    /// Entries that are not pending are left alone. If the entry is removed while the
    /// transfer runs, its outcome is discarded.
    pub async fn upload_file(&self, id: FileId) {
        let Some((before, uploading)) = self.begin_upload(id) else {
            return;
        };
        self.inner.events.on_upload_start(&before);

        let config = self.inner.config.read().clone();
        let transport = transport::for_config(&config, &self.inner.client);
        debug!("Uploading {} via {}", uploading.name, config.kind());

        let outcome = transport.upload(&uploading, self.progress_reporter(id)).await;
        self.finish_upload(id, outcome);
    }

    /// Uploads every pending entry concurrently and reports the batch once all are done.
    ///
    /// No-op while a batch is already in flight or when every entry already succeeded.
    /// The batch runs on its own task: dropping this future stops waiting for it but never
    /// cancels the uploads.
    pub async fn start_all_uploads(&self) {
        if self.files().iter().all(ManagedFile::is_success) {
            debug!("Nothing to upload");
            return;
        }
        if self
            .inner
            .batch_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Upload batch already in flight");
            return;
        }
        let guard = BatchGuard {
            inner: Arc::clone(&self.inner),
        };

        let uploader = self.clone();
        let batch = tokio::spawn(async move { uploader.run_batch(guard).await });
        if let Err(e) = batch.await {
            error!("Upload batch failed: {}", e);
        }
    }

    async fn run_batch(&self, guard: BatchGuard) {
        let pending: Vec<FileId> = self
            .files()
            .iter()
            .filter(|f| f.is_pending())
            .map(|f| f.id)
            .collect();
        info!("Starting upload batch of {} file(s)", pending.len());

        let mut tasks = JoinSet::new();
        for id in pending {
            let uploader = self.clone();
            tasks.spawn(async move { uploader.upload_file(id).await });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Upload task failed: {}", e);
            }
        }

        drop(guard);

        let files = self.files();
        info!(
            "Upload batch complete: {} succeeded, {} failed",
            files.iter().filter(|f| f.is_success()).count(),
            files.iter().filter(|f| f.error().is_some()).count()
        );
        self.inner.events.on_all_uploads_complete(&files);
    }

    /// Per-entry action set for custom renderers.
    pub fn actions(&self, id: FileId) -> Option<FileActions> {
        self.inner.entries.contains_key(&id).then(|| FileActions {
            uploader: self.clone(),
            id,
        })
    }

    fn begin_upload(&self, id: FileId) -> Option<(ManagedFile, ManagedFile)> {
        let Some(mut entry) = self.inner.entries.get_mut(&id) else {
            debug!("Upload ignored, {} is not tracked", id);
            return None;
        };
        if !entry.file.is_pending() {
            debug!(
                "Upload ignored, {} is {}",
                entry.file.name,
                entry.file.status.label()
            );
            return None;
        }

        let before = entry.file.clone();
        entry.file.status = UploadStatus::Uploading;
        entry.file.progress = 0;
        Some((before, entry.file.clone()))
    }

    fn progress_reporter(&self, id: FileId) -> ProgressFn {
        let inner = Arc::clone(&self.inner);
        Arc::new(move |percent| inner.apply_progress(id, percent))
    }

    fn finish_upload(&self, id: FileId, outcome: Result<String, TransportError>) {
        let status = match &outcome {
            Ok(location) => UploadStatus::Success {
                location: location.clone(),
            },
            Err(e) => UploadStatus::Error {
                message: e.to_string(),
            },
        };

        let snapshot = {
            let Some(mut entry) = self.inner.entries.get_mut(&id) else {
                debug!("Discarding upload outcome, {} was removed", id);
                return;
            };
            if matches!(status, UploadStatus::Success { .. }) {
                entry.file.progress = 100;
            }
            entry.file.status = status;
            entry.file.clone()
        };

        match outcome {
            Ok(location) => {
                info!("Uploaded {} to {}", snapshot.name, location);
                self.inner
                    .events
                    .on_upload_success(&snapshot, Some(&location));
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", snapshot.name, e);
                self.inner.events.on_upload_error(&snapshot, &e.to_string());
            }
        }
    }
}

/// Actions a renderer can trigger for one entry.
#[derive(Clone)]
pub struct FileActions {
    uploader: FileUploader,
    id: FileId,
}

impl FileActions {
    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn remove(&self) {
        self.uploader.remove_file(self.id);
    }

    pub fn rename(&self, new_name: impl Into<String>) {
        self.uploader.rename_file(self.id, new_name);
    }

    pub async fn start_upload(&self) {
        self.uploader.upload_file(self.id).await;
    }
}
