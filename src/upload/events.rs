use crate::upload::types::ManagedFile;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Host callback surface. Every hook is optional; the defaults do nothing.
pub trait UploadEvents: Send + Sync {
    fn on_upload_start(&self, _file: &ManagedFile) {}

    fn on_upload_progress(&self, _file: &ManagedFile, _percent: u8) {}

    fn on_upload_success(&self, _file: &ManagedFile, _location: Option<&str>) {}

    /// Also receives files rejected by validation, which are never enqueued.
    fn on_upload_error(&self, _file: &ManagedFile, _message: &str) {}

    fn on_files_added(&self, _files: &[ManagedFile]) {}

    fn on_file_removed(&self, _file: &ManagedFile) {}

    fn on_all_uploads_complete(&self, _files: &[ManagedFile]) {}
}

/// Sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl UploadEvents for NoopEvents {}

#[derive(Debug, Clone)]
pub enum UploaderEvent {
    UploadStarted(ManagedFile),
    Progress(ManagedFile, u8),
    Succeeded(ManagedFile, Option<String>),
    Failed(ManagedFile, String),
    FilesAdded(Vec<ManagedFile>),
    FileRemoved(ManagedFile),
    AllUploadsComplete(Vec<ManagedFile>),
}

/// Forwards every hook into a channel, for hosts that poll (such as an immediate-mode UI).
#[derive(Clone)]
pub struct ChannelEvents {
    sender: Sender<UploaderEvent>,
}

impl ChannelEvents {
    pub fn new() -> (Self, Receiver<UploaderEvent>) {
        let (sender, receiver) = channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: UploaderEvent) {
        // A dropped receiver only means nobody is listening anymore.
        let _ = self.sender.send(event);
    }
}

impl UploadEvents for ChannelEvents {
    fn on_upload_start(&self, file: &ManagedFile) {
        self.send(UploaderEvent::UploadStarted(file.clone()));
    }

    fn on_upload_progress(&self, file: &ManagedFile, percent: u8) {
        self.send(UploaderEvent::Progress(file.clone(), percent));
    }

    fn on_upload_success(&self, file: &ManagedFile, location: Option<&str>) {
        self.send(UploaderEvent::Succeeded(
            file.clone(),
            location.map(str::to_string),
        ));
    }

    fn on_upload_error(&self, file: &ManagedFile, message: &str) {
        self.send(UploaderEvent::Failed(file.clone(), message.to_string()));
    }

    fn on_files_added(&self, files: &[ManagedFile]) {
        self.send(UploaderEvent::FilesAdded(files.to_vec()));
    }

    fn on_file_removed(&self, file: &ManagedFile) {
        self.send(UploaderEvent::FileRemoved(file.clone()));
    }

    fn on_all_uploads_complete(&self, files: &[ManagedFile]) {
        self.send(UploaderEvent::AllUploadsComplete(files.to_vec()));
    }
}
