use file_uploader::{FileId, ManagedFile, UploaderEvent};
use std::collections::HashMap;

/// One line of the activity log shown under "Show Details".
#[derive(Debug, Clone)]
pub enum Activity {
    Added(usize),
    Started(String),
    Succeeded(String, Option<String>),
    Failed(String, String),
    Removed(String),
    BatchComplete { successful: usize, failed: usize },
}

#[derive(Default)]
pub struct PlaygroundState {
    pub activity: Vec<Activity>,
    pub error_message: Option<String>,
    pub notice: Option<String>,
    pub show_details: bool,
    /// Display names being edited, keyed by entry.
    pub name_drafts: HashMap<FileId, String>,
    pub drag_hover: bool,
}

impl PlaygroundState {
    pub fn clear(&mut self) {
        *self = PlaygroundState::default();
    }

    pub fn apply(&mut self, event: UploaderEvent) {
        match event {
            // Progress is read straight off the queue snapshot every frame.
            UploaderEvent::Progress(..) => {}
            UploaderEvent::UploadStarted(file) => {
                self.activity.push(Activity::Started(file.name));
            }
            UploaderEvent::Succeeded(file, location) => {
                self.activity.push(Activity::Succeeded(file.name, location));
            }
            UploaderEvent::Failed(file, message) => {
                self.error_message = Some(format!("{}: {}", file.name, message));
                self.activity.push(Activity::Failed(file.name, message));
            }
            UploaderEvent::FilesAdded(files) => {
                if !files.is_empty() {
                    self.activity.push(Activity::Added(files.len()));
                }
            }
            UploaderEvent::FileRemoved(file) => {
                self.name_drafts.remove(&file.id);
                self.activity.push(Activity::Removed(file.name));
            }
            UploaderEvent::AllUploadsComplete(files) => {
                let successful = files.iter().filter(|f| f.is_success()).count();
                let failed = files.iter().filter(|f| f.error().is_some()).count();
                if failed > 0 {
                    self.error_message = Some(
                        "Upload completed with failures. Check details for more information."
                            .to_string(),
                    );
                }
                self.activity
                    .push(Activity::BatchComplete { successful, failed });
            }
        }
    }
}

/// Mean progress of every tracked file, in `0.0..=1.0`.
pub fn get_progress_percentage(files: &[ManagedFile]) -> f32 {
    if files.is_empty() {
        return 0.0;
    }
    let sum: u32 = files.iter().map(|f| u32::from(f.progress)).sum();
    sum as f32 / (files.len() as f32 * 100.0)
}

pub fn get_status_text(files: &[ManagedFile]) -> String {
    let successful = files.iter().filter(|f| f.is_success()).count();
    let failed = files.iter().filter(|f| f.error().is_some()).count();
    let pending = files.iter().filter(|f| f.is_pending()).count();
    format!(
        "Files: {} | ⏳ Pending: {} | ✅ Success: {} | ❌ Failed: {}",
        files.len(),
        pending,
        successful,
        failed
    )
}
