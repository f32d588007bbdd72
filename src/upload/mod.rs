mod events;
mod preview;
mod queue;
mod types;

pub use events::{ChannelEvents, NoopEvents, UploadEvents, UploaderEvent};
pub use preview::{PreviewHandle, PreviewRegistry};
pub use queue::{FileActions, FileUploader, FileUploaderBuilder};
pub use types::{FileId, ManagedFile, RawFile, UploadStatus};
