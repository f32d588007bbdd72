use bytes::Bytes;
use derivative::Derivative;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Opaque identifier of a queue entry, stable for the entry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A user-selected file: immutable payload, declared media type and original name.
///
/// Cloning is cheap; the payload is reference counted.
#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug)]
pub struct RawFile {
    name: String,
    media_type: String,
    #[derivative(Debug = "ignore")]
    bytes: Bytes,
}

impl RawFile {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, guessing its media type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "Invalid filename")
            })?;
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let bytes = fs::read(path)?;

        Ok(Self::new(name, media_type, bytes))
    }

    /// Original file name, independent of the entry's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Media type to send on the wire. Falls back to octet-stream when none was declared.
    pub fn content_type(&self) -> &str {
        if self.media_type.is_empty() {
            "application/octet-stream"
        } else {
            &self.media_type
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success { location: String },
    Error { message: String },
}

impl UploadStatus {
    pub fn label(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Success { .. } => "success",
            UploadStatus::Error { .. } => "error",
        }
    }
}

/// Snapshot of one tracked queue entry.
///
/// The queue hands out clones; changing a snapshot never changes the queue. The error
/// message and the resolved location live inside [`UploadStatus`], so only the one that
/// matches the status can exist.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedFile {
    pub id: FileId,
    pub file: RawFile,
    pub name: String,
    pub status: UploadStatus,
    pub progress: u8,
    /// Client-side preview reference. `None` for rejected files that were never enqueued.
    pub preview_url: Option<String>,
}

impl ManagedFile {
    pub(crate) fn new(file: RawFile, preview_url: Option<String>) -> Self {
        Self {
            id: FileId::new(),
            name: file.name().to_string(),
            file,
            status: UploadStatus::Pending,
            progress: 0,
            preview_url,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            UploadStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match &self.status {
            UploadStatus::Success { location } => Some(location),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == UploadStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, UploadStatus::Success { .. })
    }

    pub fn size(&self) -> u64 {
        self.file.len()
    }
}
