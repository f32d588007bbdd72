use crate::upload::types::RawFile;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Client-side store of preview references, the local analogue of object URLs.
///
/// A reference resolves to the file's bytes without any network round trip for as long
/// as its [`PreviewHandle`] is alive.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<DashMap<String, Bytes>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh reference for `file`.
    pub fn create(&self, file: &RawFile) -> PreviewHandle {
        let url = format!("blob:preview/{}", Uuid::new_v4());
        self.live.insert(url.clone(), file.bytes().clone());
        tracing::debug!("Created preview {} for {}", url, file.name());

        PreviewHandle {
            url,
            live: Arc::clone(&self.live),
        }
    }

    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.live.get(url).map(|entry| entry.value().clone())
    }

    /// Number of references that have not been released yet.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// Owning handle of one preview reference. Dropping it releases the reference.
#[derive(Debug)]
pub struct PreviewHandle {
    url: String,
    live: Arc<DashMap<String, Bytes>>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if self.live.remove(&self.url).is_some() {
            tracing::debug!("Released preview {}", self.url);
        }
    }
}
