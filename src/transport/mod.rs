//! Transport adapters: one strategy per backend kind, all behind [`Transport`].

mod cloudinary;
mod custom;
mod local;
mod presigned;
mod progress;

pub use cloudinary::CloudinaryTransport;
pub use custom::CustomTransport;
pub use local::LocalTransport;
pub use presigned::PresignedTransport;
pub use progress::ProgressFn;

use crate::config::UploaderConfig;
use crate::error::{ConfigError, TransportError};
use crate::upload::ManagedFile;
use async_trait::async_trait;
use url::Url;

/// Sends one file to a backend.
///
/// `on_progress` receives non-decreasing percentages in `0..=100`, zero or more times.
/// Resolves to the remote location of the uploaded file.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn upload(&self, file: &ManagedFile, on_progress: ProgressFn)
        -> Result<String, TransportError>;
}

/// Picks the adapter for the active configuration.
pub fn for_config(config: &UploaderConfig, client: &reqwest::Client) -> Box<dyn Transport> {
    match config {
        UploaderConfig::Local(local) => Box::new(LocalTransport::new(local.clone())),
        UploaderConfig::Custom(custom) => {
            Box::new(CustomTransport::new(client.clone(), custom.clone()))
        }
        UploaderConfig::Cloudinary(cloudinary) => {
            Box::new(CloudinaryTransport::new(client.clone(), cloudinary.clone()))
        }
        UploaderConfig::S3(s3) => Box::new(PresignedTransport::new(client.clone(), s3.clone())),
    }
}

pub(crate) fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    Url::parse(endpoint).map_err(|e| ConfigError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })
}
