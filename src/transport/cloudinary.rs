use super::progress::file_part;
use super::{parse_endpoint, ProgressFn, Transport};
use crate::config::CloudinaryConfig;
use crate::error::TransportError;
use crate::upload::ManagedFile;
use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::Deserialize;

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Unsigned upload to a Cloudinary-style media host.
pub struct CloudinaryTransport {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryTransport {
    pub fn new(client: reqwest::Client, config: CloudinaryConfig) -> Self {
        Self { client, config }
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|res| res.error.message)
        .filter(|message| !message.is_empty())
}

#[async_trait]
impl Transport for CloudinaryTransport {
    async fn upload(
        &self,
        file: &ManagedFile,
        on_progress: ProgressFn,
    ) -> Result<String, TransportError> {
        let endpoint = parse_endpoint(&self.config.endpoint())?;
        let form = Form::new()
            .part("file", file_part(&file.file, file.file.name(), on_progress)?)
            .text("upload_preset", self.config.upload_preset.clone());

        let response = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match error_message(&body) {
                Some(message) => TransportError::Provider(message),
                None => TransportError::Status {
                    status: status.as_u16(),
                },
            });
        }

        serde_json::from_str::<UploadResponse>(&body)
            .ok()
            .and_then(|res| res.secure_url)
            .ok_or(TransportError::MissingSecureUrl)
    }
}
