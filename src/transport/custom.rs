use super::progress::file_part;
use super::{parse_endpoint, ProgressFn, Transport};
use crate::config::CustomConfig;
use crate::error::TransportError;
use crate::upload::ManagedFile;
use async_trait::async_trait;
use reqwest::multipart::Form;
use serde_json::Value;

/// Multipart POST to a host-provided endpoint.
pub struct CustomTransport {
    client: reqwest::Client,
    config: CustomConfig,
}

impl CustomTransport {
    pub fn new(client: reqwest::Client, config: CustomConfig) -> Self {
        Self { client, config }
    }

    fn form(&self, file: &ManagedFile, on_progress: ProgressFn) -> Result<Form, TransportError> {
        let mut form = Form::new().part(
            self.config.field_name().to_string(),
            file_part(&file.file, &file.name, on_progress)?,
        );

        for (key, value) in &self.config.body {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            form = form.text(key.clone(), text);
        }

        Ok(form)
    }
}

/// A `{"url": ...}` object or a JSON string yield their URL; anything else is taken as
/// the location verbatim.
pub(crate) fn resolve_location(body: &str) -> Result<String, TransportError> {
    let location = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("url") {
            Some(Value::String(url)) => url.clone(),
            _ => body.to_string(),
        },
        Ok(Value::String(url)) => url,
        Ok(_) | Err(_) => body.to_string(),
    };

    if location.trim().is_empty() {
        return Err(TransportError::InvalidResponse);
    }
    Ok(location)
}

#[async_trait]
impl Transport for CustomTransport {
    async fn upload(
        &self,
        file: &ManagedFile,
        on_progress: ProgressFn,
    ) -> Result<String, TransportError> {
        let endpoint = parse_endpoint(&self.config.endpoint)?;
        let form = self.form(file, on_progress)?;

        let response = self
            .client
            .post(endpoint)
            .headers(self.config.headers.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        resolve_location(&body)
    }
}
