use super::progress::{file_part, progress_body};
use super::{parse_endpoint, ProgressFn, Transport};
use crate::config::{PresignedMethod, S3Config};
use crate::error::TransportError;
use crate::upload::ManagedFile;
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::multipart::Form;

/// Direct upload to object storage through a URL pre-signed by the host.
pub struct PresignedTransport {
    client: reqwest::Client,
    config: S3Config,
}

impl PresignedTransport {
    pub fn new(client: reqwest::Client, config: S3Config) -> Self {
        Self { client, config }
    }
}

/// The pre-signed URL without its signature query.
pub(crate) fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

#[async_trait]
impl Transport for PresignedTransport {
    async fn upload(
        &self,
        file: &ManagedFile,
        on_progress: ProgressFn,
    ) -> Result<String, TransportError> {
        let target = self
            .config
            .presign(file.file.clone())
            .await
            .map_err(|e| TransportError::Presign(e.to_string()))?;
        let url = parse_endpoint(&target.url)?;

        let request = match (target.method, &target.fields) {
            (PresignedMethod::Post, Some(fields)) => {
                let form = fields
                    .iter()
                    .fold(Form::new(), |form, (key, value)| {
                        form.text(key.clone(), value.clone())
                    })
                    .part("file", file_part(&file.file, file.file.name(), on_progress)?);
                self.client.post(url).multipart(form)
            }
            (method, _) => {
                let method = match method {
                    PresignedMethod::Post => reqwest::Method::POST,
                    PresignedMethod::Put => reqwest::Method::PUT,
                };
                self.client
                    .request(method, url)
                    .header(CONTENT_TYPE, file.file.content_type())
                    .header(CONTENT_LENGTH, file.file.len())
                    .body(progress_body(file.file.bytes().clone(), on_progress))
            }
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::StorageStatus {
                status: status.as_u16(),
            });
        }

        Ok(strip_query(&target.url).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://bucket.s3.amazonaws.com/a.png?X-Amz-Signature=abc"),
            "https://bucket.s3.amazonaws.com/a.png"
        );
        assert_eq!(strip_query("https://b.example/a"), "https://b.example/a");
    }
}
