use crate::error::TransportError;
use crate::upload::RawFile;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::multipart::Part;
use reqwest::Body;
use std::sync::Arc;

pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

const CHUNK_SIZE: usize = 64 * 1024;

pub(crate) fn percent(sent: u64, total: u64) -> u8 {
    ((sent as f64 * 100.0 / total as f64).round() as u64).min(100) as u8
}

/// Splits `bytes` into chunks, reporting the share handed to the connection so far.
///
/// An empty payload has no meaningful length and reports nothing.
pub(crate) fn progress_stream(
    bytes: Bytes,
    on_progress: ProgressFn,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync + 'static {
    let total = bytes.len() as u64;
    let chunks: Vec<Bytes> = (0..bytes.len())
        .step_by(CHUNK_SIZE)
        .map(|start| bytes.slice(start..(start + CHUNK_SIZE).min(bytes.len())))
        .collect();

    let mut sent = 0u64;
    stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        if total > 0 {
            on_progress(percent(sent, total));
        }
        Ok::<_, std::io::Error>(chunk)
    })
}

pub(crate) fn progress_body(bytes: Bytes, on_progress: ProgressFn) -> Body {
    Body::wrap_stream(progress_stream(bytes, on_progress))
}

/// Multipart part carrying `file`'s bytes with progress reporting.
pub(crate) fn file_part(
    file: &RawFile,
    file_name: &str,
    on_progress: ProgressFn,
) -> Result<Part, TransportError> {
    let content_type = match file.content_type().parse::<mime_guess::mime::Mime>() {
        Ok(_) => file.content_type(),
        Err(_) => "application/octet-stream",
    };

    let body = progress_body(file.bytes().clone(), on_progress);
    let part = Part::stream_with_length(body, file.len())
        .file_name(file_name.to_string())
        .mime_str(content_type)?;
    Ok(part)
}
