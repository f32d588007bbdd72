#![allow(dead_code)]

use axum::extract::Multipart;
use axum::http::HeaderMap;
use axum::Router;
use file_uploader::{ManagedFile, UploaderEvent};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// One multipart field as the test server saw it.
#[derive(Debug, Clone)]
pub struct ReceivedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Everything the test server recorded about one request.
#[derive(Debug, Clone, Default)]
pub struct ReceivedRequest {
    pub headers: HeaderMap,
    pub fields: Vec<ReceivedField>,
    pub body: Vec<u8>,
}

impl ReceivedRequest {
    pub fn field(&self, name: &str) -> Option<&ReceivedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.field(name)
            .map(|f| String::from_utf8_lossy(&f.data).to_string())
    }
}

pub type Captured = Arc<Mutex<Vec<ReceivedRequest>>>;

pub async fn read_multipart(headers: HeaderMap, mut multipart: Multipart) -> ReceivedRequest {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        fields.push(ReceivedField {
            name,
            file_name,
            content_type,
            data,
        });
    }

    ReceivedRequest {
        headers,
        fields,
        body: Vec::new(),
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A local URL nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/upload", addr)
}

pub fn drain(rx: &Receiver<UploaderEvent>) -> Vec<UploaderEvent> {
    rx.try_iter().collect()
}

pub fn progress_of(events: &[UploaderEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            UploaderEvent::Progress(_, p) => Some(*p),
            _ => None,
        })
        .collect()
}

pub fn failures(events: &[UploaderEvent]) -> Vec<(ManagedFile, String)> {
    events
        .iter()
        .filter_map(|e| match e {
            UploaderEvent::Failed(f, msg) => Some((f.clone(), msg.clone())),
            _ => None,
        })
        .collect()
}

pub fn count<F: Fn(&UploaderEvent) -> bool>(events: &[UploaderEvent], pred: F) -> usize {
    events.iter().filter(|e| pred(e)).count()
}
