//! Upload queue with pluggable transports.
//!
//! [`FileUploader`] tracks user-selected files through `pending → uploading → success|error`
//! and hands each one to the transport chosen by [`UploaderConfig`]: a local simulation,
//! a generic multipart endpoint, a Cloudinary-style media host or pre-signed object
//! storage URLs.

pub mod config;
pub mod error;
pub mod transport;
pub mod upload;
pub mod utils;

pub use config::{UploadBounds, UploaderConfig, UploaderKind};
pub use error::{ConfigError, TransportError, ValidationError};
pub use upload::{
    ChannelEvents, FileActions, FileId, FileUploader, ManagedFile, RawFile, UploadEvents,
    UploadStatus, UploaderEvent,
};
