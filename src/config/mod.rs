mod uploader;

pub use uploader::{
    BoxError, CloudinaryConfig, CustomConfig, LocalConfig, PresignFn, PresignFuture,
    PresignedMethod, PresignedTarget, S3Config, UploaderConfig, UploaderKind,
    CLOUDINARY_API_BASE, DEFAULT_FIELD_NAME,
};

use crate::error::ConfigError;
use crate::upload::RawFile;
use crate::utils::accept::AcceptFilter;
use crate::utils::file_size::format_bytes;
use std::env;
use std::time::Duration;

/// Selection bounds of one uploader instance. Changing them means building a new uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBounds {
    /// Allow selecting more than one file at a time (default: false)
    pub multiple: bool,

    /// Maximum number of tracked files (default: 1)
    pub max_files: usize,

    /// Maximum size per file in bytes (default: unbounded)
    pub max_size: u64,

    /// Accepted media types, e.g. "image/*,.pdf" (default: anything)
    pub accept: Option<String>,

    /// Refuse new input entirely (default: false)
    pub disabled: bool,
}

impl Default for UploadBounds {
    fn default() -> Self {
        Self {
            multiple: false,
            max_files: 1,
            max_size: u64::MAX,
            accept: None,
            disabled: false,
        }
    }
}

impl UploadBounds {
    /// Load bounds from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        Self {
            multiple: lookup("UPLOADER_MULTIPLE")
                .map(|v| parse_flag(&v))
                .unwrap_or(default.multiple),

            max_files: lookup("UPLOADER_MAX_FILES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_files),

            max_size: lookup("UPLOADER_MAX_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_size),

            accept: lookup("UPLOADER_ACCEPT")
                .filter(|v| !v.trim().is_empty())
                .or(default.accept),

            disabled: lookup("UPLOADER_DISABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(default.disabled),
        }
    }

    /// Bounds used by the playground: a single image up to 4 MB.
    pub fn playground() -> Self {
        Self {
            multiple: false,
            max_files: 1,
            max_size: 4 * 1024 * 1024,
            accept: Some("image/*".to_string()),
            disabled: false,
        }
    }

    pub fn is_size_bounded(&self) -> bool {
        self.max_size != u64::MAX
    }

    /// Whether `file` passes the accept filter. Files always pass when no filter is set.
    pub fn accepts(&self, file: &RawFile) -> bool {
        match &self.accept {
            Some(accept) => AcceptFilter::parse(accept).matches(file),
            None => true,
        }
    }

    /// Applies the dropzone rules to a raw selection: files outside the accept filter are
    /// split off, and only the first accepted file is kept unless `multiple` is set.
    pub fn filter_selection(&self, files: Vec<RawFile>) -> (Vec<RawFile>, Vec<RawFile>) {
        let (mut accepted, mut rejected): (Vec<_>, Vec<_>) =
            files.into_iter().partition(|file| self.accepts(file));

        if !self.multiple && accepted.len() > 1 {
            rejected.extend(accepted.drain(1..));
        }

        (accepted, rejected)
    }

    /// Hint shown inside the dropzone.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.multiple {
            parts.push("You can upload multiple files.".to_string());
        }
        if let Some(accept) = &self.accept {
            parts.push(format!("Allowed types: {}.", accept));
        }
        if self.is_size_bounded() {
            parts.push(format!("Max size: {}.", format_bytes(self.max_size)));
        }
        parts.join(" ")
    }
}

impl UploaderConfig {
    /// Load the active transport from environment variables.
    ///
    /// `s3` is refused since it needs a host function to pre-sign URLs.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let kind: UploaderKind = match lookup("UPLOADER_TYPE") {
            Some(value) => value.parse()?,
            None => return Ok(Self::default()),
        };

        let config = match Self::defaults_for(kind) {
            UploaderConfig::Local(mut local) => {
                if let Some(ms) = lookup("UPLOADER_SIMULATION_DELAY_MS").and_then(|v| v.parse().ok())
                {
                    local.simulation_delay = Some(Duration::from_millis(ms));
                }
                UploaderConfig::Local(local)
            }
            UploaderConfig::Custom(mut custom) => {
                if let Some(endpoint) = lookup("UPLOADER_ENDPOINT") {
                    custom.endpoint = endpoint;
                }
                custom.field_name = lookup("UPLOADER_FIELD_NAME");
                UploaderConfig::Custom(custom)
            }
            UploaderConfig::Cloudinary(mut cloudinary) => {
                if let Some(cloud_name) = lookup("UPLOADER_CLOUD_NAME") {
                    cloudinary.cloud_name = cloud_name;
                }
                if let Some(preset) = lookup("UPLOADER_UPLOAD_PRESET") {
                    cloudinary.upload_preset = preset;
                }
                UploaderConfig::Cloudinary(cloudinary)
            }
            UploaderConfig::S3(_) => return Err(ConfigError::PresignerRequired),
        };

        Ok(config)
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value != "false" && value != "0" && !value.is_empty()
}
