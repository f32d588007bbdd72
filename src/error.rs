use thiserror::Error;

/// Raised while a selection is validated in `add_files`. The offending file is never
/// enqueued and the rest of the batch is unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Cannot add more than {max} files.")]
    TooManyFiles { max: usize },

    #[error("File size exceeds the limit of {max} bytes.")]
    FileTooLarge { max: u64 },
}

/// Invalid uploader configuration. Surfaces through [`TransportError::Configuration`]
/// when it is hit during an upload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid uploader type specified: {0}")]
    UnknownUploader(String),

    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    #[error("The s3 uploader needs a pre-signing function and cannot be loaded from the environment")]
    PresignerRequired,

    #[error("Could not parse curl command: {0}")]
    Curl(String),
}

/// Failure of a single upload. Always resolves the affected entry to `error`.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Upload failed with status: {status}")]
    Status { status: u16 },

    #[error("Network error during upload.")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from custom server.")]
    InvalidResponse,

    #[error("Cloudinary upload failed: secure_url not found in response.")]
    MissingSecureUrl,

    #[error("{0}")]
    Provider(String),

    #[error("S3 upload failed with status: {status}")]
    StorageStatus { status: u16 },

    #[error("Could not obtain pre-signed URL: {0}")]
    Presign(String),

    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::TooManyFiles { max: 3 }.to_string(),
            "Cannot add more than 3 files."
        );
        assert_eq!(
            ValidationError::FileTooLarge { max: 1024 }.to_string(),
            "File size exceeds the limit of 1024 bytes."
        );
    }

    #[test]
    fn test_transport_messages_cite_status() {
        assert_eq!(
            TransportError::Status { status: 500 }.to_string(),
            "Upload failed with status: 500"
        );
        assert_eq!(
            TransportError::StorageStatus { status: 403 }.to_string(),
            "S3 upload failed with status: 403"
        );
    }

    #[test]
    fn test_client_errors_surface_as_network_failures() {
        let err: TransportError = reqwest::multipart::Part::text("x")
            .mime_str("not a media type")
            .unwrap_err()
            .into();
        assert!(matches!(err, TransportError::Network(_)));
        assert_eq!(err.to_string(), "Network error during upload.");
    }

    #[test]
    fn test_configuration_error_is_transparent() {
        let err: TransportError = ConfigError::UnknownUploader("ftp".into()).into();
        assert_eq!(err.to_string(), "Invalid uploader type specified: ftp");
    }
}
