use crate::error::ConfigError;
use crate::upload::RawFile;
use derivative::Derivative;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_FIELD_NAME: &str = "file";
pub const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub type PresignFuture = BoxFuture<'static, Result<PresignedTarget, BoxError>>;
pub type PresignFn = Arc<dyn Fn(RawFile) -> PresignFuture + Send + Sync>;

/// Which transport handles uploads, with that transport's parameters.
#[derive(Debug, Clone)]
pub enum UploaderConfig {
    Local(LocalConfig),
    Custom(CustomConfig),
    Cloudinary(CloudinaryConfig),
    S3(S3Config),
}

impl Default for UploaderConfig {
    fn default() -> Self {
        UploaderConfig::Local(LocalConfig::default())
    }
}

impl UploaderConfig {
    pub fn kind(&self) -> UploaderKind {
        match self {
            UploaderConfig::Local(_) => UploaderKind::Local,
            UploaderConfig::Custom(_) => UploaderKind::Custom,
            UploaderConfig::Cloudinary(_) => UploaderKind::Cloudinary,
            UploaderConfig::S3(_) => UploaderKind::S3,
        }
    }

    /// Fresh configuration for `kind`, sharing nothing with whatever was active before.
    pub fn defaults_for(kind: UploaderKind) -> Self {
        match kind {
            UploaderKind::Local => UploaderConfig::Local(LocalConfig {
                simulation_delay: Some(Duration::from_millis(500)),
            }),
            UploaderKind::Custom => {
                UploaderConfig::Custom(CustomConfig::new("https://api.example.com/upload"))
            }
            UploaderKind::Cloudinary => UploaderConfig::Cloudinary(CloudinaryConfig::new(
                "your-cloud-name",
                "your-preset",
            )),
            UploaderKind::S3 => UploaderConfig::S3(S3Config::new(|_file| async {
                Ok::<_, BoxError>(PresignedTarget::post(
                    "your-backend-presigned-url-endpoint",
                ))
            })),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploaderKind {
    Local,
    Custom,
    Cloudinary,
    S3,
}

impl UploaderKind {
    pub const ALL: [UploaderKind; 4] = [
        UploaderKind::Local,
        UploaderKind::Custom,
        UploaderKind::Cloudinary,
        UploaderKind::S3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UploaderKind::Local => "local",
            UploaderKind::Custom => "custom",
            UploaderKind::Cloudinary => "cloudinary",
            UploaderKind::S3 => "s3",
        }
    }
}

impl fmt::Display for UploaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploaderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(UploaderKind::Local),
            "custom" => Ok(UploaderKind::Custom),
            "cloudinary" => Ok(UploaderKind::Cloudinary),
            "s3" => Ok(UploaderKind::S3),
            other => Err(ConfigError::UnknownUploader(other.to_string())),
        }
    }
}

/// Simulated uploads without a backend.
#[derive(Debug, Clone, Default)]
pub struct LocalConfig {
    /// Total simulated duration. A random 500..1000 ms is used when unset.
    pub simulation_delay: Option<Duration>,
}

/// Multipart POST to an arbitrary endpoint.
#[derive(Debug, Clone)]
pub struct CustomConfig {
    pub endpoint: String,
    pub headers: HeaderMap,
    /// Extra form fields sent next to the file.
    pub body: Map<String, Value>,
    pub field_name: Option<String>,
}

impl CustomConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headers: HeaderMap::new(),
            body: Map::new(),
            field_name: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ConfigError> {
        let header_name = HeaderName::from_str(&name.to_lowercase())
            .map_err(|_| ConfigError::InvalidHeader(name.to_string()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader(name.to_string()))?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    pub fn field_name(&self) -> &str {
        self.field_name.as_deref().unwrap_or(DEFAULT_FIELD_NAME)
    }
}

/// Unsigned uploads to a Cloudinary-style media host.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    /// Scheme and host of the upload API.
    pub api_base: String,
}

impl CloudinaryConfig {
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
            api_base: CLOUDINARY_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1_1/{}/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresignedMethod {
    #[default]
    Post,
    Put,
}

/// Where and how to send a file, as issued by the host's backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedTarget {
    pub url: String,
    /// Form fields that must precede the file in a POST policy upload.
    pub fields: Option<Vec<(String, String)>>,
    pub method: PresignedMethod,
}

impl PresignedTarget {
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fields: None,
            method: PresignedMethod::Post,
        }
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self {
            method: PresignedMethod::Put,
            ..Self::post(url)
        }
    }

    pub fn with_fields(mut self, fields: Vec<(String, String)>) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// Direct uploads to object storage through URLs pre-signed by the host.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct S3Config {
    #[derivative(Debug = "ignore")]
    pub get_presigned_url: PresignFn,
}

impl S3Config {
    pub fn new<F, Fut, E>(get_presigned_url: F) -> Self
    where
        F: Fn(RawFile) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PresignedTarget, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let get_presigned_url: PresignFn = Arc::new(move |file: RawFile| -> PresignFuture {
            let pending = get_presigned_url(file);
            async move { pending.await.map_err(Into::into) }.boxed()
        });
        Self { get_presigned_url }
    }

    pub fn presign(&self, file: RawFile) -> PresignFuture {
        (self.get_presigned_url)(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in UploaderKind::ALL {
            assert_eq!(kind.as_str().parse::<UploaderKind>().unwrap(), kind);
        }
        assert!(matches!(
            "ftp".parse::<UploaderKind>(),
            Err(ConfigError::UnknownUploader(_))
        ));
    }

    #[test]
    fn test_defaults_match_requested_kind() {
        for kind in UploaderKind::ALL {
            assert_eq!(UploaderConfig::defaults_for(kind).kind(), kind);
        }
        assert_eq!(UploaderConfig::default().kind(), UploaderKind::Local);
    }

    #[test]
    fn test_switching_kind_drops_previous_fields() {
        let custom = CustomConfig::new("https://a.example/upload")
            .with_header("Authorization", "Bearer t")
            .unwrap()
            .with_field("album", "x")
            .with_field_name("photo");
        let active = UploaderConfig::Custom(custom);
        assert_eq!(active.kind(), UploaderKind::Custom);

        let active = UploaderConfig::defaults_for(UploaderKind::Cloudinary);
        assert_eq!(active.kind(), UploaderKind::Cloudinary);
        let active = UploaderConfig::defaults_for(UploaderKind::Custom);

        let UploaderConfig::Custom(c) = active else {
            panic!("expected custom config");
        };
        assert_eq!(c.endpoint, "https://api.example.com/upload");
        assert!(c.headers.is_empty());
        assert!(c.body.is_empty());
        assert_eq!(c.field_name(), "file");
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let res = CustomConfig::new("https://a.example").with_header("bad header", "v");
        assert_eq!(
            res.unwrap_err(),
            ConfigError::InvalidHeader("bad header".into())
        );
    }

    #[test]
    fn test_cloudinary_endpoint() {
        let config = CloudinaryConfig::new("demo", "unsigned");
        assert_eq!(
            config.endpoint(),
            "https://api.cloudinary.com/v1_1/demo/upload"
        );
        let config = config.with_api_base("http://127.0.0.1:9000/");
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000/v1_1/demo/upload");
    }

    #[tokio::test]
    async fn test_s3_config_calls_host_function() {
        let config = S3Config::new(|file: RawFile| async move {
            Ok::<_, BoxError>(PresignedTarget::put(format!(
                "https://bucket.example/{}?sig=1",
                file.name()
            )))
        });
        let target = config
            .presign(RawFile::new("a.bin", "", "x"))
            .await
            .unwrap();
        assert_eq!(target.url, "https://bucket.example/a.bin?sig=1");
        assert_eq!(target.method, PresignedMethod::Put);
    }
}
