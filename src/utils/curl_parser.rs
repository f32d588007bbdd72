use crate::config::CustomConfig;
use crate::error::ConfigError;

/// Headers the multipart body computes itself; copying them from a captured request
/// would break the boundary.
const SKIPPED_HEADERS: [&str; 2] = ["content-type", "content-length"];

/// Builds a custom-endpoint configuration from a "Copy as cURL" command.
///
/// Picks up the target URL, every `-H`/`--header` line and plain `-F`/`--form` fields.
/// File fields (`-F 'file=@path'`) only tell us the field name.
pub struct CurlImport;

impl CurlImport {
    pub fn parse(curl_text: &str) -> Result<CustomConfig, ConfigError> {
        let endpoint = Self::extract_url(curl_text)
            .ok_or_else(|| ConfigError::Curl("Could not find a URL in curl command".into()))?;
        url::Url::parse(&endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            url: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let mut config = CustomConfig::new(endpoint);

        for line in curl_text.lines() {
            let line = line.trim().trim_end_matches('\\').trim();

            if let Some(content) = Self::option_value(line, &["-H", "--header"]) {
                let Some((key, value)) = content.split_once(':') else {
                    continue;
                };
                let key = key.trim();
                if SKIPPED_HEADERS.contains(&key.to_lowercase().as_str()) {
                    continue;
                }
                config = config.with_header(key, value.trim())?;
            } else if let Some(content) = Self::option_value(line, &["-F", "--form"]) {
                let Some((key, value)) = content.split_once('=') else {
                    continue;
                };
                if value.starts_with('@') {
                    config = config.with_field_name(key);
                } else {
                    config = config.with_field(key, value);
                }
            }
        }

        Ok(config)
    }

    fn extract_url(curl_text: &str) -> Option<String> {
        curl_text
            .split_whitespace()
            .map(Self::unquote)
            .find(|token| token.starts_with("http://") || token.starts_with("https://"))
            .map(str::to_string)
    }

    fn option_value<'a>(line: &'a str, flags: &[&str]) -> Option<&'a str> {
        flags.iter().find_map(|flag| {
            line.strip_prefix(flag)
                .filter(|rest| rest.starts_with(' '))
                .map(|rest| Self::unquote(rest.trim()))
        })
    }

    fn unquote(token: &str) -> &str {
        token
            .trim_start_matches(['\'', '"'])
            .trim_end_matches(['\'', '"'])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTURED: &str = r#"curl 'https://files.example.com/api/upload' \
  -H 'authorization: Bearer abc123' \
  -H 'content-type: multipart/form-data; boundary=xyz' \
  -H "x-tenant: acme" \
  -F 'album=holiday' \
  -F 'attachment=@photo.png'"#;

    #[test]
    fn test_parse_captured_command() {
        let config = CurlImport::parse(CAPTURED).unwrap();

        assert_eq!(config.endpoint, "https://files.example.com/api/upload");
        assert_eq!(config.headers["authorization"], "Bearer abc123");
        assert_eq!(config.headers["x-tenant"], "acme");
        assert!(config.headers.get("content-type").is_none());
        assert_eq!(config.body["album"], "holiday");
        assert_eq!(config.field_name(), "attachment");
    }

    #[test]
    fn test_missing_url_is_an_error() {
        let err = CurlImport::parse("curl -H 'a: b'").unwrap_err();
        assert!(matches!(err, ConfigError::Curl(_)));
    }
}
