use crate::upload::RawFile;
use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Parsed form of an accept string such as `image/*,.pdf,application/json`.
#[derive(Debug, Default)]
pub struct AcceptFilter {
    media_types: Vec<Pattern>,
    extensions: Vec<String>,
}

impl AcceptFilter {
    pub fn parse(accept: &str) -> Self {
        let mut filter = Self::default();

        for token in accept.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if token.starts_with('.') {
                filter.extensions.push(token.to_lowercase());
            } else if token.contains('/') {
                match Pattern::new(token) {
                    Ok(pattern) => filter.media_types.push(pattern),
                    Err(e) => tracing::warn!("Ignoring accept pattern '{}': {}", token, e),
                }
            } else {
                tracing::warn!("Ignoring accept token '{}'", token);
            }
        }

        filter
    }

    pub fn is_empty(&self) -> bool {
        self.media_types.is_empty() && self.extensions.is_empty()
    }

    pub fn matches(&self, file: &RawFile) -> bool {
        if self.is_empty() {
            return true;
        }

        let name = file.name().to_lowercase();
        if self.extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            return true;
        }

        self.media_types
            .iter()
            .any(|pattern| pattern.matches_with(file.media_type(), MATCH_OPTIONS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, media_type: &str) -> RawFile {
        RawFile::new(name, media_type, "x")
    }

    #[test]
    fn test_wildcard_media_type() {
        let filter = AcceptFilter::parse("image/*");
        assert!(filter.matches(&file("a.png", "image/png")));
        assert!(filter.matches(&file("a.JPG", "IMAGE/JPEG")));
        assert!(!filter.matches(&file("a.pdf", "application/pdf")));
    }

    #[test]
    fn test_extensions_and_exact_types() {
        let filter = AcceptFilter::parse(" .pdf , application/json");
        assert!(filter.matches(&file("Report.PDF", "")));
        assert!(filter.matches(&file("data", "application/json")));
        assert!(!filter.matches(&file("a.png", "image/png")));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = AcceptFilter::parse(" , ");
        assert!(filter.is_empty());
        assert!(filter.matches(&file("anything.bin", "application/octet-stream")));
    }
}
