//! URL normalization for links being shortened.

use url::Url;

/// Longest original URL accepted.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL is longer than {MAX_URL_LENGTH} characters")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must have a host")]
    MissingHost,
}

/// Normalizes a URL to a canonical form.
///
/// Surrounding whitespace is trimmed, only `http`/`https` are accepted, the
/// host is lowercased, default ports and fragments are removed. Path and query
/// are preserved as-is.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("  HTTPS://Example.COM:443/Docs#intro ").unwrap(),
///     "https://example.com/Docs"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlNormalizationError::TooLong);
    }

    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    }

    // The url crate lowercases hosts and drops default ports while parsing
    // special schemes; only the fragment needs explicit removal.
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }
    url.set_fragment(None);

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_root_path() {
        assert_eq!(
            normalize_url("https://example.com").unwrap(),
            "https://example.com/"
        );
    }

    #[test]
    fn test_normalize_lowercases_host_keeps_path_case() {
        assert_eq!(
            normalize_url("https://EXAMPLE.COM/Path").unwrap(),
            "https://example.com/Path"
        );
    }

    #[test]
    fn test_normalize_removes_default_ports() {
        assert_eq!(
            normalize_url("http://example.com:80/a").unwrap(),
            "http://example.com/a"
        );
        assert_eq!(
            normalize_url("https://example.com:443/a").unwrap(),
            "https://example.com/a"
        );
        assert_eq!(
            normalize_url("https://example.com:8443/a").unwrap(),
            "https://example.com:8443/a"
        );
    }

    #[test]
    fn test_normalize_strips_fragment_keeps_query() {
        assert_eq!(
            normalize_url("https://example.com/page?x=1#section").unwrap(),
            "https://example.com/page?x=1"
        );
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(
            normalize_url("  https://example.com/  ").unwrap(),
            "https://example.com/"
        );
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert_eq!(normalize_url("   "), Err(UrlNormalizationError::Empty));
        assert_eq!(
            normalize_url("javascript:alert(1)"),
            Err(UrlNormalizationError::UnsupportedProtocol)
        );
        assert_eq!(
            normalize_url("ftp://example.com/file"),
            Err(UrlNormalizationError::UnsupportedProtocol)
        );
        assert!(matches!(
            normalize_url("not a url"),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));

        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert_eq!(normalize_url(&long), Err(UrlNormalizationError::TooLong));
    }
}
