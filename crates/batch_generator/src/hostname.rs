//! Lenient hostname extraction
//!
//! Frontier URLs are not always absolute; `example.com/page` and
//! `//example.com/page` are accepted by retrying with an `http://` base.

use thiserror::Error;
use url::{ParseError, Url};

/// Hostname resolution failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostnameError {
    /// URL could not be parsed at all
    #[error("invalid url: {0}")]
    Invalid(#[from] ParseError),

    /// URL parsed but carries no host
    #[error("url has no host")]
    MissingHost,
}

/// Extract the lowercase hostname from `raw`
///
/// IPv6 literals are returned without brackets.
pub fn parse_hostname(raw: &str) -> Result<String, HostnameError> {
    let trimmed = raw.trim();

    match Url::parse(trimmed) {
        Ok(url) => {
            if let Some(host) = host_of(&url) {
                return Ok(host);
            }
            // "example.com:8080/x" parses with "example.com" as the scheme
            if !trimmed.contains("://") && url.scheme().contains('.') {
                return parse_with_default_scheme(trimmed);
            }
            Err(HostnameError::MissingHost)
        }
        Err(ParseError::RelativeUrlWithoutBase) => parse_with_default_scheme(trimmed),
        Err(e) => Err(HostnameError::Invalid(e)),
    }
}

fn parse_with_default_scheme(trimmed: &str) -> Result<String, HostnameError> {
    let rest = trimmed.trim_start_matches('/');
    if rest.is_empty() {
        return Err(HostnameError::MissingHost);
    }
    let url = Url::parse(&format!("http://{rest}"))?;
    host_of(&url).ok_or(HostnameError::MissingHost)
}

fn host_of(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_urls() {
        assert_eq!(parse_hostname("https://Example.COM/a?b=1").unwrap(), "example.com");
        assert_eq!(parse_hostname("http://user:pw@host.example:8080/").unwrap(), "host.example");
        assert_eq!(parse_hostname("  http://padded.example/ ").unwrap(), "padded.example");
    }

    #[test]
    fn test_scheme_less_urls() {
        assert_eq!(parse_hostname("example.com/path").unwrap(), "example.com");
        assert_eq!(parse_hostname("//cdn.example/x.js").unwrap(), "cdn.example");
        assert_eq!(parse_hostname("example.com:8080/path").unwrap(), "example.com");
    }

    #[test]
    fn test_ipv6_brackets_stripped() {
        assert_eq!(parse_hostname("http://[::1]:8000/").unwrap(), "::1");
    }

    #[test]
    fn test_missing_host() {
        assert_eq!(parse_hostname("mailto:someone@example.com"), Err(HostnameError::MissingHost));
        assert_eq!(parse_hostname(""), Err(HostnameError::MissingHost));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(parse_hostname("http://"), Err(HostnameError::Invalid(_))));
        assert!(matches!(parse_hostname("http://exa mple.com/"), Err(HostnameError::Invalid(_))));
    }
}
