//! Resource-owner subject resolution for the authorization endpoint.
//!
//! Authenticating the resource owner is outside this server. Whatever did
//! the login (a reverse proxy, an SSO gateway) hands the subject over, and a
//! [`SubjectResolver`] reads it off the request.

use axum::http::{HeaderMap, HeaderName};

/// Yields the authenticated subject of an authorization request.
pub trait SubjectResolver: Send + Sync {
    /// Returns the subject, or `None` when the request is not authenticated.
    fn resolve(&self, headers: &HeaderMap) -> Option<String>;
}

/// Trusts a header set by an upstream authenticating proxy.
///
/// Only deploy behind a proxy that strips the header from client requests.
#[derive(Debug, Clone)]
pub struct HeaderSubjectResolver {
    header: HeaderName,
}

impl HeaderSubjectResolver {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl SubjectResolver for HeaderSubjectResolver {
    fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn resolver() -> HeaderSubjectResolver {
        HeaderSubjectResolver::new(HeaderName::from_static("x-authenticated-user"))
    }

    #[test]
    fn test_reads_configured_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-authenticated-user", HeaderValue::from_static(" alice "));
        assert_eq!(resolver().resolve(&headers).as_deref(), Some("alice"));
    }

    #[test]
    fn test_missing_or_blank_header() {
        assert_eq!(resolver().resolve(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("x-authenticated-user", HeaderValue::from_static("  "));
        assert_eq!(resolver().resolve(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert("x-other", HeaderValue::from_static("alice"));
        assert_eq!(resolver().resolve(&headers), None);
    }
}
