//! Request intents and responses
//!
//! A [`RequestIntent`] is the caller's description of one API call, free of
//! credentials and base URLs; the executor and transport fill those in. An
//! [`ApiResponse`] is the surfaced success, annotated with how many attempts
//! the call took.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ApiError;
use crate::nql::Filter;

/// Which of the two Ghost API surfaces a request targets.
///
/// The scope decides both the URL segment and how the request is
/// authenticated: content-scoped requests carry the content key as a query
/// parameter, admin-scoped requests carry a short-lived signed token in the
/// `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiScope {
    /// Public, read-only surface (`/ghost/api/content/`).
    Content,
    /// Privileged surface (`/ghost/api/admin/`).
    Admin,
}

impl ApiScope {
    /// URL path segment for this scope.
    #[must_use]
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for ApiScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// One API call, described independently of credentials and endpoint.
#[derive(Debug, Clone)]
pub struct RequestIntent {
    /// HTTP method.
    pub method: reqwest::Method,
    /// Resource path relative to the API root (`posts/`, `posts/abc123/`).
    pub path: String,
    /// Query parameters, in insertion order.
    pub query: Vec<(String, String)>,
    /// JSON body for mutating calls.
    pub body: Option<serde_json::Value>,
}

impl RequestIntent {
    /// A GET intent for `path` with no query parameters.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A POST intent for `path` carrying `body`.
    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: reqwest::Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// A PUT intent for `path` carrying `body`.
    #[must_use]
    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: reqwest::Method::PUT,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// A DELETE intent for `path`.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::DELETE,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Encodes `filter` and appends it as the `filter` query parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidFilter`] if the tree fails encoding.
    pub fn with_filter(self, filter: &Filter) -> Result<Self, ApiError> {
        let encoded = filter.encode()?;
        Ok(self.with_query("filter", encoded))
    }
}

/// A completed, non-error API call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON body; `Null` for empty bodies (204 deletes).
    pub body: serde_json::Value,
    /// Attempts the call took, starting at 1.
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nql::Filter;

    /// Validates `RequestIntent::with_filter` behavior for the filter
    /// attachment scenario.
    ///
    /// Assertions:
    /// - Ensures the encoded filter lands in the `filter` query parameter.
    /// - Confirms existing parameters keep their order.
    #[test]
    fn attaches_encoded_filter() {
        let intent = RequestIntent::get("posts/")
            .with_query("limit", "5")
            .with_filter(&Filter::eq("status", "published"))
            .unwrap();

        assert_eq!(
            intent.query,
            vec![
                ("limit".to_string(), "5".to_string()),
                ("filter".to_string(), "status:published".to_string()),
            ]
        );
    }

    /// Validates `RequestIntent::with_filter` behavior for the invalid
    /// filter scenario.
    ///
    /// Assertions:
    /// - Ensures an unencodable tree surfaces `InvalidFilter` instead of a
    ///   partial intent.
    #[test]
    fn rejects_invalid_filter() {
        let result = RequestIntent::get("posts/").with_filter(&Filter::and(vec![]));
        assert!(matches!(result, Err(ApiError::InvalidFilter(_))));
    }
}
