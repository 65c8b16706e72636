//! Request attribute extraction.
//!
//! # Responsibilities
//! - Collect the fields attached to the request logger (method, URL, user agent)
//! - Read query parameters for route validation

use axum::http::{header::USER_AGENT, HeaderMap, Method, Uri};

use crate::observability::{Logger, RequestLogger};

/// Attributes every request log record carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFields {
    pub method: String,
    /// Request target as received (path and query).
    pub url: String,
    /// `User-Agent` header, empty when absent or not valid text.
    pub user_agent: String,
}

impl RequestFields {
    pub fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let user_agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        Self {
            method: method.to_string(),
            url: uri.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Derive a request logger from `base` carrying these fields.
    pub fn logger(&self, base: &Logger) -> RequestLogger {
        base.request(&self.method, &self.url, &self.user_agent)
    }
}

/// First value of query parameter `key`, URL-decoded.
pub fn query_value(uri: &Uri, key: &str) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
