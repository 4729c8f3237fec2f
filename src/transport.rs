//! HTTP transport seam.
//!
//! The client talks to JIRA through the [`Transport`] trait so tests can
//! substitute a fake implementation. [`HttpTransport`] is the production
//! implementation backed by `reqwest`.
//!
//! Any HTTP response, whatever its status, is an `Ok`; [`TransportError`]
//! covers failures where no status was received at all (connection-level
//! problems and timeouts).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use thiserror::Error;
use tracing::debug;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Cache behavior requested for a single exchange.
///
/// `reqwest` holds no response cache of its own, so [`HttpTransport`] renders
/// these as `Cache-Control` request directives for intermediary caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOptions {
    /// No caching at all. Used for the login exchange.
    Disabled,
    /// Short freshness window with forced revalidation. Used for data
    /// requests, which favor freshness over reuse.
    Revalidate {
        /// Freshness window in seconds.
        max_age_secs: u32,
    },
}

impl CacheOptions {
    /// The `Cache-Control` directive expressing this policy.
    pub fn directive(&self) -> String {
        match self {
            CacheOptions::Disabled => "no-store".to_string(),
            CacheOptions::Revalidate { max_age_secs } => {
                format!("max-age={max_age_secs}, must-revalidate")
            }
        }
    }
}

/// One HTTP response, any status.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers in arrival order; names may repeat (`Set-Cookie`).
    pub headers: Vec<(String, String)>,
    /// The response body, decoded as text.
    pub body: String,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// All values carried by a (possibly repeated) header, case-insensitive.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// A failure before any HTTP status was received.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request or connection timed out.
    #[error("timeout exceeded")]
    Timeout,

    /// The peer reset the connection.
    #[error("connection reset")]
    ConnectionReset,

    /// No connection could be established.
    #[error("not connected")]
    NotConnected,

    /// Anything else: TLS setup, invalid request construction, decode
    /// failures. Not retried.
    #[error("transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether the retry loop should try again after this failure.
    pub fn is_transient(&self) -> bool {
        !matches!(self, TransportError::Other(_))
    }
}

/// The outbound HTTP capability the client depends on.
///
/// Kept as a trait so tests can script responses without a network (see the
/// fake transport under `tests/common/`).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET with the given headers and cache policy.
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        cache: CacheOptions,
    ) -> Result<TransportResponse, TransportError>;

    /// Issue a POST with a JSON body and the given cache policy.
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        cache: CacheOptions,
    ) -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the transport with a request timeout.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        cache: CacheOptions,
    ) -> Result<TransportResponse, TransportError> {
        let mut header_map = to_header_map(headers)?;
        if !header_map.contains_key(CACHE_CONTROL) {
            header_map.insert(
                CACHE_CONTROL,
                HeaderValue::from_str(&cache.directive())
                    .map_err(|e| TransportError::Other(e.to_string()))?,
            );
        }
        header_map.insert(ACCEPT, HeaderValue::from_static("application/json"));

        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .headers(header_map)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        collect_response(response).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        cache: CacheOptions,
    ) -> Result<TransportResponse, TransportError> {
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .header(CACHE_CONTROL, cache.directive())
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        collect_response(response).await
    }
}

/// Drain a `reqwest` response into the transport's status/headers/body shape.
async fn collect_response(response: reqwest::Response) -> Result<TransportResponse, TransportError> {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = response.text().await.map_err(classify_reqwest_error)?;

    Ok(TransportResponse {
        status,
        headers,
        body,
    })
}

fn to_header_map(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::Other(e.to_string()))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| TransportError::Other(e.to_string()))?;
        map.append(name, value);
    }
    Ok(map)
}

/// Map a `reqwest` error onto the transport taxonomy.
///
/// Timeouts and connect failures are first-class; connection resets hide in
/// the io error source chain.
fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout;
    }
    if err.is_connect() {
        return TransportError::NotConnected;
    }

    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::ConnectionReset => return TransportError::ConnectionReset,
                std::io::ErrorKind::NotConnected => return TransportError::NotConnected,
                std::io::ErrorKind::TimedOut => return TransportError::Timeout,
                _ => {}
            }
        }
        source = cause.source();
    }

    TransportError::Other(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_directive_disabled() {
        assert_eq!(CacheOptions::Disabled.directive(), "no-store");
    }

    #[test]
    fn test_cache_directive_revalidate() {
        assert_eq!(
            CacheOptions::Revalidate { max_age_secs: 30 }.directive(),
            "max-age=30, must-revalidate"
        );
    }

    #[test]
    fn test_is_success() {
        let mut response = TransportResponse {
            status: 200,
            headers: vec![],
            body: String::new(),
        };
        assert!(response.is_success());
        response.status = 204;
        assert!(response.is_success());
        response.status = 301;
        assert!(!response.is_success());
        response.status = 500;
        assert!(!response.is_success());
    }

    #[test]
    fn test_header_values_repeated_and_case_insensitive() {
        let response = TransportResponse {
            status: 200,
            headers: vec![
                ("Set-Cookie".to_string(), "a=1".to_string()),
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
            ],
            body: String::new(),
        };
        assert_eq!(response.header_values("set-cookie"), vec!["a=1", "b=2"]);
        assert_eq!(response.header_values("SET-COOKIE").len(), 2);
        assert!(response.header_values("authorization").is_empty());
    }

    #[test]
    fn test_transport_error_transience() {
        assert!(TransportError::Timeout.is_transient());
        assert!(TransportError::ConnectionReset.is_transient());
        assert!(TransportError::NotConnected.is_transient());
        assert!(!TransportError::Other("tls".to_string()).is_transient());
    }

    #[test]
    fn test_to_header_map_appends_duplicates() {
        let headers = vec![
            ("Cookie".to_string(), "a=1".to_string()),
            ("Cookie".to_string(), "b=2".to_string()),
        ];
        let map = to_header_map(&headers).unwrap();
        assert_eq!(map.get_all("cookie").iter().count(), 2);
    }

    #[test]
    fn test_to_header_map_rejects_invalid_name() {
        let headers = vec![("bad header\n".to_string(), "x".to_string())];
        assert!(to_header_map(&headers).is_err());
    }
}
