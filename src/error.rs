//! Error types for query execution and authentication.
//!
//! Failed queries reject with a structured [`QueryError`] record rather than
//! an opaque message, so calling code can branch on the numeric `code` and
//! match exhaustively on the [`FailureKind`] discriminant.

use thiserror::Error;

/// Discriminates the failure classes of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request url is empty or has no `rest/` segment to derive the base
    /// url from.
    InvalidUrl,
    /// The session cookie could not be extracted from a cookie list.
    CookieExtraction,
    /// The login exchange failed (network, bad body, or missing cookie).
    LoginFailed,
    /// A response body was not valid JSON.
    JsonParse,
    /// Retryable server-side or connection-level failure (5xx, connection
    /// reset, timeout). Recovered internally by the retry loop; once the
    /// budget is spent the query surfaces [`FailureKind::TooManyRetries`]
    /// instead.
    TransportTransient,
    /// A 401 received under cookie authentication. Recovered internally by
    /// clearing the session and logging in again.
    AuthExpired,
    /// The retry budget was exhausted without a successful response.
    TooManyRetries,
    /// Any other non-2xx response, or a non-classifiable transport failure.
    OtherHttp,
}

/// The structured record every failed query rejects with.
#[derive(Debug, Clone, Error)]
#[error("{message} (url: {url}, code: {code})")]
pub struct QueryError {
    /// What class of failure this is.
    pub kind: FailureKind,
    /// HTTP status of the failing response, or -1 when no status applies
    /// (header resolution, parse failures, exhausted retries).
    pub code: i64,
    /// The url whose request failed.
    pub url: String,
    /// Human-readable detail, typically the server's response body.
    pub message: String,
}

impl QueryError {
    pub(crate) fn new(kind: FailureKind, code: i64, url: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            url: url.to_string(),
            message: message.into(),
        }
    }
}

/// Failures inside the authentication subsystem.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No url was given, so there is nothing to derive a base url from.
    #[error("url not specified - can't derive base url")]
    EmptyUrl,

    /// The url carries no `rest/` segment.
    #[error("invalid url (can't find 'rest/' segment): {0}")]
    InvalidUrl(String),

    /// No cookie name was given to search for.
    #[error("cookie name not specified - can't extract session cookie")]
    MissingCookieName,

    /// The cookie list was absent or empty.
    #[error("no cookies given - can't extract session cookie")]
    MissingCookies,

    /// No cookie with the requested name carries a usable value.
    #[error("cookie '{0}' not found in cookies - can't extract session cookie")]
    CookieNotFound(String),

    /// The login exchange failed; the reason is carried verbatim.
    #[error("can't get session cookie [{0}]")]
    LoginFailed(String),
}

impl AuthError {
    /// The failure class this maps to on the public error record.
    pub fn kind(&self) -> FailureKind {
        match self {
            AuthError::EmptyUrl | AuthError::InvalidUrl(_) => FailureKind::InvalidUrl,
            AuthError::MissingCookieName
            | AuthError::MissingCookies
            | AuthError::CookieNotFound(_) => FailureKind::CookieExtraction,
            AuthError::LoginFailed(_) => FailureKind::LoginFailed,
        }
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;
