//! Request authentication.
//!
//! Two mutually exclusive modes: basic auth built locally from the
//! environment credentials, and cookie auth backed by a login exchange whose
//! session token is cached on the client.

pub mod cookie;

use std::sync::{Mutex, MutexGuard};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::debug;

use crate::config::AuthMode;
use crate::credentials;
use crate::error::AuthResult;
use crate::transport::Transport;

/// The session token shared by every request of one client.
///
/// Holds at most one token at a time. No refresh coordination: concurrent
/// callers observing an absent token may each log in, and the loser simply
/// overwrites the cache with an equally valid token. Login is idempotent, so
/// that race is tolerated. The lock is never held across an await.
#[derive(Debug, Default)]
pub struct SessionCache {
    cookie: Mutex<Option<String>>,
}

impl SessionCache {
    /// An empty cache (no session).
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token, if any.
    pub fn get(&self) -> Option<String> {
        self.lock().clone()
    }

    /// Cache a freshly acquired token.
    pub fn store(&self, cookie: String) {
        *self.lock() = Some(cookie);
    }

    /// Drop the cached token; the next request logs in again.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        // A poisoned lock only means a panic elsewhere; the Option inside is
        // still coherent.
        self.cookie.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Build the header set for one request.
///
/// Basic mode never fails locally: absent credentials surface later as a 401
/// from the server. Cookie mode returns the cached session's headers
/// immediately when one exists, and otherwise performs a login first; a login
/// failure is terminal for the current request attempt.
pub(crate) async fn resolve_headers(
    transport: &dyn Transport,
    mode: AuthMode,
    session: &SessionCache,
    url: &str,
) -> AuthResult<Vec<(String, String)>> {
    match mode {
        AuthMode::Basic => Ok(basic_headers()),
        AuthMode::Cookie => {
            if let Some(token) = session.get() {
                return Ok(cookie::session_headers(&token));
            }
            let (user, password) = credentials::lookup();
            let token = cookie::login(transport, &user, &password, url).await?;
            debug!("caching new session cookie");
            session.store(token.clone());
            Ok(cookie::session_headers(&token))
        }
    }
}

/// The basic-auth header set, built from the environment credentials read at
/// call time.
fn basic_headers() -> Vec<(String, String)> {
    let (user, password) = credentials::lookup();
    let token = format!("Basic {}", BASE64.encode(format!("{user}:{password}")));
    vec![
        ("Authorization".to_string(), token),
        (
            "Cache-Control".to_string(),
            cookie::CACHE_CONTROL_VALUE.to_string(),
        ),
    ]
}
