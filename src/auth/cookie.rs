//! Cookie-based session authentication.
//!
//! JIRA's session resource hands out a named cookie on login; subsequent
//! requests carry it in a `Cookie` header until the server rejects it with a
//! 401, at which point the client logs in again.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{AuthError, AuthResult};
use crate::transport::{CacheOptions, Transport};

/// Path of the session login resource, relative to the REST base url.
const SESSION_RESOURCE: &str = "auth/1/session";

/// Cache directive attached to every authenticated request.
pub(crate) const CACHE_CONTROL_VALUE: &str = "public, max-age=60";

/// Body of a successful login response; only the cookie name matters here.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    session: SessionInfo,
}

#[derive(Debug, Deserialize)]
struct SessionInfo {
    name: String,
}

/// Derive the REST base url from a request url: everything up to and
/// including the first `rest/` segment.
pub fn derive_base_url(url: &str) -> AuthResult<String> {
    if url.is_empty() {
        return Err(AuthError::EmptyUrl);
    }
    match url.find("rest/") {
        Some(index) => Ok(url[..index + "rest/".len()].to_string()),
        None => Err(AuthError::InvalidUrl(url.to_string())),
    }
}

/// Find the session cookie in a `Set-Cookie` list.
///
/// Servers send an expiring empty-value cookie (`name=""`) alongside the real
/// one when rotating sessions; extraction skips those regardless of order.
/// The returned token is the `name=value` part, truncated at the first `;`.
pub fn extract_session_cookie(cookies: &[String], cookie_name: &str) -> AuthResult<String> {
    if cookie_name.is_empty() {
        return Err(AuthError::MissingCookieName);
    }
    if cookies.is_empty() {
        return Err(AuthError::MissingCookies);
    }

    cookies
        .iter()
        .filter_map(|cookie| cookie.split(';').next())
        .find(|entry| match entry.split_once('=') {
            Some((name, value)) => name == cookie_name && value != "\"\"",
            None => false,
        })
        .map(str::to_string)
        .ok_or_else(|| AuthError::CookieNotFound(cookie_name.to_string()))
}

/// Log in to JIRA and return the session token (`name=value`).
///
/// The base url is derived from `url`, the login POST goes to
/// `{base_url}auth/1/session` with caching disabled, and the cookie name to
/// extract comes from the response body (`session.name`). Every failure maps
/// to [`AuthError::LoginFailed`] carrying the underlying reason.
#[instrument(skip(transport, password))]
pub async fn login(
    transport: &dyn Transport,
    username: &str,
    password: &str,
    url: &str,
) -> AuthResult<String> {
    let base_url = derive_base_url(url).map_err(|e| AuthError::LoginFailed(e.to_string()))?;
    let login_url = format!("{base_url}{SESSION_RESOURCE}");
    debug!(%login_url, "logging in to acquire a session cookie");

    let body = serde_json::json!({ "username": username, "password": password });
    let response = transport
        .post_json(&login_url, &body, CacheOptions::Disabled)
        .await
        .map_err(|e| AuthError::LoginFailed(e.to_string()))?;

    if !response.is_success() {
        return Err(AuthError::LoginFailed(format!(
            "login returned HTTP {}",
            response.status
        )));
    }

    let parsed: LoginResponse = serde_json::from_str(&response.body)
        .map_err(|e| AuthError::LoginFailed(e.to_string()))?;
    let cookies: Vec<String> = response
        .header_values("set-cookie")
        .into_iter()
        .map(str::to_string)
        .collect();

    let token = extract_session_cookie(&cookies, &parsed.session.name)
        .map_err(|e| AuthError::LoginFailed(e.to_string()))?;
    debug!(cookie_name = %parsed.session.name, "session cookie acquired");
    Ok(token)
}

/// The header set for a request authenticated by a session token.
pub fn session_headers(session_cookie: &str) -> Vec<(String, String)> {
    vec![
        ("Cookie".to_string(), session_cookie.to_string()),
        ("Cache-Control".to_string(), CACHE_CONTROL_VALUE.to_string()),
    ]
}
