//! Client configuration.
//!
//! The configuration is set once, before the client is built, and read by
//! every request. There is no per-request override.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How requests authenticate against JIRA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// `Authorization: Basic ...` built from the environment credentials.
    Basic,
    /// Session cookie obtained through the `auth/1/session` login exchange.
    Cookie,
}

/// Client-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Retry ceiling. The attempt counter is 1-based and checked by equality
    /// before each request is issued, so a ceiling of `n` performs at most
    /// `n - 1` real attempts. This is the documented contract; callers rely
    /// on the observable retry counts.
    pub max_retry: u32,
    /// Pause between two attempts, in milliseconds. Constant across attempts,
    /// no backoff.
    pub retry_timeout_ms: u64,
    /// The authentication mode to use.
    pub authentication: AuthMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_retry: 5,
            retry_timeout_ms: 1000,
            authentication: AuthMode::Basic,
        }
    }
}

impl Config {
    /// The inter-retry pause as a [`Duration`].
    pub fn retry_timeout(&self) -> Duration {
        Duration::from_millis(self.retry_timeout_ms)
    }
}
