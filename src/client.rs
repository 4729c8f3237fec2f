//! The JIRA query client: retry loop, failure classification and pagination.
//!
//! [`JiraClient::execute_query`] is the public entry point. Each page is
//! fetched through a bounded retry loop that recovers transient server
//! failures and expired sessions; when asked to retrieve all pages, the
//! client walks the pagination envelope and merges every page into one
//! logical result.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::auth::{self, SessionCache};
use crate::config::{AuthMode, Config};
use crate::error::{FailureKind, QueryError};
use crate::pagination::{next_page_url, SearchPage};
use crate::transport::{CacheOptions, HttpTransport, Transport, TransportError, TransportResponse};

/// Freshness window for data requests, in seconds.
const DATA_CACHE_MAX_AGE_SECS: u32 = 30;

/// Attempt budget for follow-up page fetches. Intentionally independent of
/// the configured `max_retry`: every page after the first gets its own full
/// allowance. Flagged as a possible inconsistency, kept because callers rely
/// on the observable retry counts.
const SUBPAGE_MAX_RETRY: u32 = 5;

/// How a failed exchange should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Clear the session and retry after the configured pause.
    Relogin,
    /// Retry after the configured pause.
    Retry,
    /// Surface the failure to the caller as-is.
    Fail,
}

/// The resilient JIRA API client.
///
/// Owns the session cache, so independent clients never share authentication
/// state. Cheap to share behind an [`Arc`]; all methods take `&self`.
pub struct JiraClient {
    transport: Arc<dyn Transport>,
    config: Config,
    session: SessionCache,
}

impl JiraClient {
    /// Build a client over the production `reqwest` transport.
    pub fn new(config: Config) -> Result<Self, TransportError> {
        let transport = HttpTransport::new()?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build a client over a caller-supplied transport. Used by tests and by
    /// callers that tunnel requests through their own HTTP stack.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config,
            session: SessionCache::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drop the cached session cookie; the next cookie-mode request logs in
    /// again.
    pub fn invalidate_session(&self) {
        self.session.clear();
    }

    /// Execute a JIRA REST query.
    ///
    /// With `retrieve_all_pages` set, a response announcing further pages
    /// triggers follow-up requests whose results are merged into one
    /// envelope: issues concatenated in ascending `startAt` order, the final
    /// envelope reporting `startAt = 0` and `maxResults = total`. A failure
    /// on any page rejects the whole query and discards the pages already
    /// fetched.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn execute_query(
        &self,
        url: &str,
        retrieve_all_pages: bool,
    ) -> Result<SearchPage, QueryError> {
        let mut merged = self.fetch_page(url, self.config.max_retry).await?;
        if !retrieve_all_pages || !merged.has_more() {
            return Ok(merged);
        }

        let mut page_url = url.to_string();
        let mut next_start = merged.next_start();
        loop {
            page_url = next_page_url(&page_url, next_start);
            debug!(%page_url, "retrieving next page");
            let page = self.fetch_page(&page_url, SUBPAGE_MAX_RETRY).await?;
            let more = page.has_more();
            next_start = page.next_start();
            merged.absorb(page);
            if !more {
                break;
            }
        }
        merged.finish_merge();
        info!(issues = merged.issues.len(), "aggregated all pages");
        Ok(merged)
    }

    /// Fetch a single page through the bounded retry loop.
    ///
    /// `attempt` is 1-based and compared to `max_retry` by equality before a
    /// request is issued, so a budget of `n` performs at most `n - 1` real
    /// attempts. That off-by-one is the documented contract.
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_page(&self, url: &str, max_retry: u32) -> Result<SearchPage, QueryError> {
        let mut attempt: u32 = 1;
        loop {
            debug!("executing request, attempt {attempt}/{max_retry}");
            if attempt == max_retry {
                error!("too many retries, stopping here");
                return Err(QueryError::new(
                    FailureKind::TooManyRetries,
                    -1,
                    url,
                    "Too much retries",
                ));
            }

            let headers = match auth::resolve_headers(
                self.transport.as_ref(),
                self.config.authentication,
                &self.session,
                url,
            )
            .await
            {
                Ok(headers) => headers,
                // Terminal for this request: a failed login is not a
                // transient server condition.
                Err(e) => return Err(QueryError::new(e.kind(), -1, url, e.to_string())),
            };

            let cache = CacheOptions::Revalidate {
                max_age_secs: DATA_CACHE_MAX_AGE_SECS,
            };
            match self.transport.get(url, &headers, cache).await {
                Ok(response) if response.is_success() => {
                    debug!(status = response.status, "request ok");
                    return serde_json::from_str::<SearchPage>(&response.body).map_err(|e| {
                        error!(%url, error = %e, "error parsing response body");
                        QueryError::new(FailureKind::JsonParse, -1, url, e.to_string())
                    });
                }
                Ok(response) => match classify_status(self.config.authentication, &response) {
                    Disposition::Relogin => {
                        info!("request rejected with 401, session expired; logging in again");
                        self.session.clear();
                    }
                    Disposition::Retry => {
                        warn!(status = response.status, %url, "server-side failure, will retry");
                    }
                    Disposition::Fail => {
                        return Err(QueryError::new(
                            FailureKind::OtherHttp,
                            i64::from(response.status),
                            url,
                            failure_message(&response),
                        ));
                    }
                },
                Err(err) if err.is_transient() => {
                    warn!(%url, error = %err, "transport failure, will retry");
                }
                Err(err) => {
                    return Err(QueryError::new(
                        FailureKind::OtherHttp,
                        -1,
                        url,
                        err.to_string(),
                    ));
                }
            }

            tokio::time::sleep(self.config.retry_timeout()).await;
            attempt += 1;
        }
    }
}

/// Classify a non-2xx response.
///
/// A 401 under cookie authentication means the session expired; any 5xx is a
/// transient server condition. Everything else is terminal.
fn classify_status(mode: AuthMode, response: &TransportResponse) -> Disposition {
    if response.status == 401 && mode == AuthMode::Cookie {
        Disposition::Relogin
    } else if response.status / 100 == 5 {
        Disposition::Retry
    } else {
        Disposition::Fail
    }
}

/// The message carried on a terminal HTTP failure: the response body when
/// there is one, the bare status otherwise.
fn failure_message(response: &TransportResponse) -> String {
    if response.body.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        response.body.clone()
    }
}
