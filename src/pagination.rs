//! The pagination envelope and next-page url computation.
//!
//! JIRA search endpoints return at most one page per request, described by
//! the `startAt` / `maxResults` / `total` envelope fields. The client merges
//! successive pages into one logical [`SearchPage`] when asked to.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The query-string marker of the start parameter.
const START_AT_PARAM: &str = "&startAt=";

/// One page of results, with unknown body fields preserved.
///
/// The envelope fields are optional because not every endpoint paginates;
/// a response without them is treated as a single complete page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Index of the first item of this page, 0-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u64>,
    /// Page size the server applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u64>,
    /// Total number of matching items across all pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// The items of this page, kept opaque.
    #[serde(default)]
    pub issues: Vec<Value>,
    /// Everything else the server put in the body.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl SearchPage {
    /// Whether more pages remain after this one.
    ///
    /// True iff the envelope is present and `startAt + maxResults <= total`.
    pub fn has_more(&self) -> bool {
        match (self.start_at, self.max_results, self.total) {
            (Some(start_at), Some(max_results), Some(total)) => start_at + max_results <= total,
            _ => false,
        }
    }

    /// The `startAt` of the page following this one.
    pub fn next_start(&self) -> u64 {
        self.start_at.unwrap_or(0) + self.max_results.unwrap_or(0)
    }

    /// Append a later page's items to this one.
    pub fn absorb(&mut self, next: SearchPage) {
        self.issues.extend(next.issues);
    }

    /// Mark this envelope as one merged logical page covering everything:
    /// `startAt = 0`, `maxResults = total`.
    pub fn finish_merge(&mut self) {
        self.max_results = self.total;
        self.start_at = Some(0);
    }
}

/// Rewrite a previously executed url so it addresses the page starting at
/// `start_at`.
///
/// Appends `&startAt=...` when the parameter is absent, replaces its value
/// otherwise. Pure string transform with no failure mode: the executor only
/// feeds it urls it produced itself, so a malformed input simply yields a
/// malformed output.
pub fn next_page_url(old_url: &str, start_at: u64) -> String {
    match old_url.find(START_AT_PARAM) {
        None => format!("{old_url}{START_AT_PARAM}{start_at}"),
        Some(index) => {
            let value_start = index + START_AT_PARAM.len();
            let suffix = old_url[value_start..].trim_start_matches(|c: char| c.is_ascii_digit());
            format!("{}{}{}", &old_url[..value_start], start_at, suffix)
        }
    }
}
