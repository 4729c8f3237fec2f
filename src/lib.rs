//! JiraQuery - a resilient client for the JIRA REST API.
//!
//! This crate wraps the paginated JIRA REST API in a client that survives
//! transient server failures, handles basic and cookie-based authentication,
//! and transparently stitches multi-page result sets into one logical page.
//!
//! # Example
//!
//! ```no_run
//! use jiraquery::{Config, JiraClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = JiraClient::new(Config::default())?;
//! let page = client
//!     .execute_query("https://jira.example.com/rest/api/2/search?jql=project=DEMO", true)
//!     .await?;
//! println!("fetched {} issues", page.issues.len());
//! # Ok(())
//! # }
//! ```
//!
//! Credentials are read from the `JIRA_USER` and `JIRA_PASSWORD` environment
//! variables at request time; use [`credentials_missing`] to check them up
//! front.

pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod pagination;
pub mod transport;

pub use client::JiraClient;
pub use config::{AuthMode, Config};
pub use credentials::credentials_missing;
pub use error::{AuthError, FailureKind, QueryError};
pub use pagination::SearchPage;
pub use transport::{CacheOptions, HttpTransport, Transport, TransportError, TransportResponse};
