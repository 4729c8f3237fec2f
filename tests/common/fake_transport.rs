//! Scripted fake transport for exercising the client without a network.
//!
//! GET responses are scripted per url: each request pops the next script for
//! that url, and the last script is replayed for every further request (so a
//! single `500` entry simulates a server that stays down). POSTs model the
//! login exchange with one script replayed on every call.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use jiraquery::{CacheOptions, Transport, TransportError, TransportResponse};

/// One scripted reaction to a request.
#[derive(Clone)]
pub enum Script {
    Respond(TransportResponse),
    Fail(TransportError),
}

/// Transport that replays scripted outcomes and records every request.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<Script>>>,
    login: Mutex<Option<Script>>,
    get_log: Mutex<Vec<(String, Vec<(String, String)>)>>,
    post_log: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a script for GETs of `url`.
    pub fn on_get(&self, url: &str, script: Script) {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(script);
    }

    /// Script the login exchange; replayed on every POST.
    pub fn on_login(&self, script: Script) {
        *self.login.lock().unwrap() = Some(script);
    }

    /// Number of GETs issued so far.
    pub fn get_count(&self) -> usize {
        self.get_log.lock().unwrap().len()
    }

    /// The urls GETs were issued against, in order.
    pub fn get_urls(&self) -> Vec<String> {
        self.get_log
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// The headers of the most recent GET.
    pub fn last_get_headers(&self) -> Vec<(String, String)> {
        self.get_log
            .lock()
            .unwrap()
            .last()
            .map(|(_, headers)| headers.clone())
            .unwrap_or_default()
    }

    /// Number of POSTs (logins) issued so far.
    pub fn post_count(&self) -> usize {
        self.post_log.lock().unwrap().len()
    }
}

/// A 200 response with the given body.
pub fn ok(body: &str) -> TransportResponse {
    status(200, body)
}

/// A response with an arbitrary status.
pub fn status(status: u16, body: &str) -> TransportResponse {
    TransportResponse {
        status,
        headers: vec![],
        body: body.to_string(),
    }
}

/// A successful login response: `Set-Cookie` headers plus the session body
/// naming the cookie to extract.
pub fn login_ok(set_cookies: &[&str], body: &str) -> TransportResponse {
    TransportResponse {
        status: 200,
        headers: set_cookies
            .iter()
            .map(|cookie| ("set-cookie".to_string(), cookie.to_string()))
            .collect(),
        body: body.to_string(),
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        _cache: CacheOptions,
    ) -> Result<TransportResponse, TransportError> {
        self.get_log
            .lock()
            .unwrap()
            .push((url.to_string(), headers.to_vec()));

        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .get_mut(url)
            .unwrap_or_else(|| panic!("unexpected GET {url}"));
        let script = if queue.len() > 1 {
            queue.pop_front().expect("queue checked non-empty")
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| panic!("no script left for GET {url}"))
        };

        match script {
            Script::Respond(response) => Ok(response),
            Script::Fail(error) => Err(error),
        }
    }

    async fn post_json(
        &self,
        url: &str,
        _body: &serde_json::Value,
        _cache: CacheOptions,
    ) -> Result<TransportResponse, TransportError> {
        self.post_log.lock().unwrap().push(url.to_string());

        match self.login.lock().unwrap().clone() {
            Some(Script::Respond(response)) => Ok(response),
            Some(Script::Fail(error)) => Err(error),
            None => panic!("unexpected POST {url}"),
        }
    }
}
