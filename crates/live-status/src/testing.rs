//! In-memory transport for tests.
//!
//! Routes are matched by URL prefix in insertion order. Unmatched URLs fail
//! like an unreachable host.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::FetchError;
use crate::transport::{FetchResponse, HttpTransport};

/// Canned behaviour for one request.
#[derive(Debug, Clone)]
pub enum Reply {
    Response(FetchResponse),
    /// Connection-level failure.
    Fail,
    /// Never resolves; only a deadline gets the caller out.
    Hang,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Reply::Response(FetchResponse::new(200, body))
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Reply::Response(FetchResponse::new(status, body))
    }
}

struct Route {
    prefix: String,
    // Replies are consumed front to back; the last one repeats forever.
    replies: Mutex<VecDeque<Reply>>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Vec<Route>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, prefix: impl Into<String>, reply: Reply) -> Self {
        self.route_seq(prefix, vec![reply])
    }

    pub fn route_seq(mut self, prefix: impl Into<String>, replies: Vec<Reply>) -> Self {
        self.routes.push(Route {
            prefix: prefix.into(),
            replies: Mutex::new(replies.into()),
        });
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn next_reply(&self, url: &str) -> Reply {
        let Some(route) = self.routes.iter().find(|r| url.starts_with(&r.prefix)) else {
            return Reply::Fail;
        };
        let mut replies = route.replies.lock();
        if replies.len() > 1 {
            replies.pop_front().unwrap_or(Reply::Fail)
        } else {
            replies.front().cloned().unwrap_or(Reply::Fail)
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests.lock().push(url.to_string());
        match self.next_reply(url) {
            Reply::Response(response) => Ok(response),
            Reply::Fail => Err(FetchError::transport(url, "connection refused")),
            Reply::Hang => {
                std::future::pending::<()>().await;
                Err(FetchError::transport(url, "unreachable"))
            }
        }
    }
}
