//! Scripted transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::request::{Method, Request};
use crate::{FetchError, Response, Transport};

type Reply = Result<Response, FetchError>;

#[derive(Default)]
struct State {
    routes: HashMap<(Method, String), VecDeque<Reply>>,
    requests: Vec<Request>,
}

/// A transport that answers from per-route queues and records every request.
///
/// Routes match on method and URL path (query ignored). The last queued reply
/// of a route is repeated; an unscripted route answers `404`.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method path`.
    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        let mut state = self.state.lock().expect("mock state poisoned");
        state
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a JSON reply.
    pub fn on_json(&self, method: Method, path: &str, status: u16, body: serde_json::Value) -> &Self {
        let response = Response::from_json(status, &body).expect("serializable body");
        self.on(method, path, Ok(response))
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().expect("mock state poisoned").requests.clone()
    }

    /// Requests seen for `method path`.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path() == path)
            .collect()
    }

    /// Number of requests seen for `method path`.
    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let mut state = self.state.lock().expect("mock state poisoned");
        let key = (request.method, request.path());
        state.requests.push(request);

        match state.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(not_found),
            Some(queue) => queue.front().cloned().unwrap_or_else(not_found),
            None => not_found(),
        }
    }
}

fn not_found() -> Reply {
    Response::from_json(404, &serde_json::json!({"detail": "Not found."}))
}
