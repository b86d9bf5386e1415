//! Scripted transport for exercising the client without a server.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::sync::oneshot;

use super::error::ApiError;
use super::transport::{ApiRequest, ApiResponse, Transport};

struct Scripted {
    result: Result<ApiResponse, ApiError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Replies to each (method, path) with queued results, in order.
///
/// A reply can be gated: the transport holds it back until the paired
/// sender fires, which lets tests choose the order in which concurrent
/// requests complete. Unscripted requests fail with a connection error.
#[derive(Default)]
pub(crate) struct FakeTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, method: Method, path: &str, result: Result<ApiResponse, ApiError>) {
        self.enqueue(method, path, Scripted { result, gate: None });
    }

    pub(crate) fn reply(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.push(
            method,
            path,
            Ok(ApiResponse {
                status,
                body: Some(body),
            }),
        );
    }

    pub(crate) fn fail(&self, method: Method, path: &str) {
        self.push(method, path, Err(ApiError::Connection("connection refused".into())));
    }

    /// Queue a reply that is only delivered once the returned sender fires.
    pub(crate) fn gated_reply(
        &self,
        method: Method,
        path: &str,
        status: StatusCode,
        body: Value,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.enqueue(
            method,
            path,
            Scripted {
                result: Ok(ApiResponse {
                    status,
                    body: Some(body),
                }),
                gate: Some(rx),
            },
        );
        tx
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, method: &Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| &request.method == method && request.path == path)
            .count()
    }

    fn enqueue(&self, method: Method, path: &str, scripted: Scripted) {
        self.replies
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let key = (request.method.clone(), request.path.clone());
        self.requests.lock().unwrap().push(request);

        let scripted = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        let Some(scripted) = scripted else {
            return Err(ApiError::Connection(format!("no reply scripted for {} {}", key.0, key.1)));
        };

        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.result
    }
}
