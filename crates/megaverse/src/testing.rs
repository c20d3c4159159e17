//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::time::Instant;

use crate::dispatch::RequestDispatcher;
use crate::rate_limit::RateLimiter;
use crate::transport::{Method, Transport, TransportError, TransportResponse};

pub(crate) const CANDIDATE: &str = "candidate-123";
pub(crate) const BASE_URL: &str = "https://api.test/api";

/// One request seen by the transport.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub body: Map<String, Value>,
    pub at: Instant,
}

impl RecordedCall {
    /// Path relative to [`BASE_URL`].
    pub fn endpoint(&self) -> &str {
        self.url
            .strip_prefix(BASE_URL)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(&self.url)
    }
}

/// Replays queued replies in order, answering `200 {}` once the queue is empty.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, reply: Result<TransportResponse, TransportError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(Ok(TransportResponse::new(status, body.to_string())));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: &Map<String, Value>,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            body: body.clone(),
            at: Instant::now(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TransportResponse::new(200, "{}")))
    }
}

/// Dispatcher wired to a scripted transport.
pub(crate) fn dispatcher(
    transport: &Arc<ScriptedTransport>,
    interval: Duration,
) -> RequestDispatcher {
    RequestDispatcher::new(
        transport.clone(),
        Arc::new(RateLimiter::new(interval)),
        CANDIDATE,
        BASE_URL,
    )
}
