//! Rate-limited request dispatch with outcome classification.
//!
//! Every failure is logged here and handed back as an [`Outcome`] value.
//! Nothing past this boundary has to handle a request fault as an error.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::rate_limit::RateLimiter;
use crate::transport::{Method, Transport, TransportErrorKind};

/// Body field carrying the candidate identifier on every request.
pub const CANDIDATE_FIELD: &str = "candidateId";

/// Result of one dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 2xx response; `Value::Null` when the body was empty.
    Success(Value),
    /// The API answered with a non-2xx status.
    ApiError { status: u16, message: String },
    /// No usable response reached the client.
    TransportError {
        kind: TransportErrorKind,
        message: String,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The success payload, discarding failures.
    pub fn into_payload(self) -> Option<Value> {
        match self {
            Outcome::Success(payload) => Some(payload),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(_) => f.write_str("success"),
            Outcome::ApiError { status, message } => write!(f, "HTTP {status}: {message}"),
            Outcome::TransportError { kind, message } => write!(f, "{kind} error: {message}"),
        }
    }
}

/// Sends API requests through a shared rate limiter and classifies results.
#[derive(Clone)]
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    candidate_id: String,
    base_url: String,
}

impl RequestDispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        limiter: Arc<RateLimiter>,
        candidate_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            transport,
            limiter,
            candidate_id: candidate_id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn candidate_id(&self) -> &str {
        &self.candidate_id
    }

    /// Full URL for an endpoint relative to the base URL.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Throttle, send, and classify one request.
    ///
    /// `candidateId` is always present in the body; a caller-supplied field
    /// of the same name is replaced.
    pub async fn dispatch(
        &self,
        method: Method,
        endpoint: &str,
        fields: Map<String, Value>,
    ) -> Outcome {
        self.limiter.throttle().await;

        let url = self.url_for(endpoint);
        let mut body = fields;
        body.insert(
            CANDIDATE_FIELD.to_string(),
            Value::String(self.candidate_id.clone()),
        );

        tracing::debug!("{method} {url}");

        let response = match self.transport.send(method, &url, &body).await {
            Ok(response) => response,
            Err(e) => {
                match e.kind {
                    TransportErrorKind::Connection => {
                        tracing::error!("Error connecting to {url}: {}", e.message)
                    }
                    TransportErrorKind::Timeout => {
                        tracing::error!("Timeout on {method} {url}: {}", e.message)
                    }
                    TransportErrorKind::Other => {
                        tracing::error!("Request {method} {url} failed: {}", e.message)
                    }
                }
                return Outcome::TransportError {
                    kind: e.kind,
                    message: e.message,
                };
            }
        };

        if !response.is_success() {
            let message = error_message(&response.body);
            tracing::error!("HTTP error {} on {method} {url}: {message}", response.status);
            return Outcome::ApiError {
                status: response.status,
                message,
            };
        }

        if response.body.trim().is_empty() {
            return Outcome::Success(Value::Null);
        }

        match serde_json::from_str(&response.body) {
            Ok(payload) => Outcome::Success(payload),
            Err(e) => {
                let message = format!("invalid JSON in response body: {e}");
                tracing::error!("Request {method} {url} failed: {message}");
                Outcome::TransportError {
                    kind: TransportErrorKind::Other,
                    message,
                }
            }
        }
    }
}

/// Pull a readable message out of an error body.
fn error_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["message", "error", "reason"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    if trimmed.is_empty() {
        "<empty body>".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use serde_json::json;

    use crate::testing::{dispatcher, ScriptedTransport, BASE_URL, CANDIDATE};
    use crate::transport::{TransportError, TransportResponse};

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_body_always_carries_candidate() {
        let transport = ScriptedTransport::new();
        let d = dispatcher(&transport, Duration::ZERO);

        let outcome = d
            .dispatch(Method::Post, "points", fields(json!({ "row": 1, "column": 2 })))
            .await;
        assert!(outcome.is_success());

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::Post);
        assert_eq!(calls[0].url, format!("{BASE_URL}/points"));
        assert_eq!(
            Value::Object(calls[0].body.clone()),
            json!({ "candidateId": CANDIDATE, "row": 1, "column": 2 })
        );
    }

    #[tokio::test]
    async fn test_candidate_cannot_be_overridden() {
        let transport = ScriptedTransport::new();
        let d = dispatcher(&transport, Duration::ZERO);

        d.dispatch(
            Method::Delete,
            "points",
            fields(json!({ "candidateId": "intruder", "row": 0 })),
        )
        .await;

        let calls = transport.calls();
        assert_eq!(calls[0].body["candidateId"], CANDIDATE);
    }

    #[tokio::test]
    async fn test_url_joining_ignores_extra_slashes() {
        let transport = ScriptedTransport::new();
        let d = RequestDispatcher::new(
            transport.clone(),
            Arc::new(RateLimiter::new(Duration::ZERO)),
            CANDIDATE,
            format!("{BASE_URL}/"),
        );
        assert_eq!(d.url_for("/map/x/goal"), format!("{BASE_URL}/map/x/goal"));

        d.dispatch(Method::Get, "colorMarkers", Map::new()).await;
        assert_eq!(transport.calls()[0].url, format!("{BASE_URL}/colorMarkers"));
    }

    #[tokio::test]
    async fn test_success_payload_is_parsed() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!({ "goal": [["SPACE"]] }));
        let d = dispatcher(&transport, Duration::ZERO);

        let outcome = d.dispatch(Method::Get, "map/x/goal", Map::new()).await;
        assert_eq!(outcome, Outcome::Success(json!({ "goal": [["SPACE"]] })));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let transport = ScriptedTransport::new();
        transport.push(Ok(TransportResponse::new(204, "")));
        let d = dispatcher(&transport, Duration::ZERO);

        let outcome = d.dispatch(Method::Delete, "points", Map::new()).await;
        assert_eq!(outcome, Outcome::Success(Value::Null));
    }

    #[tokio::test]
    async fn test_api_error_is_a_value() {
        let transport = ScriptedTransport::new();
        transport.push_json(429, json!({ "error": true, "message": "Too Many Requests" }));
        transport.push(Ok(TransportResponse::new(500, "boom")));
        let d = dispatcher(&transport, Duration::ZERO);

        let first = d.dispatch(Method::Post, "points", Map::new()).await;
        assert_eq!(
            first,
            Outcome::ApiError {
                status: 429,
                message: "Too Many Requests".into()
            }
        );

        let second = d.dispatch(Method::Post, "points", Map::new()).await;
        assert_eq!(
            second,
            Outcome::ApiError {
                status: 500,
                message: "boom".into()
            }
        );
        assert_eq!(second.into_payload(), None);
    }

    #[tokio::test]
    async fn test_transport_failures_are_classified() {
        let transport = ScriptedTransport::new();
        for kind in [
            TransportErrorKind::Connection,
            TransportErrorKind::Timeout,
            TransportErrorKind::Other,
        ] {
            transport.push(Err(TransportError::new(kind, "simulated")));
        }
        let d = dispatcher(&transport, Duration::ZERO);

        for expected in [
            TransportErrorKind::Connection,
            TransportErrorKind::Timeout,
            TransportErrorKind::Other,
        ] {
            let outcome = d.dispatch(Method::Post, "points", Map::new()).await;
            assert_eq!(
                outcome,
                Outcome::TransportError {
                    kind: expected,
                    message: "simulated".into()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_transport_error() {
        let transport = ScriptedTransport::new();
        transport.push(Ok(TransportResponse::new(200, "<html>")));
        let d = dispatcher(&transport, Duration::ZERO);

        let outcome = d.dispatch(Method::Get, "map/x/goal", Map::new()).await;
        assert!(matches!(
            outcome,
            Outcome::TransportError {
                kind: TransportErrorKind::Other,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_dispatch_is_spaced() {
        let interval = Duration::from_millis(600);
        let transport = ScriptedTransport::new();
        transport.push(Err(TransportError::new(TransportErrorKind::Timeout, "slow")));
        transport.push_json(404, json!({ "message": "missing" }));
        let d = dispatcher(&transport, interval);

        d.dispatch(Method::Post, "points", Map::new()).await;
        d.dispatch(Method::Delete, "colorMarkers", Map::new()).await;
        d.dispatch(Method::Post, "directionMarkers", Map::new()).await;
        d.dispatch(Method::Get, "map/x/goal", Map::new()).await;

        let calls = transport.calls();
        assert_eq!(calls.len(), 4);
        for pair in calls.windows(2) {
            assert!(pair[1].at - pair[0].at >= interval);
        }
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"bad row"}"#), "bad row");
        assert_eq!(error_message(r#"{"error":"nope"}"#), "nope");
        assert_eq!(error_message(r#"{"error":true}"#), r#"{"error":true}"#);
        assert_eq!(error_message("  "), "<empty body>");
    }
}
