//! Transport adapters: one outbound call per invocation, classified failures.
//!
//! Each adapter turns a domain request into an [`HttpRequest`], executes it
//! once through an [`HttpClient`] and maps the outcome onto either a typed
//! payload or a [`FailureReason`]. There is no retry and no caching here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::http::{HttpClient, HttpRequest, HttpResponse};

pub mod analytics;
pub mod valuation;

pub use crate::domain::lifecycle::FailureReason;
pub use analytics::AnalyticsService;
pub use valuation::ValuationService;

/// A single-attempt asynchronous call to a remote service.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// What the caller hands over for one call.
    type Request: Send + Sync + 'static;
    /// What a successful, well-formed response decodes into.
    type Payload: Clone + Send + std::fmt::Debug + 'static;

    /// Name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Perform exactly one outbound call.
    async fn send(&self, request: &Self::Request) -> std::result::Result<Self::Payload, FailureReason>;
}

/// Health probe result (`GET /health`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
}

impl ServiceHealth {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Classify an HTTP outcome and parse its body as JSON.
///
/// Transport errors become `NetworkFailure`, non-2xx statuses `HttpFailure`,
/// and unparseable bodies `DecodeFailure`. Shape checks are left to the caller.
pub(crate) fn decode_json(
    outcome: Result<HttpResponse>,
) -> std::result::Result<Value, FailureReason> {
    let response = outcome.map_err(|e| FailureReason::NetworkFailure {
        error: e.to_string(),
    })?;

    if !response.is_success() {
        return Err(FailureReason::HttpFailure {
            status: response.status,
            body: response.body,
        });
    }

    serde_json::from_str(&response.body).map_err(|e| FailureReason::DecodeFailure {
        error: e.to_string(),
    })
}

/// Require the decoded body to be a JSON object.
pub(crate) fn expect_object(
    body: &Value,
) -> std::result::Result<&serde_json::Map<String, Value>, FailureReason> {
    body.as_object().ok_or_else(|| FailureReason::ShapeMismatch {
        detail: "expected a JSON object".to_string(),
    })
}

/// Issue `GET {base_url}{path}` and decode a `{"status": ...}` body.
pub(crate) async fn probe_health<H: HttpClient>(
    http: &H,
    base_url: &str,
    path: &str,
    timeout_ms: Option<u64>,
) -> std::result::Result<ServiceHealth, FailureReason> {
    let request = HttpRequest::get(base_url, path);
    let body = decode_json(http.execute(&request, timeout_ms).await)?;
    let status = expect_object(&body)?
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| FailureReason::ShapeMismatch {
            detail: "missing `status` string".to_string(),
        })?;

    Ok(ServiceHealth {
        status: status.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HomevalError;
    use crate::http::MockHttpClient;

    fn ok(status: u16, body: &str) -> Result<HttpResponse> {
        Ok(HttpResponse {
            status,
            body: body.to_string(),
        })
    }

    #[test]
    fn test_decode_json_classification() {
        let network = decode_json(Err(HomevalError::Other(anyhow::anyhow!("refused"))));
        assert!(matches!(network, Err(FailureReason::NetworkFailure { .. })));

        let http = decode_json(ok(503, "unavailable"));
        assert_eq!(
            http,
            Err(FailureReason::HttpFailure {
                status: 503,
                body: "unavailable".to_string()
            })
        );

        let decode = decode_json(ok(200, "<html>"));
        assert!(matches!(decode, Err(FailureReason::DecodeFailure { .. })));

        let empty = decode_json(ok(200, ""));
        assert!(matches!(empty, Err(FailureReason::DecodeFailure { .. })));

        assert_eq!(decode_json(ok(201, "[1]")), Ok(serde_json::json!([1])));
    }

    #[tokio::test]
    async fn test_probe_health() {
        let mock = MockHttpClient::new();
        mock.add_json_response("GET /health", 200, r#"{"status":"ok"}"#);
        mock.add_json_response("GET /health", 200, r#"{"state":"ok"}"#);

        let health = probe_health(&mock, "http://localhost:8000", "/health", None)
            .await
            .unwrap();
        assert!(health.is_ok());

        let missing = probe_health(&mock, "http://localhost:8000", "/health", None).await;
        assert!(matches!(missing, Err(FailureReason::ShapeMismatch { .. })));
    }
}
