//! Valuation service adapter (`POST /predict`).

use async_trait::async_trait;
use serde_json::Value;

use super::{FailureReason, ServiceHealth, Transport, decode_json, expect_object, probe_health};
use crate::config::ClientConfig;
use crate::domain::property::EstimateRequest;
use crate::http::{HttpClient, HttpRequest};

/// Sends property attributes to the valuation service and extracts the
/// first element of the returned `predictions` array.
#[derive(Clone)]
pub struct ValuationService<H: HttpClient> {
    http: H,
    base_url: String,
    predict_path: String,
    health_path: String,
    model_info_path: String,
    timeout_ms: Option<u64>,
}

impl<H: HttpClient> ValuationService<H> {
    pub fn new(http: H, config: &ClientConfig) -> Self {
        Self {
            http,
            base_url: config.valuation_base_url.clone(),
            predict_path: config.predict_path.clone(),
            health_path: config.health_path.clone(),
            model_info_path: config.model_info_path.clone(),
            timeout_ms: config.transport_timeout_ms,
        }
    }

    /// Probe `GET /health`. Does not touch any lifecycle state.
    pub async fn health(&self) -> Result<ServiceHealth, FailureReason> {
        probe_health(&self.http, &self.base_url, &self.health_path, self.timeout_ms).await
    }

    /// Fetch the model's metadata (`GET /model-info`) as an opaque JSON object.
    pub async fn model_info(&self) -> Result<serde_json::Map<String, Value>, FailureReason> {
        let request = HttpRequest::get(&self.base_url, &self.model_info_path);
        let body = decode_json(self.http.execute(&request, self.timeout_ms).await)?;
        expect_object(&body).cloned()
    }
}

/// Pull the predicted price out of a decoded `/predict` body.
pub fn first_prediction(body: &Value) -> Result<f64, FailureReason> {
    let mismatch = |detail: &str| FailureReason::ShapeMismatch {
        detail: detail.to_string(),
    };

    let predictions = expect_object(body)?
        .get("predictions")
        .ok_or_else(|| mismatch("missing `predictions` array"))?
        .as_array()
        .ok_or_else(|| mismatch("`predictions` is not an array"))?;

    let first = predictions
        .first()
        .ok_or_else(|| mismatch("`predictions` array is empty"))?;

    first
        .as_f64()
        .filter(|value| value.is_finite())
        .ok_or_else(|| mismatch("first prediction is not a number"))
}

#[async_trait]
impl<H: HttpClient> Transport for ValuationService<H> {
    type Request = EstimateRequest;
    type Payload = f64;

    fn name(&self) -> &'static str {
        "estimator"
    }

    async fn send(&self, request: &EstimateRequest) -> Result<f64, FailureReason> {
        let body = serde_json::to_string(request).map_err(|e| FailureReason::DecodeFailure {
            error: format!("could not encode request: {}", e),
        })?;
        let http_request = HttpRequest::post_json(&self.base_url, &self.predict_path, body);

        tracing::debug!(request_id = %http_request.id, "Sending estimate request");

        let outcome = self.http.execute(&http_request, self.timeout_ms).await;
        let result = decode_json(outcome).and_then(|body| first_prediction(&body));

        match &result {
            Ok(price) => {
                tracing::info!(request_id = %http_request.id, price, "Estimate received")
            }
            Err(reason) => tracing::warn!(
                request_id = %http_request.id,
                kind = reason.kind(),
                error = %reason,
                "Estimate request failed"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;
    use serde_json::json;

    fn service(mock: &MockHttpClient) -> ValuationService<MockHttpClient> {
        ValuationService::new(mock.clone(), &ClientConfig::default())
    }

    #[test]
    fn test_first_prediction_shapes() {
        assert_eq!(first_prediction(&json!({"predictions": [350000]})), Ok(350_000.0));
        assert_eq!(
            first_prediction(&json!({"predictions": [1.5, 2.5]})),
            Ok(1.5)
        );

        for body in [
            json!({}),
            json!({"predictions": []}),
            json!({"predictions": null}),
            json!({"predictions": "350000"}),
            json!({"predictions": ["350000"]}),
            json!([350000]),
        ] {
            assert!(
                matches!(
                    first_prediction(&body),
                    Err(FailureReason::ShapeMismatch { .. })
                ),
                "expected shape mismatch for {}",
                body
            );
        }
    }

    #[tokio::test]
    async fn test_send_posts_exact_field_names() {
        let mock = MockHttpClient::new();
        mock.add_json_response("POST /predict", 200, r#"{"predictions":[350000]}"#);

        let price = service(&mock)
            .send(&EstimateRequest::default())
            .await
            .unwrap();
        assert_eq!(price, 350_000.0);

        let calls = mock.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].endpoint, "http://localhost:8000");
        let sent: Value = serde_json::from_str(&calls[0].body).unwrap();
        assert_eq!(sent["square_footage"], 1500.0);
        assert_eq!(sent["school_rating"], 7.0);
    }

    #[tokio::test]
    async fn test_send_classifies_failures() {
        let mock = MockHttpClient::new();
        mock.add_json_response("POST /predict", 500, "internal error");
        mock.add_json_response("POST /predict", 200, "not json");
        mock.add_json_response("POST /predict", 200, r#"{"predictions":[]}"#);

        let svc = service(&mock);
        let request = EstimateRequest::default();

        assert!(matches!(
            svc.send(&request).await,
            Err(FailureReason::HttpFailure { status: 500, .. })
        ));
        assert!(matches!(
            svc.send(&request).await,
            Err(FailureReason::DecodeFailure { .. })
        ));
        assert!(matches!(
            svc.send(&request).await,
            Err(FailureReason::ShapeMismatch { .. })
        ));
        // No response configured: the mock fails at the transport level
        assert!(matches!(
            svc.send(&request).await,
            Err(FailureReason::NetworkFailure { .. })
        ));
        assert_eq!(mock.call_count(), 4);
    }

    #[tokio::test]
    async fn test_model_info_requires_object() {
        let mock = MockHttpClient::new();
        mock.add_json_response(
            "GET /model-info",
            200,
            r#"{"features":["square_footage"],"r2":0.91}"#,
        );
        mock.add_json_response("GET /model-info", 200, "[]");

        let svc = service(&mock);
        let info = svc.model_info().await.unwrap();
        assert_eq!(info["r2"], 0.91);
        assert!(matches!(
            svc.model_info().await,
            Err(FailureReason::ShapeMismatch { .. })
        ));
    }
}
