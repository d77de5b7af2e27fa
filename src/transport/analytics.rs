//! Analytics service adapter (`GET /statistics`).

use async_trait::async_trait;
use serde_json::Value;

use super::{FailureReason, ServiceHealth, Transport, decode_json, expect_object, probe_health};
use crate::config::ClientConfig;
use crate::domain::statistics::StatisticsSnapshot;
use crate::http::{HttpClient, HttpRequest};

/// Fetches aggregate market statistics.
#[derive(Clone)]
pub struct AnalyticsService<H: HttpClient> {
    http: H,
    base_url: String,
    statistics_path: String,
    health_path: String,
    timeout_ms: Option<u64>,
}

impl<H: HttpClient> AnalyticsService<H> {
    pub fn new(http: H, config: &ClientConfig) -> Self {
        Self {
            http,
            base_url: config.analytics_base_url.clone(),
            statistics_path: config.statistics_path.clone(),
            health_path: config.health_path.clone(),
            timeout_ms: config.transport_timeout_ms,
        }
    }

    /// Probe `GET /health`. Does not touch any lifecycle state.
    pub async fn health(&self) -> Result<ServiceHealth, FailureReason> {
        probe_health(&self.http, &self.base_url, &self.health_path, self.timeout_ms).await
    }
}

/// Extract and check a snapshot from a decoded `/statistics` body.
pub fn parse_snapshot(body: &Value) -> Result<StatisticsSnapshot, FailureReason> {
    let object = expect_object(body)?;
    let mismatch = |detail: String| FailureReason::ShapeMismatch { detail };

    let count = object
        .get("count")
        .ok_or_else(|| mismatch("missing `count`".to_string()))?
        .as_u64()
        .ok_or_else(|| mismatch("`count` is not a non-negative integer".to_string()))?;

    let price = |key: &str| -> Result<f64, FailureReason> {
        object
            .get(key)
            .ok_or_else(|| mismatch(format!("missing `{}`", key)))?
            .as_f64()
            .ok_or_else(|| mismatch(format!("`{}` is not a number", key)))
    };

    let snapshot = StatisticsSnapshot {
        count,
        average_price: price("averagePrice")?,
        min_price: price("minPrice")?,
        max_price: price("maxPrice")?,
    };
    snapshot.check_invariants().map_err(mismatch)?;

    Ok(snapshot)
}

#[async_trait]
impl<H: HttpClient> Transport for AnalyticsService<H> {
    type Request = ();
    type Payload = StatisticsSnapshot;

    fn name(&self) -> &'static str {
        "analysis"
    }

    async fn send(&self, _request: &()) -> Result<StatisticsSnapshot, FailureReason> {
        let http_request = HttpRequest::get(&self.base_url, &self.statistics_path);

        tracing::debug!(request_id = %http_request.id, "Fetching market statistics");

        let outcome = self.http.execute(&http_request, self.timeout_ms).await;
        let result = decode_json(outcome).and_then(|body| parse_snapshot(&body));

        match &result {
            Ok(snapshot) => tracing::info!(
                request_id = %http_request.id,
                count = snapshot.count,
                "Market statistics received"
            ),
            Err(reason) => tracing::warn!(
                request_id = %http_request.id,
                kind = reason.kind(),
                error = %reason,
                "Market statistics request failed"
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

    #[test]
    fn test_parse_snapshot() {
        let snapshot = parse_snapshot(&json!({
            "count": 120,
            "averagePrice": 410000,
            "minPrice": 95000,
            "maxPrice": 2500000
        }))
        .unwrap();
        assert_eq!(snapshot.count, 120);
        assert_eq!(snapshot.average_price, 410_000.0);
        assert_eq!(snapshot.max_price, 2_500_000.0);
    }

    #[test]
    fn test_parse_snapshot_rejects_bad_shapes() {
        for body in [
            json!({"averagePrice": 1, "minPrice": 1, "maxPrice": 1}),
            json!({"count": -1, "averagePrice": 1, "minPrice": 1, "maxPrice": 1}),
            json!({"count": 1.5, "averagePrice": 1, "minPrice": 1, "maxPrice": 1}),
            json!({"count": 2, "averagePrice": "1", "minPrice": 1, "maxPrice": 1}),
            json!({"count": 2, "averagePrice": 5, "minPrice": 10, "maxPrice": 20}),
            json!(null),
        ] {
            assert!(
                matches!(
                    parse_snapshot(&body),
                    Err(FailureReason::ShapeMismatch { .. })
                ),
                "expected shape mismatch for {}",
                body
            );
        }
    }

    #[tokio::test]
    async fn test_send_issues_single_get() {
        let mock = MockHttpClient::new();
        mock.add_json_response(
            "GET /statistics",
            200,
            r#"{"count":0,"averagePrice":0,"minPrice":0,"maxPrice":0}"#,
        );

        let service = AnalyticsService::new(mock.clone(), &ClientConfig::default());
        let snapshot = service.send(&()).await.unwrap();
        assert_eq!(snapshot.count, 0);

        let calls = mock.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "GET");
        assert_eq!(calls[0].endpoint, "http://localhost:8080");
        assert!(calls[0].body.is_empty());
    }
}
