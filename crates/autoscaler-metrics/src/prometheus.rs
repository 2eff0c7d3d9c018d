use crate::error::MetricsError;
use crate::{MetricsClient, DEFAULT_QUERY_TIMEOUT};
use autoscaler_core::{LatencyReading, SpanKind};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// A [`MetricsClient`] backed by a Prometheus-compatible HTTP API.
///
/// Reuses a single `reqwest::Client` across calls — connection pooling is
/// handled by `reqwest` internally, matching the stateless, cheaply-cloned
/// wrapper shape described by the `MetricsClient` trait.
#[derive(Clone)]
pub struct PrometheusMetricsClient {
    base_url: String,
    http: reqwest::Client,
    query_timeout: Duration,
}

impl PrometheusMetricsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, query_timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            query_timeout,
        }
    }

    fn promql_selector(service: &str, span_kind: SpanKind) -> String {
        format!(
            r#"{{service_name="{service}", span_kind="{kind}"}}"#,
            service = service,
            kind = span_kind.metric_label()
        )
    }

    async fn scalar_query(&self, promql: &str) -> Result<f64, MetricsError> {
        let fut = self.instant_query(promql);
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(MetricsError::Timeout(self.query_timeout)),
        }
    }

    async fn instant_query(&self, promql: &str) -> Result<f64, MetricsError> {
        let url = format!("{}/api/v1/query", self.base_url.trim_end_matches('/'));
        debug!(query = promql, %url, "issuing PromQL instant query");

        let response = self
            .http
            .get(&url)
            .query(&[("query", promql)])
            .send()
            .await?
            .error_for_status()?;

        let body: PrometheusResponse = response.json().await?;

        if body.status != "success" {
            return Err(MetricsError::Shape(format!(
                "prometheus query did not succeed: {}",
                body.status
            )));
        }

        match body.data.result.first() {
            None => Ok(0.0),
            Some(sample) => {
                let value_str = sample.value.get(1).ok_or_else(|| {
                    MetricsError::Shape("sample vector missing value element".to_string())
                })?;
                value_str
                    .as_str()
                    .ok_or_else(|| MetricsError::Shape("sample value was not a string".to_string()))?
                    .parse::<f64>()
                    .map_err(|e| MetricsError::Shape(format!("could not parse scalar: {e}")))
            }
        }
    }
}

impl MetricsClient for PrometheusMetricsClient {
    async fn avg_latency_ms(
        &self,
        service: &str,
        span_kind: SpanKind,
        window: &str,
    ) -> LatencyReading {
        let selector = Self::promql_selector(service, span_kind);
        let sum_query = format!("sum(rate(latency_milliseconds_sum{selector}[{window}]))");
        let count_query = format!("sum(rate(latency_milliseconds_count{selector}[{window}]))");

        let sum = self.scalar_query(&sum_query).await;
        let count = self.scalar_query(&count_query).await;

        match (sum, count) {
            (Ok(sum), Ok(count)) => {
                if count == 0.0 {
                    Ok(0.0)
                } else {
                    Ok(sum / count)
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(service, %span_kind, error = %e, "avg_latency_ms query failed");
                Err(e.into())
            }
        }
    }

    async fn request_rate(
        &self,
        service: &str,
        span_kind: SpanKind,
        window: &str,
    ) -> LatencyReading {
        let selector = Self::promql_selector(service, span_kind);
        let count_query = format!("sum(rate(latency_milliseconds_count{selector}[{window}]))");

        match self.scalar_query(&count_query).await {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!(service, %span_kind, error = %e, "request_rate query failed");
                Err(e.into())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct PrometheusResponse {
    status: String,
    data: PrometheusData,
}

#[derive(Debug, Deserialize)]
struct PrometheusData {
    result: Vec<PrometheusSample>,
}

#[derive(Debug, Deserialize)]
struct PrometheusSample {
    value: Vec<serde_json::Value>,
}
