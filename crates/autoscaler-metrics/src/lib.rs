//! Metrics backend client.
//!
//! Evaluates PromQL-shaped scalar queries over HTTP against a
//! Prometheus-compatible time-series backend. The client is stateless
//! and side-effect-free; both operations below are safe to call
//! concurrently and to retry.

mod error;
mod prometheus;

pub use error::MetricsError;
pub use prometheus::PrometheusMetricsClient;

use autoscaler_core::{LatencyReading, SpanKind};
use std::future::Future;
use std::time::Duration;

/// Queries average latency and request rate for a tier's span kind.
///
/// Implementors must not panic; every transport, parse, or evaluation
/// failure surfaces as `Err` via [`LatencyReading`].
pub trait MetricsClient: Send + Sync {
    /// `sum(rate(latency_milliseconds_sum{service_name=S,span_kind=K}[W])) /
    ///  sum(rate(latency_milliseconds_count{service_name=S,span_kind=K}[W]))`,
    /// evaluated as two scalar queries. Returns `Ok(0.0)` when the
    /// denominator is zero or the result set is empty.
    fn avg_latency_ms(
        &self,
        service: &str,
        span_kind: SpanKind,
        window: &str,
    ) -> impl Future<Output = LatencyReading> + Send;

    /// `sum(rate(latency_milliseconds_count{service_name=S,span_kind=K}[W]))`.
    fn request_rate(
        &self,
        service: &str,
        span_kind: SpanKind,
        window: &str,
    ) -> impl Future<Output = LatencyReading> + Send;
}

/// Timeout applied to every individual query. Bounded well under the
/// tick interval so a hung query cannot stall the whole reconciliation loop.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);
