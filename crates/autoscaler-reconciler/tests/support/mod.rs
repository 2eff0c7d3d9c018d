//! Fakes for driving a [`Reconciler`](autoscaler_reconciler::Reconciler)
//! end to end without a real Prometheus or Kubernetes backend.

use autoscaler_core::latency::ReadingError;
use autoscaler_core::{LatencyReading, SpanKind};
use autoscaler_metrics::MetricsClient;
use autoscaler_orchestrator::OrchestratorClient;
use std::collections::HashMap;
use std::sync::Mutex;

/// A scripted metrics backend. `avg_latency_ms` and `request_rate` are
/// scripted independently — they are two distinct PromQL evaluations in
/// production even when issued against the same
/// `(service, span_kind)` pair, so the fake keeps two maps rather than
/// one, letting a test set the entry tier's total latency and its request
/// rate to different values in the same tick.
#[derive(Default)]
pub struct FakeMetricsClient {
    latencies: Mutex<HashMap<(String, SpanKind), LatencyReading>>,
    rates: Mutex<HashMap<(String, SpanKind), LatencyReading>>,
}

impl FakeMetricsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the reading `avg_latency_ms(service, span_kind, _)` returns.
    pub fn set_latency(&self, service: &str, span_kind: SpanKind, reading: LatencyReading) {
        self.latencies
            .lock()
            .unwrap()
            .insert((service.to_string(), span_kind), reading);
    }

    /// Scripts the reading `request_rate(service, span_kind, _)` returns.
    pub fn set_rate(&self, service: &str, span_kind: SpanKind, reading: LatencyReading) {
        self.rates
            .lock()
            .unwrap()
            .insert((service.to_string(), span_kind), reading);
    }

    fn lookup(map: &Mutex<HashMap<(String, SpanKind), LatencyReading>>, service: &str, span_kind: SpanKind) -> LatencyReading {
        map.lock()
            .unwrap()
            .get(&(service.to_string(), span_kind))
            .cloned()
            .unwrap_or_else(|| Err(ReadingError::Shape("no fixture set for query".into())))
    }
}

impl MetricsClient for FakeMetricsClient {
    async fn avg_latency_ms(&self, service: &str, span_kind: SpanKind, _window: &str) -> LatencyReading {
        Self::lookup(&self.latencies, service, span_kind)
    }

    async fn request_rate(&self, service: &str, span_kind: SpanKind, _window: &str) -> LatencyReading {
        Self::lookup(&self.rates, service, span_kind)
    }
}

/// A scripted orchestrator: replica counts live in a map the test seeds
/// up front; `set_replicas` mutates it in place and records the call.
#[derive(Default)]
pub struct FakeOrchestratorClient {
    replicas: Mutex<HashMap<String, u32>>,
    pub applied: Mutex<Vec<(String, u32)>>,
}

impl FakeOrchestratorClient {
    pub fn new(seed: impl IntoIterator<Item = (&'static str, u32)>) -> Self {
        let replicas = seed.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        Self {
            replicas: Mutex::new(replicas),
            applied: Mutex::new(Vec::new()),
        }
    }

    pub fn replicas_of(&self, deployment: &str) -> Option<u32> {
        self.replicas.lock().unwrap().get(deployment).copied()
    }
}

impl OrchestratorClient for FakeOrchestratorClient {
    async fn get_replicas(&self, deployment: &str) -> Result<u32, autoscaler_orchestrator::OrchestratorError> {
        self.replicas
            .lock()
            .unwrap()
            .get(deployment)
            .copied()
            .ok_or_else(|| autoscaler_orchestrator::OrchestratorError::MissingScaleSpec(deployment.to_string()))
    }

    async fn set_replicas(
        &self,
        deployment: &str,
        replicas: u32,
    ) -> Result<(), autoscaler_orchestrator::OrchestratorError> {
        self.replicas
            .lock()
            .unwrap()
            .insert(deployment.to_string(), replicas);
        self.applied
            .lock()
            .unwrap()
            .push((deployment.to_string(), replicas));
        Ok(())
    }
}
