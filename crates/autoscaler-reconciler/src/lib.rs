//! The tick-driving reconciliation loop.
//!
//! `Reconciler` owns the only mutable state in the process
//! ([`ControllerState`]) and the two I/O clients. Each tick gathers a
//! [`TickSnapshot`], hands it to [`autoscaler_policy::decide`], and applies
//! whatever [`ScalingDecision`] comes back. Nothing about the decision
//! logic lives here — this crate is wiring and I/O, not policy.

use autoscaler_analyzer::TierLatency;
use autoscaler_config::Config;
use autoscaler_core::{ControllerState, LatencyReading, NoOpReason, ScalingDecision, SpanKind};
use autoscaler_metrics::MetricsClient;
use autoscaler_orchestrator::OrchestratorClient;
use autoscaler_policy::TickSnapshot;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tracing::{info, info_span, warn, Instrument};

/// Lower bound under which a per-call timeout is not worth shrinking
/// further, regardless of how short `tick_interval` is configured.
const MIN_QUERY_TIMEOUT: Duration = Duration::from_secs(1);

/// Margin subtracted from `tick_interval` to derive the per-call timeout
/// — a bounded timeout, comfortably under the tick interval — leaving
/// room for the tick's own bookkeeping to run before the next tick is due.
const QUERY_TIMEOUT_MARGIN: Duration = Duration::from_secs(2);

/// Drives the reconciliation loop against a metrics backend and an
/// orchestrator, on the cadence and thresholds in `config`.
pub struct Reconciler<M, O> {
    metrics: M,
    orchestrator: O,
    config: Config,
    state: ControllerState,
}

impl<M, O> Reconciler<M, O>
where
    M: MetricsClient,
    O: OrchestratorClient,
{
    pub fn new(metrics: M, orchestrator: O, config: Config) -> Self {
        let state = ControllerState::new(config.cooldown);
        Self {
            metrics,
            orchestrator,
            config,
            state,
        }
    }

    /// Runs ticks on `config.tick_interval` until `shutdown` is notified.
    /// Returns once the in-flight tick (if any) completes, so a shutdown
    /// never interrupts a partially-applied scaling decision.
    pub async fn run(mut self, shutdown: Arc<Notify>) {
        info!(
            tick_interval_s = self.config.tick_interval.as_secs(),
            "reconciler starting"
        );
        loop {
            self.run_tick().await;

            tokio::select! {
                _ = shutdown.notified() => {
                    info!("shutdown signal received, reconciler stopping");
                    break;
                }
                _ = tokio::time::sleep(self.config.tick_interval) => {}
            }
        }
    }

    async fn run_tick(&mut self) {
        let tick = self.state.tick_count();
        let span = info_span!("tick", tick);
        self.tick().instrument(span).await;
    }

    /// Gathers one snapshot, decides, and applies — the unit the tests in
    /// `tests/reconciler.rs` drive directly.
    pub async fn tick(&mut self) {
        let now = Instant::now();
        let cooldown_remaining = self.state.cooldown_remaining(self.config.cooldown, now);

        let decision = if !cooldown_remaining.is_zero() {
            info!(
                remaining_s = cooldown_remaining.as_secs(),
                "in cooldown, skipping metrics queries"
            );
            ScalingDecision::NoOp(NoOpReason::InCooldown)
        } else {
            let (total_latency_ms, rps, tier_latencies, replicas) = tokio::join!(
                self.query_total_latency(),
                self.query_rps(),
                self.query_tier_latencies(),
                self.query_replicas(),
            );

            let snapshot = TickSnapshot {
                total_latency_ms,
                rps,
                tier_latencies,
                replicas,
                cooldown_remaining,
            };

            autoscaler_policy::decide(&self.config.service_map, &snapshot, self.config.policy_limits())
        };

        self.log_decision(&decision);
        self.apply(decision).await;
        self.state.record_tick(now);
    }

    /// The metrics client this reconciler queries, exposed for tests that
    /// need to assert on a fake's internal state after a tick.
    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// The orchestrator client this reconciler patches, exposed for tests.
    pub fn orchestrator(&self) -> &O {
        &self.orchestrator
    }

    /// The current cooldown/tick bookkeeping.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    fn query_timeout(&self) -> Duration {
        self.config
            .tick_interval
            .saturating_sub(QUERY_TIMEOUT_MARGIN)
            .max(MIN_QUERY_TIMEOUT)
    }

    async fn bounded<F>(&self, fut: F) -> LatencyReading
    where
        F: std::future::Future<Output = LatencyReading>,
    {
        match tokio::time::timeout(self.query_timeout(), fut).await {
            Ok(reading) => reading,
            Err(_) => Err(autoscaler_core::latency::ReadingError::Timeout),
        }
    }

    async fn query_total_latency(&self) -> LatencyReading {
        self.bounded(self.metrics.avg_latency_ms(
            &self.config.entry_service,
            SpanKind::Server,
            &self.config.query_window,
        ))
        .await
    }

    async fn query_rps(&self) -> LatencyReading {
        self.bounded(self.metrics.request_rate(
            &self.config.entry_service,
            SpanKind::Server,
            &self.config.query_window,
        ))
        .await
    }

    /// Server/client self-time inputs for every tier but the entry tier —
    /// the entry tier's own server time is already the `total_latency_ms`
    /// measurement and is never itself a bottleneck candidate.
    async fn query_tier_latencies(&self) -> HashMap<String, TierLatency> {
        let tiers: Vec<_> = self
            .config
            .service_map
            .iter()
            .filter(|tier| tier.metric_name != self.config.entry_service)
            .collect();

        let futures = tiers.iter().map(|tier| async move {
            let server = self
                .bounded(self.metrics.avg_latency_ms(
                    &tier.metric_name,
                    SpanKind::Server,
                    &self.config.query_window,
                ))
                .await;
            let client = if tier.has_downstream {
                self.bounded(self.metrics.avg_latency_ms(
                    &tier.metric_name,
                    SpanKind::Client,
                    &self.config.query_window,
                ))
                .await
            } else {
                Ok(0.0)
            };
            (tier.metric_name.clone(), server, client)
        });

        let results = join_all(futures).await;

        let mut out = HashMap::new();
        for (metric_name, server, client) in results {
            let (server_time_ms, client_time_ms) = match (server, client) {
                (Ok(s), Ok(c)) => (s, c),
                (server, client) => {
                    warn!(
                        service = %metric_name,
                        server = ?server,
                        client = ?client,
                        "tier latency query failed; tier excluded from this tick's bottleneck search"
                    );
                    continue;
                }
            };
            out.insert(metric_name, TierLatency { server_time_ms, client_time_ms });
        }
        out
    }

    async fn query_replicas(&self) -> HashMap<String, u32> {
        let deployments: Vec<_> = self
            .config
            .service_map
            .iter()
            .map(|tier| tier.deployment_name.clone())
            .collect();

        let futures = deployments
            .iter()
            .map(|deployment| self.orchestrator.get_replicas(deployment));
        let results = join_all(futures).await;

        let mut out = HashMap::new();
        for (deployment, result) in deployments.into_iter().zip(results) {
            match result {
                Ok(replicas) => {
                    out.insert(deployment, replicas);
                }
                Err(err) => {
                    warn!(%deployment, error = %err, "could not read replica count");
                }
            }
        }
        out
    }

    async fn apply(&mut self, decision: ScalingDecision) {
        let (deployment, to) = match &decision {
            ScalingDecision::NoOp(_) => return,
            ScalingDecision::ScaleUp { deployment, to, .. }
            | ScalingDecision::ScaleDown { deployment, to, .. } => (deployment.clone(), *to),
        };

        match self.orchestrator.set_replicas(&deployment, to).await {
            // `last_scale_at` must equal the action's completion time, not
            // the tick's start — captured fresh here, after the patch
            // returns, rather than reusing the tick-start `now`.
            Ok(()) => self.state.record_scale(Instant::now()),
            Err(err) => warn!(%deployment, error = %err, "failed to apply scaling decision"),
        }
    }

    fn log_decision(&self, decision: &ScalingDecision) {
        match decision {
            ScalingDecision::NoOp(reason) => {
                info!(reason = reason.as_str(), "tick complete: no-op");
            }
            ScalingDecision::ScaleUp { deployment, from, to } => {
                warn!(%deployment, from, to, "tick complete: scaling up");
            }
            ScalingDecision::ScaleDown { deployment, from, to } => {
                warn!(%deployment, from, to, "tick complete: scaling down");
            }
        }
    }
}
