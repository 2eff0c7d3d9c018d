//! The scaling decision center.
//!
//! `ScalingPolicy` consumes one snapshot of tick-local observations and
//! emits exactly one [`ScalingDecision`][autoscaler_core::ScalingDecision].
//! It performs no I/O and holds no state across ticks — calling it twice
//! with the same [`TickSnapshot`] yields the same decision.

use autoscaler_analyzer::{select_bottleneck, TierLatency};
use autoscaler_core::{LatencyReading, NoOpReason, ScalingDecision, ServiceMap};
use std::collections::HashMap;
use std::time::Duration;

/// Thresholds the policy is evaluated against, scoped to just the fields
/// the decision function needs so this crate stays independent of how
/// configuration is loaded.
#[derive(Debug, Clone, Copy)]
pub struct PolicyLimits {
    pub slo_ms: f64,
    pub max_replicas: u32,
    pub min_replicas: u32,
    pub idle_rps_threshold: f64,
}

impl Default for PolicyLimits {
    fn default() -> Self {
        Self {
            slo_ms: 500.0,
            max_replicas: 5,
            min_replicas: 1,
            idle_rps_threshold: 0.5,
        }
    }
}

/// One tick's worth of observations, gathered by the `Reconciler` before
/// invoking the policy.
#[derive(Debug, Clone)]
pub struct TickSnapshot {
    /// End-to-end entry-tier latency, or the query's failure.
    pub total_latency_ms: LatencyReading,
    /// Entry-tier request rate, or the query's failure.
    pub rps: LatencyReading,
    /// Per-tier server/client latency, keyed by `metric_name`. Only
    /// consulted when `total_latency_ms` exceeds the SLO.
    pub tier_latencies: HashMap<String, TierLatency>,
    /// Current replica count per deployment name, if known.
    pub replicas: HashMap<String, u32>,
    /// Time remaining before the cooldown set by the last scaling action expires.
    pub cooldown_remaining: Duration,
}

/// Consumes a [`TickSnapshot`] and the compiled-in [`ServiceMap`] and
/// emits one [`ScalingDecision`].
///
/// Rules are evaluated top to bottom — the first matching rule decides
/// the tick:
/// 1. Cooldown guard.
/// 2. Missing total-latency data.
/// 3. Scale-up, if latency exceeds the SLO.
/// 4. Scale-down (or no-op), otherwise.
pub fn decide(service_map: &ServiceMap, snapshot: &TickSnapshot, limits: PolicyLimits) -> ScalingDecision {
    if !snapshot.cooldown_remaining.is_zero() {
        return ScalingDecision::NoOp(NoOpReason::InCooldown);
    }

    let total_latency_ms = match snapshot.total_latency_ms {
        Ok(ms) => ms,
        Err(_) => return ScalingDecision::NoOp(NoOpReason::MetricsUnavailable),
    };

    if total_latency_ms > limits.slo_ms {
        return decide_scale_up(service_map, snapshot, limits);
    }

    decide_scale_down(service_map, snapshot, limits)
}

fn decide_scale_up(
    service_map: &ServiceMap,
    snapshot: &TickSnapshot,
    limits: PolicyLimits,
) -> ScalingDecision {
    let Some(bottleneck) = select_bottleneck(service_map, &snapshot.tier_latencies) else {
        return ScalingDecision::NoOp(NoOpReason::AtMaxOrUnknown);
    };

    match snapshot.replicas.get(&bottleneck.deployment_name) {
        Some(&current) if current < limits.max_replicas => ScalingDecision::ScaleUp {
            deployment: bottleneck.deployment_name,
            from: current,
            to: current + 1,
        },
        _ => ScalingDecision::NoOp(NoOpReason::AtMaxOrUnknown),
    }
}

fn decide_scale_down(
    service_map: &ServiceMap,
    snapshot: &TickSnapshot,
    limits: PolicyLimits,
) -> ScalingDecision {
    let rps = match snapshot.rps {
        Ok(v) => v,
        Err(_) => return ScalingDecision::NoOp(NoOpReason::RateUnavailable),
    };

    if rps >= limits.idle_rps_threshold {
        return ScalingDecision::NoOp(NoOpReason::TrafficPresent);
    }

    for tier in service_map.scale_down_candidates() {
        if let Some(&current) = snapshot.replicas.get(&tier.deployment_name) {
            if current > limits.min_replicas {
                return ScalingDecision::ScaleDown {
                    deployment: tier.deployment_name.clone(),
                    from: current,
                    to: current - 1,
                };
            }
        }
    }

    ScalingDecision::NoOp(NoOpReason::AlreadyMinimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoscaler_core::ServiceDescriptor;

    fn chain_map() -> ServiceMap {
        ServiceMap::new(vec![
            ServiceDescriptor::new("storefront", "storefront-deployment", false, true),
            ServiceDescriptor::new("mid", "mid-deployment", true, true),
            ServiceDescriptor::new("backend", "backend-deployment", true, false),
        ])
    }

    fn base_snapshot() -> TickSnapshot {
        TickSnapshot {
            total_latency_ms: Ok(50.0),
            rps: Ok(0.1),
            tier_latencies: HashMap::new(),
            replicas: HashMap::from([
                ("mid-deployment".to_string(), 2),
                ("backend-deployment".to_string(), 2),
            ]),
            cooldown_remaining: Duration::ZERO,
        }
    }

    #[test]
    fn scenario_1_idle_scale_down_cascade() {
        let map = chain_map();
        let limits = PolicyLimits::default();

        let snap1 = base_snapshot();
        let decision = decide(&map, &snap1, limits);
        assert_eq!(
            decision,
            ScalingDecision::ScaleDown {
                deployment: "mid-deployment".to_string(),
                from: 2,
                to: 1,
            }
        );

        let mut snap2 = base_snapshot();
        snap2.replicas.insert("mid-deployment".to_string(), 1);
        let decision = decide(&map, &snap2, limits);
        assert_eq!(
            decision,
            ScalingDecision::ScaleDown {
                deployment: "backend-deployment".to_string(),
                from: 2,
                to: 1,
            }
        );

        let mut snap3 = base_snapshot();
        snap3.replicas.insert("mid-deployment".to_string(), 1);
        snap3.replicas.insert("backend-deployment".to_string(), 1);
        let decision = decide(&map, &snap3, limits);
        assert_eq!(decision, ScalingDecision::NoOp(NoOpReason::AlreadyMinimal));
    }

    #[test]
    fn scenario_2_backend_bottleneck_scale_up() {
        let map = chain_map();
        let limits = PolicyLimits::default();
        let mut snap = base_snapshot();
        snap.total_latency_ms = Ok(800.0);
        snap.tier_latencies.insert(
            "mid".to_string(),
            TierLatency {
                server_time_ms: 750.0,
                client_time_ms: 700.0,
            },
        );
        snap.tier_latencies.insert(
            "backend".to_string(),
            TierLatency {
                server_time_ms: 700.0,
                client_time_ms: 0.0,
            },
        );

        let decision = decide(&map, &snap, limits);
        assert_eq!(
            decision,
            ScalingDecision::ScaleUp {
                deployment: "backend-deployment".to_string(),
                from: 2,
                to: 3,
            }
        );
    }

    #[test]
    fn scenario_3_mid_tier_bottleneck_scale_up() {
        let map = chain_map();
        let limits = PolicyLimits::default();
        let mut snap = base_snapshot();
        snap.total_latency_ms = Ok(900.0);
        snap.tier_latencies.insert(
            "mid".to_string(),
            TierLatency {
                server_time_ms: 850.0,
                client_time_ms: 100.0,
            },
        );
        snap.tier_latencies.insert(
            "backend".to_string(),
            TierLatency {
                server_time_ms: 100.0,
                client_time_ms: 0.0,
            },
        );

        let decision = decide(&map, &snap, limits);
        assert_eq!(
            decision,
            ScalingDecision::ScaleUp {
                deployment: "mid-deployment".to_string(),
                from: 2,
                to: 3,
            }
        );
    }

    #[test]
    fn scenario_4_cooldown_suppression() {
        let map = chain_map();
        let limits = PolicyLimits::default();
        let mut snap = base_snapshot();
        snap.total_latency_ms = Ok(800.0);
        snap.cooldown_remaining = Duration::from_secs(30);

        let decision = decide(&map, &snap, limits);
        assert_eq!(decision, ScalingDecision::NoOp(NoOpReason::InCooldown));
    }

    #[test]
    fn scenario_5_traffic_present_slo_met() {
        let map = chain_map();
        let limits = PolicyLimits::default();
        let mut snap = base_snapshot();
        snap.total_latency_ms = Ok(200.0);
        snap.rps = Ok(50.0);

        let decision = decide(&map, &snap, limits);
        assert_eq!(decision, ScalingDecision::NoOp(NoOpReason::TrafficPresent));
    }

    #[test]
    fn scenario_6_metrics_outage() {
        use autoscaler_core::latency::ReadingError;
        let map = chain_map();
        let limits = PolicyLimits::default();
        let mut snap = base_snapshot();
        snap.total_latency_ms = Err(ReadingError::Transport("connection refused".into()));

        let decision = decide(&map, &snap, limits);
        assert_eq!(
            decision,
            ScalingDecision::NoOp(NoOpReason::MetricsUnavailable)
        );
    }

    #[test]
    fn latency_exactly_at_slo_takes_scale_down_branch() {
        let map = chain_map();
        let limits = PolicyLimits::default();
        let mut snap = base_snapshot();
        snap.total_latency_ms = Ok(limits.slo_ms);

        let decision = decide(&map, &snap, limits);
        assert_eq!(
            decision,
            ScalingDecision::ScaleDown {
                deployment: "mid-deployment".to_string(),
                from: 2,
                to: 1,
            }
        );
    }

    #[test]
    fn replica_at_max_during_scale_up_yields_no_op() {
        let map = chain_map();
        let limits = PolicyLimits::default();
        let mut snap = base_snapshot();
        snap.total_latency_ms = Ok(800.0);
        snap.replicas
            .insert("backend-deployment".to_string(), limits.max_replicas);
        snap.tier_latencies.insert(
            "mid".to_string(),
            TierLatency {
                server_time_ms: 100.0,
                client_time_ms: 90.0,
            },
        );
        snap.tier_latencies.insert(
            "backend".to_string(),
            TierLatency {
                server_time_ms: 700.0,
                client_time_ms: 0.0,
            },
        );

        let decision = decide(&map, &snap, limits);
        assert_eq!(decision, ScalingDecision::NoOp(NoOpReason::AtMaxOrUnknown));
    }

    #[test]
    fn unknown_replica_count_during_scale_up_yields_no_op() {
        let map = chain_map();
        let limits = PolicyLimits::default();
        let mut snap = base_snapshot();
        snap.total_latency_ms = Ok(800.0);
        snap.replicas.remove("backend-deployment");
        snap.tier_latencies.insert(
            "mid".to_string(),
            TierLatency {
                server_time_ms: 100.0,
                client_time_ms: 90.0,
            },
        );
        snap.tier_latencies.insert(
            "backend".to_string(),
            TierLatency {
                server_time_ms: 700.0,
                client_time_ms: 0.0,
            },
        );

        let decision = decide(&map, &snap, limits);
        assert_eq!(decision, ScalingDecision::NoOp(NoOpReason::AtMaxOrUnknown));
    }

    #[test]
    fn idempotent_given_identical_snapshot() {
        let map = chain_map();
        let limits = PolicyLimits::default();
        let snap = base_snapshot();

        assert_eq!(decide(&map, &snap, limits), decide(&map, &snap, limits));
    }

    #[test]
    fn rate_unavailable_on_scale_down_path() {
        use autoscaler_core::latency::ReadingError;
        let map = chain_map();
        let limits = PolicyLimits::default();
        let mut snap = base_snapshot();
        snap.rps = Err(ReadingError::Timeout);

        let decision = decide(&map, &snap, limits);
        assert_eq!(
            decision,
            ScalingDecision::NoOp(NoOpReason::RateUnavailable)
        );
    }
}
