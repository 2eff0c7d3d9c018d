//! The decision `ScalingPolicy` emits each tick.

/// Why a tick resulted in no scaling action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoOpReason {
    /// A scaling action happened too recently; `COOLDOWN_S` has not elapsed.
    InCooldown,
    /// The entry-service latency query failed or timed out.
    MetricsUnavailable,
    /// The bottleneck tier's replica count is unknown, or already at `MAX_REPLICAS`.
    AtMaxOrUnknown,
    /// The request-rate query failed or timed out.
    RateUnavailable,
    /// Traffic is still present (`rps >= IDLE_RPS_THRESHOLD`); not idle enough to scale down.
    TrafficPresent,
    /// Every scale-down-eligible tier is already at `MIN_REPLICAS`.
    AlreadyMinimal,
}

impl NoOpReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoOpReason::InCooldown => "in_cooldown",
            NoOpReason::MetricsUnavailable => "metrics_unavailable",
            NoOpReason::AtMaxOrUnknown => "at_max_or_unknown",
            NoOpReason::RateUnavailable => "rate_unavailable",
            NoOpReason::TrafficPresent => "traffic_present",
            NoOpReason::AlreadyMinimal => "already_minimal",
        }
    }
}

/// The outcome of one reconciliation tick.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalingDecision {
    /// No replica count changes; `reason` explains why.
    NoOp(NoOpReason),
    /// Scale `deployment` up from `from` to `to` replicas.
    ScaleUp {
        deployment: String,
        from: u32,
        to: u32,
    },
    /// Scale `deployment` down from `from` to `to` replicas.
    ScaleDown {
        deployment: String,
        from: u32,
        to: u32,
    },
}

impl ScalingDecision {
    /// The deployment this decision would patch, if any.
    pub fn deployment(&self) -> Option<&str> {
        match self {
            ScalingDecision::NoOp(_) => None,
            ScalingDecision::ScaleUp { deployment, .. }
            | ScalingDecision::ScaleDown { deployment, .. } => Some(deployment),
        }
    }

    /// Whether this decision requires an orchestrator patch.
    pub fn is_action(&self) -> bool {
        !matches!(self, ScalingDecision::NoOp(_))
    }
}
