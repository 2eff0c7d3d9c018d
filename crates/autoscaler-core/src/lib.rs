//! Shared domain types for the transaction-aware horizontal autoscaler.
//!
//! This crate provides the vocabulary used across all autoscaler crates:
//! - Tier identity (`ServiceDescriptor`, `ServiceMap`)
//! - Measured latency (`LatencyReading`, `SpanKind`)
//! - Derived bottleneck attribution (`TierSelfTime`)
//! - The decision made each tick (`ScalingDecision`, `NoOpReason`)
//! - Cooldown/tick bookkeeping (`ControllerState`)

pub mod decision;
pub mod latency;
pub mod service_map;
pub mod state;

pub use decision::{NoOpReason, ScalingDecision};
pub use latency::{LatencyReading, SpanKind};
pub use service_map::{ServiceDescriptor, ServiceMap};
pub use state::ControllerState;

/// A tier's self-time: its own processing time, excluding time spent
/// awaiting downstream calls (`server_time - client_time`, clamped at zero).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierSelfTime {
    pub self_time_ms: f64,
}

impl TierSelfTime {
    /// Computes self-time from measured server and client latency.
    ///
    /// Negative results (clock skew, sampling noise) are clamped to zero.
    pub fn compute(server_time_ms: f64, client_time_ms: f64) -> Self {
        Self {
            self_time_ms: (server_time_ms - client_time_ms).max(0.0),
        }
    }
}
