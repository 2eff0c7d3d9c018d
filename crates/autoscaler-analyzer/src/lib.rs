//! Bottleneck attribution via self-time decomposition.
//!
//! The pipeline is a linear call chain (storefront → mid → backend). A
//! tier's *server* span covers the entire downstream-inclusive duration;
//! subtracting its *client* span yields the time it itself spent working.
//! This attributes slow-down to the actual slow node rather than its
//! upstream callers.
//!
//! The analyzer never queries the metrics backend — it is a pure function
//! over already-measured latencies, mirroring the shape of a
//! `ConcurrencyAlgorithm` that only ever sees `record_success`/
//! `record_failure` inputs and never performs I/O itself.

use autoscaler_core::{ServiceMap, TierSelfTime};

/// A tier's measured latency for one analyzer pass.
#[derive(Debug, Clone, Copy)]
pub struct TierLatency {
    /// Inbound (server-span) average latency, in milliseconds.
    pub server_time_ms: f64,
    /// Outbound (client-span) average latency, in milliseconds. `0.0` for
    /// leaf tiers, which make no downstream calls.
    pub client_time_ms: f64,
}

/// The tier judged to be consuming the most self-time this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Bottleneck {
    pub metric_name: String,
    pub deployment_name: String,
    pub self_time: TierSelfTime,
}

/// Computes each tier's self-time and selects the worst.
///
/// `latencies` must contain one entry per tier named in `service_map`,
/// keyed by `metric_name`; tiers absent from `latencies` are skipped. Ties
/// are broken by `service_map` iteration order (the first tier reaching
/// the maximum self-time wins), making the result deterministic given
/// identical inputs.
///
/// Returns `None` only if no tier in `service_map` has a corresponding
/// entry in `latencies` — callers that always supply a reading for every
/// monitored tier will never observe this.
pub fn select_bottleneck(
    service_map: &ServiceMap,
    latencies: &std::collections::HashMap<String, TierLatency>,
) -> Option<Bottleneck> {
    let mut best: Option<Bottleneck> = None;

    for tier in service_map.iter() {
        let Some(latency) = latencies.get(&tier.metric_name) else {
            continue;
        };
        let self_time = TierSelfTime::compute(latency.server_time_ms, latency.client_time_ms);

        let is_new_best = match &best {
            None => true,
            Some(current) => self_time.self_time_ms > current.self_time.self_time_ms,
        };

        if is_new_best {
            best = Some(Bottleneck {
                metric_name: tier.metric_name.clone(),
                deployment_name: tier.deployment_name.clone(),
                self_time,
            });
        }
    }

    best
}
