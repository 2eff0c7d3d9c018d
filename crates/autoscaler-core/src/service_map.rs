//! Tier identity: `ServiceDescriptor` and the ordered `ServiceMap`.

use std::collections::HashMap;

/// Identifies one logical tier of the request pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceDescriptor {
    /// The `service_name` label value emitted by this tier's tracer.
    pub metric_name: String,
    /// The orchestrator object (deployment) to scale for this tier.
    pub deployment_name: String,
    /// Whether this tier may be scaled below `MIN_REPLICAS` is never
    /// allowed regardless — this flag instead governs whether it is a
    /// scale-down *candidate* at all (front-tier tiers are not).
    pub scale_down_eligible: bool,
    /// Whether this tier issues an outgoing call to a single downstream
    /// tier. Leaf tiers have no client-span query and `client_time = 0`.
    pub has_downstream: bool,
}

impl ServiceDescriptor {
    pub fn new(
        metric_name: impl Into<String>,
        deployment_name: impl Into<String>,
        scale_down_eligible: bool,
        has_downstream: bool,
    ) -> Self {
        Self {
            metric_name: metric_name.into(),
            deployment_name: deployment_name.into(),
            scale_down_eligible,
            has_downstream,
        }
    }
}

/// An ordered, immutable-after-construction mapping from metric name to
/// tier descriptor.
///
/// Iteration order is contractual: it defines both scale-down preference
/// and the `BottleneckAnalyzer` tie-break, giving both a deterministic,
/// documented ordering rather than relying on incidental map iteration
/// order.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceMap {
    order: Vec<ServiceDescriptor>,
    by_metric_name: HashMap<String, usize>,
}

impl ServiceMap {
    /// Builds a service map, preserving the given iteration order.
    pub fn new(tiers: Vec<ServiceDescriptor>) -> Self {
        let by_metric_name = tiers
            .iter()
            .enumerate()
            .map(|(i, d)| (d.metric_name.clone(), i))
            .collect();
        Self {
            order: tiers,
            by_metric_name,
        }
    }

    /// Iterates tiers in service-map order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.order.iter()
    }

    /// Iterates only tiers eligible for scale-down, in service-map order.
    pub fn scale_down_candidates(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.order.iter().filter(|d| d.scale_down_eligible)
    }

    /// Looks up a tier by its tracer-emitted metric name.
    pub fn get(&self, metric_name: &str) -> Option<&ServiceDescriptor> {
        self.by_metric_name
            .get(metric_name)
            .map(|&i| &self.order[i])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
