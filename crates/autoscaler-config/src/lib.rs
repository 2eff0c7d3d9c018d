//! Static configuration: SLO, replica bounds, thresholds, and the
//! compiled-in service map.
//!
//! Values load from (in increasing precedence) compiled-in defaults,
//! then environment variables. The one environment variable with a
//! guaranteed meaning downstream is `PROMETHEUS_URL`; the rest are read
//! the same way purely for operational convenience.

use autoscaler_core::{ServiceDescriptor, ServiceMap};
use autoscaler_policy::PolicyLimits;
use std::time::Duration;

mod error;
pub use error::ConfigurationError;

/// Full static configuration for one controller process.
#[derive(Debug, Clone)]
pub struct Config {
    pub metrics_url: String,
    pub slo_ms: f64,
    pub query_window: String,
    pub max_replicas: u32,
    pub min_replicas: u32,
    pub namespace: String,
    pub cooldown: Duration,
    pub idle_rps_threshold: f64,
    pub tick_interval: Duration,
    pub entry_service: String,
    pub service_map: ServiceMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metrics_url: "http://prometheus:9090".to_string(),
            slo_ms: 500.0,
            query_window: "1m".to_string(),
            max_replicas: 5,
            min_replicas: 1,
            namespace: "default".to_string(),
            cooldown: Duration::from_secs(60),
            idle_rps_threshold: 0.5,
            tick_interval: Duration::from_secs(15),
            entry_service: "storefront".to_string(),
            service_map: default_service_map(),
        }
    }
}

impl Config {
    /// Builds config from compiled-in defaults overlaid with recognized
    /// environment variables. Never fails on its own — a missing or
    /// malformed override value is ignored in favor of the default,
    /// except `PROMETHEUS_URL`'s absence, which is not an error either
    /// (the default applies). `ConfigurationError` is reserved for the
    /// orchestrator identity check performed by the binary at start-up.
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(url) = std::env::var("PROMETHEUS_URL") {
            if !url.is_empty() {
                config.metrics_url = url;
            }
        }
        if let Some(v) = env_f64("SLO_MS") {
            config.slo_ms = v;
        }
        if let Ok(v) = std::env::var("QUERY_WINDOW") {
            if !v.is_empty() {
                config.query_window = v;
            }
        }
        if let Some(v) = env_u32("MAX_REPLICAS") {
            config.max_replicas = v;
        }
        if let Some(v) = env_u32("MIN_REPLICAS") {
            config.min_replicas = v;
        }
        if let Ok(v) = std::env::var("NAMESPACE") {
            if !v.is_empty() {
                config.namespace = v;
            }
        }
        if let Some(v) = env_u64("COOLDOWN_S") {
            config.cooldown = Duration::from_secs(v);
        }
        if let Some(v) = env_f64("IDLE_RPS_THRESHOLD") {
            config.idle_rps_threshold = v;
        }
        if let Some(v) = env_u64("TICK_S") {
            config.tick_interval = Duration::from_secs(v);
        }

        config
    }

    /// The policy thresholds this config implies, for handing to
    /// `autoscaler_policy::decide`.
    pub fn policy_limits(&self) -> PolicyLimits {
        PolicyLimits {
            slo_ms: self.slo_ms,
            max_replicas: self.max_replicas,
            min_replicas: self.min_replicas,
            idle_rps_threshold: self.idle_rps_threshold,
        }
    }
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// The compiled-in pipeline topology: storefront → mid → backend,
/// The front tier is never scale-down eligible; the backend tier is a
/// leaf (no downstream client span).
fn default_service_map() -> ServiceMap {
    ServiceMap::new(vec![
        ServiceDescriptor::new("storefront", "storefront-deployment", false, true),
        ServiceDescriptor::new("mid", "mid-deployment", true, true),
        ServiceDescriptor::new("backend", "backend-deployment", true, false),
    ])
}
