//! Start-up configuration errors.
//!
//! Unlike per-tick errors from the metrics or orchestrator clients,
//! `ConfigurationError` is fatal: it is only ever raised during start-up,
//! before the reconciler's first tick.

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no orchestrator credentials found: not running in-cluster and no local kubeconfig present")]
    MissingOrchestratorIdentity,
    #[error("invalid metrics backend URL: {0}")]
    InvalidMetricsUrl(String),
}
