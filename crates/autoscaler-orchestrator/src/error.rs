//! Orchestrator error taxonomy.

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("failed to read deployment {deployment}: {source}")]
    Read {
        deployment: String,
        #[source]
        source: kube::Error,
    },
    #[error("failed to patch deployment {deployment} to {replicas} replicas: {source}")]
    Patch {
        deployment: String,
        replicas: u32,
        #[source]
        source: kube::Error,
    },
    #[error("deployment {0} has no scale spec")]
    MissingScaleSpec(String),
}
