//! Orchestrator client.
//!
//! Reads and patches replica counts on named deployments in a fixed
//! namespace. The client auto-detects its environment once, at
//! construction: in-cluster identity when available, otherwise a local
//! kubeconfig.

mod error;
mod kube_client;

pub use error::OrchestratorError;
pub use kube_client::KubeOrchestratorClient;

use std::future::Future;

/// Reads and patches a deployment's replica count in a single namespace.
///
/// Callers always re-read before deciding: concurrent
/// external edits to the deployment are tolerated because a patch only
/// ever touches the replica field.
pub trait OrchestratorClient: Send + Sync {
    /// Reads the current desired replica count for `deployment`.
    fn get_replicas(&self, deployment: &str) -> impl Future<Output = Result<u32, OrchestratorError>> + Send;

    /// Patches `deployment`'s replica count to `replicas`. Only the
    /// replica field is modified; no other part of the deployment spec is
    /// read or touched.
    fn set_replicas(
        &self,
        deployment: &str,
        replicas: u32,
    ) -> impl Future<Output = Result<(), OrchestratorError>> + Send;
}
