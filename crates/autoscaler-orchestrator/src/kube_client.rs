use crate::error::OrchestratorError;
use crate::OrchestratorClient;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v1::Scale;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use serde_json::json;
use tracing::info;

/// An [`OrchestratorClient`] backed by the Kubernetes API, scoped to the
/// `autoscaling/v1` `Scale` subresource of a single namespace's
/// deployments.
#[derive(Clone)]
pub struct KubeOrchestratorClient {
    client: Client,
    namespace: String,
}

impl KubeOrchestratorClient {
    /// Builds a client, detecting in-cluster identity first and falling
    /// back to the local kubeconfig — this detection happens exactly
    /// once, here.
    pub async fn try_new(namespace: impl Into<String>) -> Result<Self, kube::Error> {
        let client = Client::try_default().await?;
        Ok(Self {
            client,
            namespace: namespace.into(),
        })
    }

    fn deployments(&self) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }
}

impl OrchestratorClient for KubeOrchestratorClient {
    async fn get_replicas(&self, deployment: &str) -> Result<u32, OrchestratorError> {
        let scale = self
            .deployments()
            .get_scale(deployment)
            .await
            .map_err(|source| OrchestratorError::Read {
                deployment: deployment.to_string(),
                source,
            })?;

        let replicas = scale
            .spec
            .and_then(|spec| spec.replicas)
            .ok_or_else(|| OrchestratorError::MissingScaleSpec(deployment.to_string()))?;

        Ok(replicas.max(0) as u32)
    }

    async fn set_replicas(&self, deployment: &str, replicas: u32) -> Result<(), OrchestratorError> {
        let scale: Scale = serde_json::from_value(json!({
            "apiVersion": "autoscaling/v1",
            "kind": "Scale",
            "spec": { "replicas": replicas },
        }))
        .expect("Scale patch body is a valid literal");

        let params = PatchParams::apply("autoscaler").force();
        self.deployments()
            .patch_scale(deployment, &params, &Patch::Apply(&scale))
            .await
            .map_err(|source| OrchestratorError::Patch {
                deployment: deployment.to_string(),
                replicas,
                source,
            })?;

        info!(deployment, replicas, "patched deployment replica count");
        Ok(())
    }
}
