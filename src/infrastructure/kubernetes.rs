//! Kubernetes platform: server-side applies each service's manifest.

use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use kube::{
    api::{Api, DynamicObject, Patch, PatchParams},
    core::GroupVersionKind,
    discovery::{self, Scope},
    Client, Config,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::platform::{Platform, ServiceDefinition};
use crate::config::KubernetesConfig;
use crate::error::ApplyError;

/// Create Kubernetes client
pub async fn create_client() -> Result<Client> {
    let config = Config::infer()
        .await
        .context("Failed to infer kubeconfig")?;

    Client::try_from(config).context("Failed to create Kubernetes client")
}

/// Split a manifest into its YAML documents, skipping empty ones
pub fn parse_manifest(manifest: &str) -> Result<Vec<DynamicObject>> {
    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_str(manifest) {
        let value = serde_yaml::Value::deserialize(document).context("Invalid manifest YAML")?;
        if value.is_null() {
            continue;
        }
        let object: DynamicObject =
            serde_yaml::from_value(value).context("Manifest document is not a Kubernetes object")?;
        objects.push(object);
    }
    Ok(objects)
}

pub struct KubernetesPlatform {
    client: Client,
    params: PatchParams,
}

impl KubernetesPlatform {
    pub fn new(client: Client, config: &KubernetesConfig) -> Self {
        let mut params = PatchParams::apply(&config.field_manager);
        if config.force_conflicts {
            params = params.force();
        }
        Self { client, params }
    }

    async fn apply_definition(&self, def: &ServiceDefinition) -> Result<()> {
        let objects = parse_manifest(&def.new_definition)?;
        if objects.is_empty() {
            return Err(anyhow!("manifest contains no objects"));
        }
        for object in &objects {
            self.apply_object(def.service_id.namespace(), object).await?;
        }
        Ok(())
    }

    async fn apply_object(&self, default_namespace: &str, object: &DynamicObject) -> Result<()> {
        let types = object
            .types
            .as_ref()
            .ok_or_else(|| anyhow!("object is missing apiVersion/kind"))?;
        let gvk = GroupVersionKind::try_from(types)?;
        let name = object
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| anyhow!("{} is missing metadata.name", gvk.kind))?;

        let (resource, capabilities) = discovery::pinned_kind(&self.client, &gvk)
            .await
            .with_context(|| format!("Failed to resolve kind {}", gvk.kind))?;

        let api: Api<DynamicObject> = if capabilities.scope == Scope::Namespaced {
            let namespace = object
                .metadata
                .namespace
                .as_deref()
                .unwrap_or(default_namespace);
            Api::namespaced_with(self.client.clone(), namespace, &resource)
        } else {
            Api::all_with(self.client.clone(), &resource)
        };

        api.patch(name, &self.params, &Patch::Apply(object))
            .await
            .with_context(|| format!("Failed to apply {} {}", gvk.kind, name))?;
        debug!(kind = %gvk.kind, name = %name, "Applied object");
        Ok(())
    }
}

#[async_trait]
impl Platform for KubernetesPlatform {
    async fn apply(&self, defs: Vec<ServiceDefinition>) -> Result<(), ApplyError> {
        self.client
            .apiserver_version()
            .await
            .context("Kubernetes API server is unreachable")?;

        let (async_defs, sync_defs): (Vec<_>, Vec<_>) =
            defs.into_iter().partition(|def| def.is_async);

        let mut failures = BTreeMap::new();
        for def in &sync_defs {
            match self.apply_definition(def).await {
                Ok(()) => info!(service_id = %def.service_id, "Applied service definition"),
                Err(e) => {
                    let cause = format!("{:#}", e);
                    warn!(service_id = %def.service_id, error = %cause, "Service definition failed to apply");
                    failures.insert(def.service_id.clone(), cause);
                }
            }
        }

        // Applied to completion, but never reported: the process applying
        // them may be replaced as a result.
        for def in &async_defs {
            if let Err(e) = self.apply_definition(def).await {
                let cause = format!("{:#}", e);
                warn!(service_id = %def.service_id, error = %cause, "Async apply failed");
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ApplyError::PerService(failures))
        }
    }
}
