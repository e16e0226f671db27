//! The contract between the reconcile loop and a per-kind ZPA adapter.
//!
//! A managed resource is any cluster-scoped custom resource that implements
//! [`Managed`]. The loop in [`crate::manager`] connects to ZPA through an
//! [`ExternalConnector`] and then drives the returned [`ExternalClient`]
//! through Observe, Create, Update and Delete.

use crate::apis::common::{self, Condition, DeletionPolicy, ProviderConfigReference};
use crate::errors::*;
use async_trait::async_trait;
use k8s_openapi::ClusterResourceScope;
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

/// Annotation holding the id ZPA assigned to the object.
pub const ANNOTATION_EXTERNAL_NAME: &str = "crossplane.io/external-name";

pub trait Managed:
    Resource<DynamicType = (), Scope = ClusterResourceScope>
    + Clone
    + Serialize
    + DeserializeOwned
    + Debug
    + Send
    + Sync
    + 'static
{
    fn provider_config_ref(&self) -> Option<&ProviderConfigReference>;

    fn deletion_policy(&self) -> DeletionPolicy;

    fn conditions(&self) -> &[Condition];

    fn conditions_mut(&mut self) -> &mut Vec<Condition>;

    fn set_conditions(&mut self, conditions: impl IntoIterator<Item = Condition>) {
        let current = self.conditions_mut();
        for c in conditions {
            common::set_condition(current, c);
        }
    }
}

/// Returns the external name of `obj`, treating an empty annotation as absent.
pub fn external_name<K: Resource>(obj: &K) -> Option<&str> {
    obj.meta()
        .annotations
        .as_ref()
        .and_then(|a| a.get(ANNOTATION_EXTERNAL_NAME))
        .map(String::as_str)
        .filter(|id| !id.is_empty())
}

pub fn set_external_name<K: Resource>(obj: &mut K, name: impl Into<String>) {
    obj.meta_mut()
        .annotations
        .get_or_insert_with(Default::default)
        .insert(ANNOTATION_EXTERNAL_NAME.to_string(), name.into());
}

/// Result of an Observe call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExternalObservation {
    /// The object exists in ZPA. When false the loop calls Create.
    pub resource_exists: bool,
    /// Desired and observed state agree. When false the loop calls Update.
    pub resource_up_to_date: bool,
    /// Observe filled unset spec fields, the spec must be written back.
    pub resource_late_initialized: bool,
}

impl ExternalObservation {
    pub fn absent() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExternalCreation {
    pub external_name_assigned: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExternalUpdate {}

/// Produces an [`ExternalClient`] bound to the credentials a resource points at.
#[async_trait]
pub trait ExternalConnector<K: Managed>: Send + Sync + 'static {
    type External: ExternalClient<K>;

    async fn connect(&self, cr: &K, cancel: CancellationToken) -> Result<Self::External>;
}

#[async_trait]
pub trait ExternalClient<K: Managed>: Send + Sync {
    async fn observe(&self, cr: &mut K) -> Result<ExternalObservation>;

    async fn create(&self, cr: &mut K) -> Result<ExternalCreation>;

    async fn update(&self, cr: &mut K) -> Result<ExternalUpdate>;

    async fn delete(&self, cr: &mut K) -> Result<()>;
}
