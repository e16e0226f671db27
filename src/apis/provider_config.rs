use kube_derive::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "https://config.private.zscaler.com";

/// ProviderConfig tells the controllers where ZPA lives and how to sign in.
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, PartialEq, JsonSchema)]
#[kube(
    group = "zpa.crossplane.io",
    version = "v1alpha1",
    kind = "ProviderConfig",
    shortname = "zpapc"
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigSpec {
    /// host of the ZPA management API, defaults to the public cloud.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub credentials: ProviderCredentials,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentials {
    pub source: CredentialsSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretKeySelector>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum CredentialsSource {
    Secret,
    None,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct SecretKeySelector {
    pub namespace: String,
    pub name: String,
    pub key: String,
}

impl ProviderConfigSpec {
    pub fn host(&self) -> &str {
        self.host
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_HOST)
    }
}
