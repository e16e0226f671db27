use crate::apis::common::{Condition, DeletionPolicy, ProviderConfigReference};
use crate::managed::Managed;
use kube_derive::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, PartialEq, JsonSchema)]
#[kube(
    group = "segmentgroup.zpa.crossplane.io",
    version = "v1alpha1",
    kind = "SegmentGroup",
    status = "SegmentGroupStatus",
    shortname = "sg",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"ID","type":"string","jsonPath":".metadata.annotations.crossplane\\.io/external-name"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SegmentGroupSpec {
    pub for_provider: SegmentGroupParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentGroupParameters {
    pub customer_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_space: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// enabled can be turned on through an update, but ZPA ignores
    /// an update that tries to turn a group off again.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// tcpKeepAliveEnabled is "0" or "1".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_keep_alive_enabled: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentGroupObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(default)]
    pub policy_migrated: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentGroupStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub at_provider: SegmentGroupObservation,
}

impl Managed for SegmentGroup {
    fn provider_config_ref(&self) -> Option<&ProviderConfigReference> {
        self.spec.provider_config_ref.as_ref()
    }

    fn deletion_policy(&self) -> DeletionPolicy {
        self.spec.deletion_policy
    }

    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.status.get_or_insert_with(Default::default).conditions
    }
}
