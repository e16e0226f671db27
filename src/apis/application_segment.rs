use crate::apis::common::{Condition, DeletionPolicy, ProviderConfigReference};
use crate::managed::Managed;
use kube_derive::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, PartialEq, JsonSchema)]
#[kube(
    group = "applicationsegment.zpa.crossplane.io",
    version = "v1alpha1",
    kind = "ApplicationSegment",
    status = "ApplicationSegmentStatus",
    shortname = "appseg",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"ID","type":"string","jsonPath":".metadata.annotations.crossplane\\.io/external-name"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSegmentSpec {
    pub for_provider: ApplicationSegmentParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// ApplicationSegmentParameters are the configurable fields of an application segment.
/// Unset optional fields are late-initialized from ZPA where the API picks a default.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSegmentParameters {
    /// customerId scopes every request to a ZPA tenant.
    pub customer_id: String,

    /// bypassType is one of ALWAYS, NEVER, ON_NET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_space: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_idle_timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_age: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// domainNames are compared as a set, order is irrelevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_names: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_encrypt: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_reporting: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icmp_access_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_anchored: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cname_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive_health_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_group_id: Option<String>,

    /// tcpPortRanges are start/end pairs flattened, e.g. ["443", "443", "8000", "8080"].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_port_ranges: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp_port_ranges: Option<Vec<String>>,
}

/// ApplicationSegmentObservation holds the fields ZPA owns.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSegmentObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSegmentStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub at_provider: ApplicationSegmentObservation,
}

impl Managed for ApplicationSegment {
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
