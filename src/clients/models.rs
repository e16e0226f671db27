//! Payloads exchanged with the ZPA management API.

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    // create responses carry only the id
    #[serde(default)]
    pub name: String,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_names: Option<Vec<String>>,
    #[serde(default)]
    pub double_encrypt: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_reporting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icmp_access_type: Option<String>,
    #[serde(default)]
    pub ip_anchored: bool,
    #[serde(default)]
    pub is_cname_enabled: bool,
    #[serde(default)]
    pub passive_health_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_port_ranges: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp_port_ranges: Option<Vec<String>>,

    // read-only, set by ZPA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentGroupResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    // create responses carry only the id
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_space: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_keep_alive_enabled: Option<String>,

    // read-only, set by ZPA
    #[serde(default, skip_serializing)]
    pub policy_migrated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

/// Response to `POST /signin`.
#[derive(Deserialize, Clone, Debug)]
pub(crate) struct SigninResponse {
    pub access_token: String,
}
