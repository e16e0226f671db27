use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name of the ProviderConfig used when a managed resource doesn't reference one.
pub const DEFAULT_PROVIDER_CONFIG: &str = "default";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ProviderConfigReference {
    pub name: String,
}

/// What happens to the ZPA object when its managed resource is deleted.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema)]
pub enum DeletionPolicy {
    #[default]
    Delete,
    Orphan,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ConditionType {
    Ready,
    Synced,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: ConditionType,
    pub status: ConditionStatus,
    pub reason: String,
    pub last_transition_time: Time,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    fn new(type_: ConditionType, status: ConditionStatus, reason: &str) -> Self {
        Condition {
            type_,
            status,
            reason: reason.to_string(),
            last_transition_time: Time(Utc::now()),
            message: None,
        }
    }

    /// The external resource exists and is usable.
    pub fn available() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::True, "Available")
    }

    pub fn creating() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, "Creating")
    }

    pub fn deleting() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, "Deleting")
    }

    pub fn reconcile_success() -> Self {
        Self::new(ConditionType::Synced, ConditionStatus::True, "ReconcileSuccess")
    }

    pub fn reconcile_error(message: impl Into<String>) -> Self {
        Condition {
            message: Some(message.into()),
            ..Self::new(ConditionType::Synced, ConditionStatus::False, "ReconcileError")
        }
    }

    // equal ignoring transition time
    fn same_as(&self, other: &Condition) -> bool {
        self.type_ == other.type_
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Sets `c` in `conditions`, replacing any condition of the same type.
/// A condition identical apart from its timestamp is left untouched.
pub fn set_condition(conditions: &mut Vec<Condition>, c: Condition) {
    match conditions.iter_mut().find(|x| x.type_ == c.type_) {
        Some(existing) if existing.same_as(&c) => {}
        Some(existing) => *existing = c,
        None => conditions.push(c),
    }
}

pub fn get_condition(conditions: &[Condition], type_: ConditionType) -> Option<&Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}
