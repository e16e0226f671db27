//! Kubernetes Events emitted on managed resources.
//!
//! Publishing is fire-and-forget: a failed event is logged and never fails
//! the reconcile.

use crate::errors::*;
use k8s_openapi::api::core::v1::ObjectReference;
use kube_runtime::events::{Event, EventType, Recorder, Reporter};
use kube::Client;
use log::warn;

/// Values for the REASON column of `kubectl get events`.
pub mod reasons {
    pub const CREATED: &str = "CreatedExternalResource";
    pub const UPDATED: &str = "UpdatedExternalResource";
    pub const DELETED: &str = "DeletedExternalResource";

    pub const CANNOT_CONNECT: &str = "CannotConnectToProvider";
    pub const CANNOT_OBSERVE: &str = "CannotObserveExternalResource";
    pub const CANNOT_CREATE: &str = "CannotCreateExternalResource";
    pub const CANNOT_UPDATE: &str = "CannotUpdateExternalResource";
    pub const CANNOT_DELETE: &str = "CannotDeleteExternalResource";
    pub const RECONCILE_ERROR: &str = "ReconcileError";
}

/// Values for the ACTION column.
pub mod actions {
    pub const RECONCILE: &str = "Reconcile";
    pub const CREATE: &str = "Create";
    pub const UPDATE: &str = "Update";
    pub const DELETE: &str = "Delete";
}

/// Picks the Warning reason for a failed reconcile from the outermost error.
pub fn warning_reason(e: &Error) -> &'static str {
    match e.kind() {
        ErrorKind::Configuration(_) => reasons::CANNOT_CONNECT,
        ErrorKind::DescribeFailed(_) => reasons::CANNOT_OBSERVE,
        ErrorKind::CreateFailed(_) => reasons::CANNOT_CREATE,
        ErrorKind::UpdateFailed(_) => reasons::CANNOT_UPDATE,
        ErrorKind::DeleteFailed(_) => reasons::CANNOT_DELETE,
        _ => reasons::RECONCILE_ERROR,
    }
}

pub struct Events {
    recorder: Recorder,
}

impl Events {
    /// `controller` shows up as the reporting component of every event.
    pub fn new(client: Client, controller: &str) -> Self {
        let reporter = Reporter {
            controller: controller.to_string(),
            instance: std::env::var("POD_NAME").ok(),
        };
        Events {
            recorder: Recorder::new(client, reporter),
        }
    }

    pub async fn normal(
        &self,
        reference: &ObjectReference,
        reason: &str,
        action: &str,
        note: String,
    ) {
        self.publish(reference, EventType::Normal, reason, action, note)
            .await
    }

    pub async fn warning(
        &self,
        reference: &ObjectReference,
        reason: &str,
        action: &str,
        note: String,
    ) {
        self.publish(reference, EventType::Warning, reason, action, note)
            .await
    }

    async fn publish(
        &self,
        reference: &ObjectReference,
        type_: EventType,
        reason: &str,
        action: &str,
        note: String,
    ) {
        let event = Event {
            type_,
            reason: reason.to_string(),
            note: Some(note),
            action: action.to_string(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&event, reference).await {
            warn!("cannot publish {} event: {}", reason, e);
        }
    }
}
