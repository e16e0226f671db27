use crate::apis::common::{Condition, DeletionPolicy};
use crate::errors::*;
use crate::events::{actions, reasons, warning_reason, Events};
use crate::managed::{
    external_name, ExternalClient, ExternalConnector, Managed, ANNOTATION_EXTERNAL_NAME,
};
use futures::{future::BoxFuture, FutureExt, StreamExt};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{
    api::{Api, Patch, PatchParams},
    client::Client,
    ResourceExt,
};
use kube_runtime::controller::{Action, Controller};
use kube_runtime::watcher;
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const FINALIZER: &str = "finalizer.managedresource.crossplane.io";

#[derive(Clone, Debug)]
pub struct Settings {
    /// How long to wait before observing a healthy resource again.
    pub poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            poll_interval: Duration::from_secs(60),
        }
    }
}

// Context for our reconciler
struct Data<C> {
    /// kubernetes client
    client: Client,
    connector: C,
    settings: Settings,
    shutdown: CancellationToken,
    events: Events,
}

/// Flattens an error chain into one line, e.g. "cannot create SegmentGroup: ZPA API request failed ...".
fn describe(e: &Error) -> String {
    e.iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

fn section<K: Serialize>(cr: &K, key: &str) -> Result<Value> {
    let mut value = serde_json::to_value(cr)?;
    Ok(value[key].take())
}

async fn patch_status<K: Managed>(api: &Api<K>, cr: &K) -> Result<()> {
    let patch = json!({ "status": section(cr, "status")? });
    api.patch_status(&cr.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

async fn patch_spec<K: Managed>(api: &Api<K>, cr: &K) -> Result<()> {
    let patch = json!({ "spec": section(cr, "spec")? });
    api.patch(&cr.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

// The external name is written on its own, right after Create, so a failure
// later in the reconcile can't lose it.
async fn patch_external_name<K: Managed>(api: &Api<K>, cr: &K) -> Result<()> {
    let id = external_name(cr).ok_or(ErrorKind::MissingObjectKey(ANNOTATION_EXTERNAL_NAME))?;
    let patch = json!({ "metadata": { "annotations": { ANNOTATION_EXTERNAL_NAME: id } } });
    api.patch(&cr.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

async fn patch_finalizers<K: Managed>(api: &Api<K>, cr: &K, finalizers: Vec<String>) -> Result<()> {
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&cr.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

async fn add_finalizer<K: Managed>(api: &Api<K>, cr: &K) -> Result<()> {
    if cr.finalizers().iter().any(|f| f == FINALIZER) {
        return Ok(());
    }
    let mut finalizers = cr.finalizers().to_vec();
    finalizers.push(FINALIZER.to_string());
    patch_finalizers(api, cr, finalizers).await
}

async fn remove_finalizer<K: Managed>(api: &Api<K>, cr: &K) -> Result<()> {
    let finalizers = cr
        .finalizers()
        .iter()
        .filter(|f| *f != FINALIZER)
        .cloned()
        .collect();
    patch_finalizers(api, cr, finalizers).await
}

async fn reconcile<K, C>(obj: Arc<K>, ctx: Arc<Data<C>>) -> Result<Action>
where
    K: Managed,
    C: ExternalConnector<K>,
{
    debug!("Reconcile {} {}", K::kind(&()), obj.name_any());
    let api: Api<K> = Api::all(ctx.client.clone());
    let mut cr = (*obj).clone();

    match reconcile_managed(&api, &mut cr, &ctx).await {
        Ok(action) => Ok(action),
        Err(e) => {
            ctx.events
                .warning(
                    &cr.object_ref(&()),
                    warning_reason(&e),
                    actions::RECONCILE,
                    describe(&e),
                )
                .await;
            cr.set_conditions([Condition::reconcile_error(describe(&e))]);
            if let Err(pe) = patch_status(&api, &cr).await {
                warn!("cannot record error on {}: {}", cr.name_any(), describe(&pe));
            }
            Err(e)
        }
    }
}

async fn reconcile_managed<K, C>(api: &Api<K>, cr: &mut K, ctx: &Data<C>) -> Result<Action>
where
    K: Managed,
    C: ExternalConnector<K>,
{
    let kind = K::kind(&());
    let name = cr.name_any();
    let external = ctx
        .connector
        .connect(cr, ctx.shutdown.child_token())
        .await?;

    if cr.meta().deletion_timestamp.is_some() {
        if !cr.finalizers().iter().any(|f| f == FINALIZER) {
            return Ok(Action::await_change());
        }
        let observation = external.observe(cr).await?;
        if observation.resource_exists && cr.deletion_policy() == DeletionPolicy::Delete {
            info!("deleting {} {}", kind, name);
            external.delete(cr).await?;
            ctx.events
                .normal(
                    &cr.object_ref(&()),
                    reasons::DELETED,
                    actions::DELETE,
                    format!("deleted external {} {}", kind, name),
                )
                .await;
            cr.set_conditions([Condition::deleting(), Condition::reconcile_success()]);
            patch_status(api, cr).await?;
            // keep the finalizer until Observe no longer finds the object
            return Ok(Action::requeue(Duration::from_secs(5)));
        }
        debug!("releasing {} {}", kind, name);
        remove_finalizer(api, cr).await?;
        return Ok(Action::await_change());
    }

    add_finalizer(api, cr).await?;

    let observation = external.observe(cr).await?;
    if !observation.resource_exists {
        info!("creating {} {}", kind, name);
        let creation = external.create(cr).await?;
        ctx.events
            .normal(
                &cr.object_ref(&()),
                reasons::CREATED,
                actions::CREATE,
                format!(
                    "created external {} {}",
                    kind,
                    external_name(cr).unwrap_or_default()
                ),
            )
            .await;
        if creation.external_name_assigned {
            patch_external_name(api, cr).await?;
        }
        cr.set_conditions([Condition::creating(), Condition::reconcile_success()]);
        patch_status(api, cr).await?;
        return Ok(Action::requeue(ctx.settings.poll_interval));
    }

    if observation.resource_late_initialized {
        debug!("late-initialized {} {}", kind, name);
        patch_spec(api, cr).await?;
    }

    if !observation.resource_up_to_date {
        info!("updating {} {}", kind, name);
        external.update(cr).await?;
        ctx.events
            .normal(
                &cr.object_ref(&()),
                reasons::UPDATED,
                actions::UPDATE,
                format!("updated external {} {}", kind, name),
            )
            .await;
    }

    cr.set_conditions([Condition::reconcile_success()]);
    patch_status(api, cr).await?;

    Ok(Action::requeue(ctx.settings.poll_interval))
}

fn error_policy<K, C>(obj: Arc<K>, error: &Error, _ctx: Arc<Data<C>>) -> Action
where
    K: Managed,
{
    warn!("reconcile of {} failed: {}", obj.name_any(), describe(error));
    Action::requeue(Duration::from_secs(60))
}

/// Owns a Controller for one managed kind.
pub struct Manager {
    shutdown: CancellationToken,
}

impl Manager {
    /// Lifecycle initialization interface for app
    ///
    /// This returns a `Manager` that drives a `Controller` + a future to be awaited
    /// It is up to `main` to wait for the controller stream.
    pub async fn new<K, C>(
        client: Client,
        connector: C,
        settings: Settings,
    ) -> Result<(Self, BoxFuture<'static, ()>)>
    where
        K: Managed,
        C: ExternalConnector<K>,
    {
        let crd_name = format!("{}.{}", K::plural(&()), K::group(&()));
        let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
        crds.get(&crd_name)
            .await
            .chain_err(|| format!("install {} crd first", crd_name))?;

        let shutdown = CancellationToken::new();
        let events = Events::new(client.clone(), &format!("managed/{}", K::group(&())));
        let context = Arc::new(Data {
            client: client.clone(),
            connector,
            settings,
            shutdown: shutdown.clone(),
            events,
        });

        let managed = Api::<K>::all(client);
        let drainer = Controller::new(managed, watcher::Config::default())
            .run(reconcile::<K, C>, error_policy::<K, C>, context)
            .for_each(|res| {
                match res {
                    Ok((o, _)) => debug!("Reconciled {:?}", o),
                    Err(e) => error!("reconcile failed: {}", e),
                }
                futures::future::ready(())
            })
            .boxed();
        // what we do with the controller stream from .run() ^^ does not matter
        // but we do need to consume it, hence general printing + return future

        Ok((Manager { shutdown }, drainer))
    }

    /// Aborts every in-flight ZPA request started by this manager.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
