use super::bool_value;
use crate::apis::common::Condition;
use crate::apis::segment_group::{SegmentGroup, SegmentGroupObservation, SegmentGroupParameters};
use crate::clients::config::get_config;
use crate::clients::models::SegmentGroupResource;
use crate::clients::{is_not_found, Client};
use crate::diff::{is_up_to_date, late_initialize, Field};
use crate::errors::*;
use crate::managed::{
    external_name, set_external_name, ExternalClient, ExternalConnector, ExternalCreation,
    ExternalObservation, ExternalUpdate, Managed,
};
use async_trait::async_trait;
use kube::ResourceExt;
use log::debug;
use tokio_util::sync::CancellationToken;

pub const KIND: &str = "SegmentGroup";

macro_rules! field {
    ($name:literal, $field:ident) => {
        Field::new(
            $name,
            |p: &SegmentGroupParameters| &p.$field,
            |p: &mut SegmentGroupParameters| &mut p.$field,
            |o: &SegmentGroupResource| o.$field.clone(),
        )
    };
}

// enabled is not compared, ZPA cannot disable a group through update.
fn fields() -> Vec<Field<SegmentGroupParameters, SegmentGroupResource>> {
    vec![
        field!("description", description),
        field!("configSpace", config_space).late_initialized(),
        field!("tcpKeepAliveEnabled", tcp_keep_alive_enabled).late_initialized(),
    ]
}

pub struct Connector {
    kube: kube::Client,
}

impl Connector {
    pub fn new(kube: kube::Client) -> Self {
        Connector { kube }
    }
}

#[async_trait]
impl ExternalConnector<SegmentGroup> for Connector {
    type External = External;

    async fn connect(&self, cr: &SegmentGroup, cancel: CancellationToken) -> Result<External> {
        let cfg = get_config(&self.kube, cr.provider_config_ref()).await?;
        Ok(External::new(Client::new(cfg, cancel)?))
    }
}

pub struct External {
    client: Client,
    fields: Vec<Field<SegmentGroupParameters, SegmentGroupResource>>,
}

impl External {
    pub fn new(client: Client) -> Self {
        External {
            client,
            fields: fields(),
        }
    }
}

#[async_trait]
impl ExternalClient<SegmentGroup> for External {
    async fn observe(&self, cr: &mut SegmentGroup) -> Result<ExternalObservation> {
        let id = match external_name(cr) {
            Some(id) => id.to_string(),
            None => return Ok(ExternalObservation::absent()),
        };

        let resp = match self
            .client
            .get_segment_group(&cr.spec.for_provider.customer_id, &id)
            .await
        {
            Ok(resp) => resp,
            Err(e) if is_not_found(&e) => {
                debug!("{} {} is gone from ZPA", KIND, id);
                return Ok(ExternalObservation::absent());
            }
            Err(e) => return Err(Error::with_chain(e, ErrorKind::DescribeFailed(KIND))),
        };

        cr.status.get_or_insert_with(Default::default).at_provider = generate_observation(&resp);

        let current = cr.spec.for_provider.clone();
        late_initialize(&self.fields, &mut cr.spec.for_provider, &resp);

        cr.set_conditions([Condition::available()]);

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: is_up_to_date(&self.fields, &cr.spec.for_provider, &resp),
            resource_late_initialized: cr.spec.for_provider != current,
        })
    }

    async fn create(&self, cr: &mut SegmentGroup) -> Result<ExternalCreation> {
        let group = generate_segment_group(&cr.name_any(), None, &cr.spec.for_provider);
        let resp = self
            .client
            .add_segment_group(&cr.spec.for_provider.customer_id, &group)
            .await
            .chain_err(|| ErrorKind::CreateFailed(KIND))?;

        let id = resp
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::from(ErrorKind::MissingObjectKey("id")))
            .chain_err(|| ErrorKind::CreateFailed(KIND))?;
        set_external_name(cr, id);

        Ok(ExternalCreation {
            external_name_assigned: true,
        })
    }

    async fn update(&self, cr: &mut SegmentGroup) -> Result<ExternalUpdate> {
        let id = external_name(cr).ok_or(ErrorKind::MissingExternalName(KIND))?;
        let group = generate_segment_group(&cr.name_any(), Some(id), &cr.spec.for_provider);
        self.client
            .update_segment_group(&cr.spec.for_provider.customer_id, id, &group)
            .await
            .chain_err(|| ErrorKind::UpdateFailed(KIND))?;
        Ok(ExternalUpdate {})
    }

    async fn delete(&self, cr: &mut SegmentGroup) -> Result<()> {
        let id = external_name(cr).ok_or(ErrorKind::MissingExternalName(KIND))?;
        self.client
            .delete_segment_group(&cr.spec.for_provider.customer_id, id)
            .await
            .chain_err(|| ErrorKind::DeleteFailed(KIND))
    }
}

pub fn generate_segment_group(
    name: &str,
    id: Option<&str>,
    p: &SegmentGroupParameters,
) -> SegmentGroupResource {
    SegmentGroupResource {
        id: id.map(str::to_string),
        name: name.to_string(),
        config_space: p.config_space.clone(),
        description: p.description.clone(),
        // false is sent as asked, ZPA only honours it on create
        enabled: bool_value(p.enabled),
        tcp_keep_alive_enabled: p.tcp_keep_alive_enabled.clone(),
        ..Default::default()
    }
}

pub fn generate_observation(obj: &SegmentGroupResource) -> SegmentGroupObservation {
    SegmentGroupObservation {
        creation_time: obj.creation_time.clone(),
        id: obj.id.clone(),
        modified_by: obj.modified_by.clone(),
        modified_time: obj.modified_time.clone(),
        policy_migrated: obj.policy_migrated,
    }
}
