use super::bool_value;
use crate::apis::application_segment::{
    ApplicationSegment, ApplicationSegmentObservation, ApplicationSegmentParameters,
};
use crate::apis::common::Condition;
use crate::clients::config::get_config;
use crate::clients::models::ApplicationResource;
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

pub const KIND: &str = "ApplicationSegment";

macro_rules! field {
    ($name:literal, $field:ident) => {
        field!($name, $field, |o: &ApplicationResource| o.$field.clone())
    };
    ($name:literal, $field:ident, $observed:expr) => {
        Field::new(
            $name,
            |p: &ApplicationSegmentParameters| &p.$field,
            |p: &mut ApplicationSegmentParameters| &mut p.$field,
            $observed,
        )
    };
}

/// Modifiable fields of an application segment. segmentGroupId is sent but
/// never compared.
fn fields() -> Vec<Field<ApplicationSegmentParameters, ApplicationResource>> {
    vec![
        field!("bypassType", bypass_type).late_initialized(),
        field!("configSpace", config_space).late_initialized(),
        field!("defaultIdleTimeout", default_idle_timeout),
        field!("defaultMaxAge", default_max_age),
        field!("description", description),
        field!("doubleEncrypt", double_encrypt, |o: &ApplicationResource| {
            Some(o.double_encrypt)
        })
        .late_initialized(),
        field!("enabled", enabled, |o: &ApplicationResource| Some(o.enabled)).late_initialized(),
        field!("healthCheckType", health_check_type).late_initialized(),
        field!("healthReporting", health_reporting).late_initialized(),
        field!("ipAnchored", ip_anchored, |o: &ApplicationResource| Some(o.ip_anchored))
            .late_initialized(),
        field!("icmpAccessType", icmp_access_type).late_initialized(),
        field!("isCnameEnabled", is_cname_enabled, |o: &ApplicationResource| {
            Some(o.is_cname_enabled)
        })
        .late_initialized(),
        field!(
            "passiveHealthEnabled",
            passive_health_enabled,
            |o: &ApplicationResource| Some(o.passive_health_enabled)
        )
        .late_initialized(),
        field!("domainNames", domain_names),
        field!("tcpPortRanges", tcp_port_ranges),
        field!("udpPortRanges", udp_port_ranges),
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
impl ExternalConnector<ApplicationSegment> for Connector {
    type External = External;

    async fn connect(&self, cr: &ApplicationSegment, cancel: CancellationToken) -> Result<External> {
        let cfg = get_config(&self.kube, cr.provider_config_ref()).await?;
        Ok(External::new(Client::new(cfg, cancel)?))
    }
}

pub struct External {
    client: Client,
    fields: Vec<Field<ApplicationSegmentParameters, ApplicationResource>>,
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
impl ExternalClient<ApplicationSegment> for External {
    async fn observe(&self, cr: &mut ApplicationSegment) -> Result<ExternalObservation> {
        let id = match external_name(cr) {
            Some(id) => id.to_string(),
            None => return Ok(ExternalObservation::absent()),
        };

        let resp = match self
            .client
            .get_application(&cr.spec.for_provider.customer_id, &id)
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

    async fn create(&self, cr: &mut ApplicationSegment) -> Result<ExternalCreation> {
        let app = generate_application(&cr.name_any(), &cr.spec.for_provider);
        let resp = self
            .client
            .add_application(&cr.spec.for_provider.customer_id, &app)
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

    async fn update(&self, cr: &mut ApplicationSegment) -> Result<ExternalUpdate> {
        let id = external_name(cr).ok_or(ErrorKind::MissingExternalName(KIND))?;
        let app = generate_application(&cr.name_any(), &cr.spec.for_provider);
        self.client
            .update_application(&cr.spec.for_provider.customer_id, id, &app)
            .await
            .chain_err(|| ErrorKind::UpdateFailed(KIND))?;
        Ok(ExternalUpdate {})
    }

    async fn delete(&self, cr: &mut ApplicationSegment) -> Result<()> {
        let id = external_name(cr).ok_or(ErrorKind::MissingExternalName(KIND))?;
        self.client
            .delete_application(&cr.spec.for_provider.customer_id, id, Some(true))
            .await
            .chain_err(|| ErrorKind::DeleteFailed(KIND))
    }
}

/// Builds the complete object ZPA expects on both create and update.
pub fn generate_application(name: &str, p: &ApplicationSegmentParameters) -> ApplicationResource {
    ApplicationResource {
        id: None,
        name: name.to_string(),
        bypass_type: p.bypass_type.clone(),
        config_space: p.config_space.clone(),
        default_idle_timeout: p.default_idle_timeout.clone(),
        default_max_age: p.default_max_age.clone(),
        description: p.description.clone(),
        domain_names: p.domain_names.clone(),
        double_encrypt: bool_value(p.double_encrypt),
        enabled: bool_value(p.enabled),
        health_check_type: p.health_check_type.clone(),
        health_reporting: p.health_reporting.clone(),
        icmp_access_type: p.icmp_access_type.clone(),
        ip_anchored: bool_value(p.ip_anchored),
        is_cname_enabled: bool_value(p.is_cname_enabled),
        passive_health_enabled: bool_value(p.passive_health_enabled),
        segment_group_id: p.segment_group_id.clone(),
        tcp_port_ranges: p.tcp_port_ranges.clone(),
        udp_port_ranges: p.udp_port_ranges.clone(),
        creation_time: None,
        modified_by: None,
        modified_time: None,
    }
}

pub fn generate_observation(obj: &ApplicationResource) -> ApplicationSegmentObservation {
    ApplicationSegmentObservation {
        creation_time: obj.creation_time.clone(),
        id: obj.id.clone(),
        modified_by: obj.modified_by.clone(),
        modified_time: obj.modified_time.clone(),
    }
}
