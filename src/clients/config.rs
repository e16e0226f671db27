use crate::apis::common::{ProviderConfigReference, DEFAULT_PROVIDER_CONFIG};
use crate::apis::provider_config::{CredentialsSource, ProviderConfig};
use crate::clients::zpa::Config;
use crate::errors::*;
use k8s_openapi::api::core::v1::Secret;
use kube::Api;
use log::debug;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credentials {
    client_id: String,
    client_secret: String,
}

/// Resolves the ZPA transport configuration a managed resource points at.
pub async fn get_config(
    kube: &kube::Client,
    pc_ref: Option<&ProviderConfigReference>,
) -> Result<Config> {
    let name = pc_ref
        .map(|r| r.name.as_str())
        .unwrap_or(DEFAULT_PROVIDER_CONFIG);
    debug!("resolving ProviderConfig {}", name);

    let pcs: Api<ProviderConfig> = Api::all(kube.clone());
    let pc = pcs
        .get_opt(name)
        .await
        .chain_err(|| ErrorKind::Configuration(format!("cannot get ProviderConfig {}", name)))?
        .ok_or_else(|| ErrorKind::Configuration(format!("ProviderConfig {} not found", name)))?;

    let creds = &pc.spec.credentials;
    if creds.source != CredentialsSource::Secret {
        bail!(ErrorKind::Configuration(format!(
            "credentials source {:?} is not supported",
            creds.source
        )));
    }
    let sel = creds.secret_ref.as_ref().ok_or_else(|| {
        ErrorKind::Configuration(format!("ProviderConfig {} has no secretRef", name))
    })?;

    let secrets: Api<Secret> = Api::namespaced(kube.clone(), &sel.namespace);
    let secret = secrets
        .get_opt(&sel.name)
        .await
        .chain_err(|| {
            ErrorKind::Configuration(format!(
                "cannot get secret {}/{}",
                sel.namespace, sel.name
            ))
        })?
        .ok_or_else(|| {
            ErrorKind::Configuration(format!(
                "secret {}/{} not found",
                sel.namespace, sel.name
            ))
        })?;

    let (client_id, client_secret) = credentials_from_secret(&secret, &sel.key)?;
    Ok(Config {
        host: pc.spec.host().to_string(),
        client_id,
        client_secret,
    })
}

/// Extracts `(client_id, client_secret)` from the JSON document stored under `key`.
pub fn credentials_from_secret(secret: &Secret, key: &str) -> Result<(String, String)> {
    let raw = secret
        .data
        .as_ref()
        .and_then(|d| d.get(key))
        .ok_or_else(|| ErrorKind::Configuration(format!("secret has no key {}", key)))?;
    let creds: Credentials = serde_json::from_slice(&raw.0).chain_err(|| {
        ErrorKind::Configuration(format!("secret key {} is not valid credentials JSON", key))
    })?;
    if creds.client_id.is_empty() || creds.client_secret.is_empty() {
        bail!(ErrorKind::Configuration(format!(
            "secret key {} has empty credentials",
            key
        )));
    }
    Ok((creds.client_id, creds.client_secret))
}
