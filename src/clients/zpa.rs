//! Thin client for the parts of the ZPA management API the controllers use.

use crate::clients::models::{ApplicationResource, SegmentGroupResource, SigninResponse};
use crate::errors::*;
use log::trace;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

const MGMT_V1: &str = "/mgmtconfig/v1/admin/customers";
const MGMT_V2: &str = "/mgmtconfig/v2/admin/customers";

/// Transport configuration resolved from a ProviderConfig.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// A ZPA API client bound to one set of credentials.
///
/// Construction does no I/O. The bearer token is fetched on the first request
/// and reused for the lifetime of the client. Every request is abandoned as
/// soon as `cancel` fires.
pub struct Client {
    http: reqwest::Client,
    config: Config,
    token: OnceCell<String>,
    cancel: CancellationToken,
}

/// A 404 from ZPA. Only Observe treats this as "does not exist".
pub fn is_not_found(err: &Error) -> bool {
    matches!(err.kind(), ErrorKind::Api(404, _))
}

// An unreadable error body is reported as empty. Cancellation still wins.
fn error_body(read: Result<String>) -> Result<String> {
    match read {
        Err(e) if matches!(e.kind(), ErrorKind::Cancelled) => Err(e),
        read => Ok(read.unwrap_or_default()),
    }
}

impl Client {
    pub fn new(config: Config, cancel: CancellationToken) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Client {
            http,
            config,
            token: OnceCell::new(),
            cancel,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.host.trim_end_matches('/'), path)
    }

    async fn cancellable<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = reqwest::Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ErrorKind::Cancelled.into()),
            res = fut => Ok(res?),
        }
    }

    async fn execute(&self, req: RequestBuilder) -> Result<Response> {
        let resp = self.cancellable(req.send()).await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = error_body(self.cancellable(resp.text()).await)?;
        bail!(ErrorKind::Api(status.as_u16(), body))
    }

    async fn signin(&self) -> Result<String> {
        trace!("signing in to {}", self.config.host);
        let req = self.http.post(self.url("/signin")).form(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ]);
        let resp = self.execute(req).await?;
        let signin: SigninResponse = self.cancellable(resp.json()).await?;
        Ok(signin.access_token)
    }

    async fn token(&self) -> Result<&str> {
        let token = self.token.get_or_try_init(|| self.signin()).await?;
        Ok(token.as_str())
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token().await?;
        trace!("{} {}", method, path);
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.execute(self.request(Method::GET, path).await?).await?;
        self.cancellable(resp.json()).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let req = self.request(Method::POST, path).await?.json(body);
        let resp = self.execute(req).await?;
        self.cancellable(resp.json()).await
    }

    async fn put_json<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let req = self.request(Method::PUT, path).await?.json(body);
        self.execute(req).await.map(|_| ())
    }

    async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<()> {
        let req = self.request(Method::DELETE, path).await?.query(query);
        self.execute(req).await.map(|_| ())
    }

    pub async fn get_application(&self, customer_id: &str, id: &str) -> Result<ApplicationResource> {
        self.get_json(&format!("{}/{}/application/{}", MGMT_V1, customer_id, id))
            .await
    }

    pub async fn add_application(
        &self,
        customer_id: &str,
        app: &ApplicationResource,
    ) -> Result<ApplicationResource> {
        self.post_json(&format!("{}/{}/application", MGMT_V1, customer_id), app)
            .await
    }

    pub async fn update_application(
        &self,
        customer_id: &str,
        id: &str,
        app: &ApplicationResource,
    ) -> Result<()> {
        self.put_json(&format!("{}/{}/application/{}", MGMT_V2, customer_id, id), app)
            .await
    }

    pub async fn delete_application(
        &self,
        customer_id: &str,
        id: &str,
        force_delete: Option<bool>,
    ) -> Result<()> {
        let query: Vec<_> = force_delete
            .map(|f| ("forceDelete", f.to_string()))
            .into_iter()
            .collect();
        self.delete(
            &format!("{}/{}/application/{}", MGMT_V1, customer_id, id),
            &query,
        )
        .await
    }

    pub async fn get_segment_group(
        &self,
        customer_id: &str,
        id: &str,
    ) -> Result<SegmentGroupResource> {
        self.get_json(&format!("{}/{}/segmentGroup/{}", MGMT_V1, customer_id, id))
            .await
    }

    pub async fn add_segment_group(
        &self,
        customer_id: &str,
        group: &SegmentGroupResource,
    ) -> Result<SegmentGroupResource> {
        self.post_json(&format!("{}/{}/segmentGroup", MGMT_V1, customer_id), group)
            .await
    }

    pub async fn update_segment_group(
        &self,
        customer_id: &str,
        id: &str,
        group: &SegmentGroupResource,
    ) -> Result<()> {
        self.put_json(&format!("{}/{}/segmentGroup/{}", MGMT_V1, customer_id, id), group)
            .await
    }

    pub async fn delete_segment_group(&self, customer_id: &str, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}/segmentGroup/{}", MGMT_V1, customer_id, id), &[])
            .await
    }
}
