//! ApplicationSegment external client against a mocked ZPA API.

use provider_zpa::apis::application_segment::{
    ApplicationSegment, ApplicationSegmentParameters, ApplicationSegmentSpec,
};
use provider_zpa::apis::common::{get_condition, ConditionStatus, ConditionType};
use provider_zpa::clients::{Client, Config};
use provider_zpa::controller::application_segment::External;
use provider_zpa::errors::ErrorKind;
use provider_zpa::managed::{external_name, set_external_name, ExternalClient, Managed};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{any, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APP_PATH: &str = "/mgmtconfig/v1/admin/customers/c1/application";

fn segment(params: ApplicationSegmentParameters) -> ApplicationSegment {
    ApplicationSegment::new(
        "web",
        ApplicationSegmentSpec {
            for_provider: params,
            provider_config_ref: None,
            deletion_policy: Default::default(),
        },
    )
}

fn params() -> ApplicationSegmentParameters {
    ApplicationSegmentParameters {
        customer_id: "c1".into(),
        domain_names: Some(vec!["a.com".into()]),
        ..Default::default()
    }
}

fn external(server: &MockServer, cancel: CancellationToken) -> External {
    let cfg = Config {
        host: server.uri(),
        client_id: "id".into(),
        client_secret: "secret".into(),
    };
    External::new(Client::new(cfg, cancel).unwrap())
}

async fn mock_signin(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "t0k3n",
            "expires_in": "3600"
        })))
        .mount(server)
        .await;
}

fn echoed(enabled: bool) -> Value {
    json!({
        "id": "app-123",
        "name": "web",
        "domainNames": ["a.com"],
        "enabled": enabled,
        "doubleEncrypt": false,
        "ipAnchored": false,
        "isCnameEnabled": false,
        "passiveHealthEnabled": false,
        "creationTime": "1623456789",
        "modifiedBy": "admin",
        "modifiedTime": "1623456790"
    })
}

#[tokio::test]
async fn observe_without_external_name_makes_no_calls() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut cr = segment(params());
    let obs = external(&server, CancellationToken::new())
        .observe(&mut cr)
        .await
        .unwrap();

    assert!(!obs.resource_exists);
    assert!(!obs.resource_up_to_date);
    assert!(cr.status.is_none());
}

#[tokio::test]
async fn create_then_observe() {
    let server = MockServer::start().await;
    mock_signin(&server).await;
    Mock::given(method("POST"))
        .and(path(APP_PATH))
        .and(header("authorization", "Bearer t0k3n"))
        .and(body_partial_json(json!({
            "name": "web",
            "domainNames": ["a.com"],
            "enabled": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "app-123"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/app-123", APP_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(echoed(false)))
        .mount(&server)
        .await;

    let ext = external(&server, CancellationToken::new());
    let mut cr = segment(params());

    let obs = ext.observe(&mut cr).await.unwrap();
    assert!(!obs.resource_exists);

    let creation = ext.create(&mut cr).await.unwrap();
    assert!(creation.external_name_assigned);
    assert_eq!(external_name(&cr), Some("app-123"));

    let obs = ext.observe(&mut cr).await.unwrap();
    assert!(obs.resource_exists);
    assert!(obs.resource_up_to_date);

    let at_provider = &cr.status.as_ref().unwrap().at_provider;
    assert_eq!(at_provider.id.as_deref(), Some("app-123"));
    assert_eq!(at_provider.modified_by.as_deref(), Some("admin"));

    let ready = get_condition(cr.conditions(), ConditionType::Ready).unwrap();
    assert_eq!(ready.status, ConditionStatus::True);
    assert_eq!(ready.reason, "Available");
}

#[tokio::test]
async fn late_initialization_is_reported_once() {
    let server = MockServer::start().await;
    mock_signin(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/app-123", APP_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(echoed(true)))
        .mount(&server)
        .await;

    let ext = external(&server, CancellationToken::new());
    let mut cr = segment(params());
    set_external_name(&mut cr, "app-123");

    let obs = ext.observe(&mut cr).await.unwrap();
    assert!(obs.resource_late_initialized);
    assert_eq!(cr.spec.for_provider.enabled, Some(true));
    assert!(obs.resource_up_to_date);

    let obs = ext.observe(&mut cr).await.unwrap();
    assert!(!obs.resource_late_initialized);
    assert_eq!(cr.spec.for_provider.enabled, Some(true));
}

#[tokio::test]
async fn user_set_flag_is_kept_and_reported_as_drift() {
    let server = MockServer::start().await;
    mock_signin(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/app-123", APP_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(echoed(true)))
        .mount(&server)
        .await;

    let ext = external(&server, CancellationToken::new());
    let mut cr = segment(ApplicationSegmentParameters {
        enabled: Some(false),
        ..params()
    });
    set_external_name(&mut cr, "app-123");

    let obs = ext.observe(&mut cr).await.unwrap();
    assert!(obs.resource_exists);
    assert!(!obs.resource_up_to_date);
    assert_eq!(cr.spec.for_provider.enabled, Some(false));
}

#[tokio::test]
async fn observe_treats_not_found_as_absent() {
    let server = MockServer::start().await;
    mock_signin(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/app-123", APP_PATH)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"id": "resource.not.found"})))
        .mount(&server)
        .await;

    let mut cr = segment(params());
    set_external_name(&mut cr, "app-123");

    let obs = external(&server, CancellationToken::new())
        .observe(&mut cr)
        .await
        .unwrap();
    assert!(!obs.resource_exists);
}

#[tokio::test]
async fn observe_wraps_other_errors() {
    let server = MockServer::start().await;
    mock_signin(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/app-123", APP_PATH)))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut cr = segment(params());
    set_external_name(&mut cr, "app-123");

    let err = external(&server, CancellationToken::new())
        .observe(&mut cr)
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::DescribeFailed("ApplicationSegment")));
    assert!(err.iter().any(|e| e.to_string().contains("boom")));
}

#[tokio::test]
async fn failed_create_assigns_no_external_name() {
    let server = MockServer::start().await;
    mock_signin(&server).await;
    Mock::given(method("POST"))
        .and(path(APP_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid domain"))
        .mount(&server)
        .await;

    let mut cr = segment(params());
    let err = external(&server, CancellationToken::new())
        .create(&mut cr)
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), ErrorKind::CreateFailed(_)));
    assert_eq!(external_name(&cr), None);
}

#[tokio::test]
async fn update_puts_full_object() {
    let server = MockServer::start().await;
    mock_signin(&server).await;
    Mock::given(method("PUT"))
        .and(path("/mgmtconfig/v2/admin/customers/c1/application/app-123"))
        .and(body_partial_json(json!({
            "name": "web",
            "domainNames": ["a.com"],
            "description": "public site",
            "passiveHealthEnabled": false
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut cr = segment(ApplicationSegmentParameters {
        description: Some("public site".into()),
        ..params()
    });
    set_external_name(&mut cr, "app-123");

    external(&server, CancellationToken::new())
        .update(&mut cr)
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_forces_removal() {
    let server = MockServer::start().await;
    mock_signin(&server).await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/app-123", APP_PATH)))
        .and(query_param("forceDelete", "true"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut cr = segment(params());
    set_external_name(&mut cr, "app-123");

    external(&server, CancellationToken::new())
        .delete(&mut cr)
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_does_not_suppress_not_found() {
    let server = MockServer::start().await;
    mock_signin(&server).await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/app-123", APP_PATH)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut cr = segment(params());
    set_external_name(&mut cr, "app-123");

    let err = external(&server, CancellationToken::new())
        .delete(&mut cr)
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::DeleteFailed(_)));
}

#[tokio::test]
async fn delete_without_external_name_makes_no_calls() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut cr = segment(params());
    let err = external(&server, CancellationToken::new())
        .delete(&mut cr)
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MissingExternalName(_)));
}

#[tokio::test]
async fn cancelled_requests_fail() {
    let server = MockServer::start().await;
    mock_signin(&server).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut cr = segment(params());
    set_external_name(&mut cr, "app-123");

    let err = external(&server, cancel)
        .observe(&mut cr)
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::DescribeFailed(_)));
    assert!(err.iter().any(|e| e.to_string() == "request cancelled"));
}

#[tokio::test]
async fn cancelling_aborts_a_pending_request() {
    let server = MockServer::start().await;
    mock_signin(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/app-123", APP_PATH)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(echoed(true))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let ext = external(&server, cancel.clone());
    let mut cr = segment(params());
    set_external_name(&mut cr, "app-123");

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let err = ext.observe(&mut cr).await.unwrap_err();
    trigger.await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(matches!(err.kind(), ErrorKind::DescribeFailed(_)));
    assert!(err.iter().any(|e| e.to_string() == "request cancelled"));
    assert!(cr.status.is_none());
}
