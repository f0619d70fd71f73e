#![cfg(feature = "server")]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use stratus_domain::config::ApiConfig;
use stratus_domain::constants::{ADMIN_ROLE, settings};
use stratus_kernel::server::ApiState;
use stratus_kernel::server::extract::USER_ID_HEADER;
use stratus_licensing::{LicenseRecord, StaticLicenseSource, router};
use stratus_settings::SettingsStore;
use tower::ServiceExt;

const URI: &str = "/api/v1/cloud.getUpgradeTabParams";

fn app(store: SettingsStore, licenses: Vec<LicenseRecord>) -> Router {
    let mut config = ApiConfig::default();
    config.security.users.insert("root".to_owned(), vec![ADMIN_ROLE.to_owned()]);
    config.security.users.insert("viewer".to_owned(), vec![]);

    let state = ApiState::builder()
        .config(config)
        .settings(store.clone())
        .register_slice(stratus_licensing::init(store, Arc::new(StaticLicenseSource::new(licenses))))
        .build()
        .expect("state builds");

    let (routes, _) = router().split_for_parts();
    routes.with_state(state)
}

async fn get(app: Router, user: &str) -> (StatusCode, Value) {
    let request =
        Request::builder().uri(URI).header(USER_ID_HEADER, user).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn gold_non_trial_license_has_no_tab() {
    let store = SettingsStore::in_memory();
    store.set(settings::REGISTER_SERVER, true).await.unwrap();
    let gold = LicenseRecord::new(true, "2027-01-01T00:00:00Z".parse().unwrap())
        .with_tag("gold")
        .with_trial(Some(false));

    let (status, body) = get(app(store, vec![gold]), "root").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "tabType": false }));
}

#[tokio::test]
async fn empty_unregistered_workspace_goes_fully_featured() {
    let (status, body) = get(app(SettingsStore::in_memory(), Vec::new()), "root").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "tabType": "go-fully-featured" }));
}

#[tokio::test]
async fn trial_reports_its_end_date() {
    let store = SettingsStore::in_memory();
    let trial = LicenseRecord::new(true, "2026-12-24T08:00:00Z".parse().unwrap())
        .with_tag("gold")
        .with_trial(Some(true));

    let (_, body) = get(app(store, vec![trial]), "root").await;

    assert_eq!(
        body,
        json!({ "success": true, "tabType": "trial-gold", "trialEndDate": "2026-12-24" })
    );
}

#[tokio::test]
async fn trial_history_is_read_from_settings() {
    let store = SettingsStore::in_memory();
    store.set(settings::HAD_TRIAL, true).await.unwrap();

    let (_, body) = get(app(store, Vec::new()), "root").await;

    assert_eq!(body["tabType"], "upgrade-your-plan");
}

#[tokio::test]
async fn non_admins_are_refused() {
    let (status, body) = get(app(SettingsStore::in_memory(), Vec::new()), "viewer").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "success": false, "error": "unauthorized" }));
}
