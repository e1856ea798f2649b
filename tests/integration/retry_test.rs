//! Integration tests for 401 handling, renewal before requests, and
//! connectivity failures.

mod helpers;

use std::sync::Arc;

use serde_json::{Value, json};

use hrms_auth::MemoryTokenStore;
use hrms_cache::QueryParams;
use hrms_client::HrmsClient;
use hrms_core::ErrorKind;
use hrms_core::events::{EventPayload, LogoutReason, Notice, SessionEvent};
use hrms_entity::{Role, Session};

use helpers::{TestApp, bearer, contains, dead_address, mint_token, occurrences, test_config};

const CLIENTS: &str = "GET /api/clients";
const RENEW: &str = "POST /api/renew-token";

async fn get_clients(app: &TestApp) -> hrms_core::AppResult<Value> {
    app.client
        .api()
        .get::<Value>("/api/clients", &QueryParams::new())
        .await
}

#[tokio::test]
async fn test_single_401_renews_and_retries_once() {
    let app = TestApp::spawn().await;
    let session = app.login().await;
    app.backend.reject_next(1);

    let body = get_clients(&app).await.unwrap();
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    assert_eq!(app.backend.count(RENEW), 1);
    let hits = app.backend.hits(CLIENTS);
    assert_eq!(hits.len(), 2);

    let old = bearer(&session.access_token.unwrap());
    let renewed = bearer(&app.client.session().access_token().unwrap());
    assert_ne!(old, renewed);
    assert_eq!(hits[0].authorization.as_deref(), Some(old.as_str()));
    assert_eq!(hits[1].authorization.as_deref(), Some(renewed.as_str()));

    assert_eq!(app.client.api().auth_retry_count(), 0);
}

#[tokio::test]
async fn test_retried_request_rejected_again_keeps_session() {
    let app = TestApp::spawn().await;
    app.login().await;
    app.backend.reject_next(2);

    let err = get_clients(&app).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(err.status, Some(401));
    assert_eq!(err.message, "Token expired");

    assert_eq!(app.backend.count(CLIENTS), 2);
    assert_eq!(app.backend.count(RENEW), 1);
    assert_eq!(app.client.api().auth_retry_count(), 1);
    assert!(app.client.session().is_authenticated());

    // The next success clears the counter.
    get_clients(&app).await.unwrap();
    assert_eq!(app.client.api().auth_retry_count(), 0);
}

#[tokio::test]
async fn test_retry_budget_exhaustion_logs_out() {
    let mut app = TestApp::spawn().await;
    app.login().await;
    app.backend.reject_all();

    for attempt in 1..=3 {
        let err = get_clients(&app).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(app.client.api().auth_retry_count(), attempt);
        assert!(app.client.session().is_authenticated());
    }
    assert_eq!(app.backend.count(RENEW), 3);
    app.drain_events();

    let err = get_clients(&app).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(app.client.api().auth_retry_count(), 0);
    assert!(!app.client.session().is_authenticated());
    // No fourth renewal: the budget was spent.
    assert_eq!(app.backend.count(RENEW), 3);
    assert_eq!(app.backend.count(CLIENTS), 7);

    let events = app.drain_events();
    assert_eq!(
        occurrences(
            &events,
            &EventPayload::Session(SessionEvent::LoggedOut {
                reason: LogoutReason::RetryBudgetExhausted,
                redirect_to: "/login".to_string(),
            })
        ),
        1
    );
}

#[tokio::test]
async fn test_concurrent_401_burst_shares_one_renewal() {
    let mut app = TestApp::spawn().await;
    app.login().await;
    app.drain_events();
    app.backend.delay_renewals(100);
    app.backend.reject_next(4);

    let (a, b, c, d) = tokio::join!(
        get_clients(&app),
        get_clients(&app),
        get_clients(&app),
        get_clients(&app),
    );
    for result in [a, b, c, d] {
        assert_eq!(result.unwrap().as_array().map(Vec::len), Some(2));
    }

    assert_eq!(app.backend.count(RENEW), 1);
    assert_eq!(app.backend.count(CLIENTS), 8);
    assert_eq!(app.client.api().auth_retry_count(), 0);

    let session = app.client.session().session();
    assert!(app.client.session().is_authenticated());
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(session.role, Some(Role::Admin));

    let events = app.drain_events();
    assert_eq!(events, vec![EventPayload::Session(SessionEvent::TokenRenewed)]);
}

#[tokio::test]
async fn test_other_failure_resets_retry_counter() {
    let app = TestApp::spawn().await;
    app.login().await;
    app.backend.reject_next(2);

    get_clients(&app).await.unwrap_err();
    assert_eq!(app.client.api().auth_retry_count(), 1);

    let err = app
        .client
        .api()
        .post::<_, Value>("/api/clients/create", &json!({ "name": "Acme" }))
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(409));
    assert_eq!(app.client.api().auth_retry_count(), 0);

    // A fresh burst starts counting from one again.
    app.backend.reject_next(2);
    get_clients(&app).await.unwrap_err();
    assert_eq!(app.client.api().auth_retry_count(), 1);
    assert!(app.client.session().is_authenticated());
}

#[tokio::test]
async fn test_failed_renewal_during_retry_ends_session() {
    let mut app = TestApp::spawn().await;
    app.login().await;
    app.backend.reject_all();
    app.backend.fail_renewals();

    let err = get_clients(&app).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(app.backend.count(CLIENTS), 1);
    assert!(!app.client.session().is_authenticated());

    let events = app.drain_events();
    assert!(contains(&events, &EventPayload::Notice(Notice::SessionExpired)));
}

#[tokio::test]
async fn test_expired_token_renewed_before_request() {
    let app = TestApp::spawn().await;
    let expired = mint_token(Role::Admin, -60);
    app.store_raw(&Session {
        access_token: Some(expired.clone()),
        refresh_token: Some("refresh-1".to_string()),
        role: Some(Role::Admin),
        ..Session::default()
    });

    let clients = app.client.clients.read(&QueryParams::new()).await.unwrap();
    assert_eq!(clients.len(), 2);

    assert_eq!(app.backend.count(RENEW), 1);
    let hits = app.backend.hits(CLIENTS);
    assert_eq!(hits.len(), 1);
    let fresh = app.client.session().access_token().unwrap();
    assert_ne!(fresh, expired);
    assert_eq!(hits[0].authorization, Some(bearer(&fresh)));
}

#[tokio::test]
async fn test_public_endpoint_never_carries_token() {
    let app = TestApp::spawn().await;
    app.login().await;
    app.login().await;

    let hits = app.backend.hits("POST /api/admin-login");
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.authorization.is_none()));
}

#[tokio::test]
async fn test_unreachable_backend_publishes_connectivity_notice() {
    let addr = dead_address().await;
    let client = HrmsClient::with_store(
        &test_config(&format!("http://{addr}")),
        Arc::new(MemoryTokenStore::new()),
    )
    .unwrap();
    let mut events = client.events().subscribe();

    let err = client
        .api()
        .get::<Value>("/api/clients", &QueryParams::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.status, None);
    assert_eq!(client.api().auth_retry_count(), 0);

    let event = events.try_recv().unwrap();
    assert_eq!(event.payload, EventPayload::Notice(Notice::Connectivity));
}
