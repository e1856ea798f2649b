//! Integration tests for login, logout, and token renewal.

mod helpers;

use std::time::Duration;

use hrms_client::dto::LoginRequest;
use hrms_core::ErrorKind;
use hrms_core::events::{EventPayload, LogoutReason, Notice, SessionEvent};
use hrms_entity::{Role, Session};

use helpers::{EMAIL, TestApp, bearer, contains, mint_token};

#[tokio::test]
async fn test_login_stores_session() {
    let mut app = TestApp::spawn().await;

    let session = app.login().await;
    assert_eq!(session.role, Some(Role::Admin));
    assert_eq!(session.user_id.as_deref(), Some("7"));
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));

    let manager = app.client.session();
    assert!(manager.is_authenticated());
    assert_eq!(manager.current_role(), Some(Role::Admin));
    assert_eq!(manager.session(), session);

    // Login is a public endpoint: no bearer token is attached.
    let hits = app.backend.hits("POST /api/admin-login");
    assert_eq!(hits.len(), 1);
    assert!(hits[0].authorization.is_none());

    let events = app.drain_events();
    assert!(contains(
        &events,
        &EventPayload::Session(SessionEvent::LoggedIn {
            user_id: Some("7".to_string()),
            email: Some(EMAIL.to_string()),
        })
    ));
}

#[tokio::test]
async fn test_login_role_comes_from_response() {
    let app = TestApp::spawn().await;
    app.backend.set_login_role(Role::SuperAdmin);

    let session = app.login().await;
    assert_eq!(session.role, Some(Role::SuperAdmin));
    assert_eq!(app.client.session().current_role(), Some(Role::SuperAdmin));
}

#[tokio::test]
async fn test_login_wrong_password_surfaces_backend_message() {
    let app = TestApp::spawn().await;

    let err = app
        .client
        .auth()
        .login(&LoginRequest {
            email: EMAIL.to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.status, Some(400));
    assert_eq!(err.message, "Invalid email or password");
    assert!(!app.client.session().is_authenticated());
    assert_eq!(app.client.session().session(), Session::default());
}

#[tokio::test]
async fn test_login_rejects_malformed_email_locally() {
    let app = TestApp::spawn().await;

    let err = app
        .client
        .auth()
        .login(&LoginRequest {
            email: "not-an-email".to_string(),
            password: "whatever".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(app.backend.count("POST /api/admin-login"), 0);
}

#[tokio::test]
async fn test_logout_calls_backend_then_clears() {
    let mut app = TestApp::spawn().await;
    let session = app.login().await;
    app.drain_events();

    app.client.auth().logout().await.unwrap();

    let hits = app.backend.hits("POST /api/admin-logout");
    assert_eq!(hits.len(), 1);
    let token = session.access_token.unwrap();
    assert_eq!(hits[0].authorization.as_deref(), Some(bearer(&token).as_str()));

    assert!(!app.client.session().is_authenticated());
    assert_eq!(app.client.session().session(), Session::default());

    let events = app.drain_events();
    assert!(contains(
        &events,
        &EventPayload::Session(SessionEvent::LoggedOut {
            reason: LogoutReason::UserRequested,
            redirect_to: "/login".to_string(),
        })
    ));
}

#[tokio::test]
async fn test_logout_survives_backend_failure() {
    let app = TestApp::spawn().await;
    app.login().await;
    app.backend.reject_all();
    app.backend.fail_renewals();

    app.client.auth().logout().await.unwrap();
    assert!(!app.client.session().is_authenticated());
}

#[tokio::test]
async fn test_renew_without_refresh_token_makes_no_call() {
    let mut app = TestApp::spawn().await;
    app.store_raw(&Session {
        access_token: Some(mint_token(Role::Admin, 3600)),
        ..Session::default()
    });

    assert_eq!(app.client.session().renew().await, None);
    assert_eq!(app.backend.count("POST /api/renew-token"), 0);
    assert_eq!(app.client.session().access_token(), None);

    let events = app.drain_events();
    assert!(contains(
        &events,
        &EventPayload::Session(SessionEvent::LoggedOut {
            reason: LogoutReason::MissingCredentials,
            redirect_to: "/login".to_string(),
        })
    ));
}

#[tokio::test]
async fn test_renew_replaces_access_token_only() {
    let mut app = TestApp::spawn().await;
    let session = app.login().await;

    let renewed = app.client.session().renew().await.expect("renewed token");
    assert_ne!(Some(renewed.clone()), session.access_token);

    let stored = app.client.session().session();
    assert_eq!(stored.access_token, Some(renewed));
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(stored.role, Some(Role::Admin));

    let hits = app.backend.hits("POST /api/renew-token");
    assert_eq!(hits.len(), 1);
    let old = session.access_token.unwrap();
    assert_eq!(hits[0].authorization.as_deref(), Some(bearer(&old).as_str()));

    let events = app.drain_events();
    assert!(contains(
        &events,
        &EventPayload::Session(SessionEvent::TokenRenewed)
    ));
}

#[tokio::test]
async fn test_failed_renewal_expires_session() {
    let mut app = TestApp::spawn().await;
    app.login().await;
    app.backend.fail_renewals();

    assert_eq!(app.client.session().renew().await, None);
    assert!(!app.client.session().is_authenticated());

    let events = app.drain_events();
    assert!(contains(&events, &EventPayload::Notice(Notice::SessionExpired)));
    assert!(contains(
        &events,
        &EventPayload::Session(SessionEvent::LoggedOut {
            reason: LogoutReason::RenewalFailed,
            redirect_to: "/login".to_string(),
        })
    ));
}

#[tokio::test]
async fn test_concurrent_renewals_share_one_call() {
    let app = TestApp::spawn().await;
    app.login().await;
    app.backend.delay_renewals(100);

    let manager = app.client.session();
    let (a, b, c) = tokio::join!(manager.renew(), manager.renew(), manager.renew());

    assert!(a.is_some());
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(app.backend.count("POST /api/renew-token"), 1);
}

#[tokio::test]
async fn test_logout_during_renewal_leaves_no_token_behind() {
    let mut app = TestApp::spawn().await;
    app.login().await;
    app.drain_events();
    app.backend.delay_renewals(100);

    let manager = app.client.session().clone();
    let renewal = tokio::spawn(async move { manager.renew().await });
    tokio::time::sleep(Duration::from_millis(20)).await;

    app.client.auth().logout().await.unwrap();
    assert_eq!(renewal.await.unwrap(), None);

    assert_eq!(app.backend.count("POST /api/renew-token"), 1);
    assert_eq!(app.client.session().session(), Session::default());
    assert!(!app.client.session().is_authenticated());

    let events = app.drain_events();
    assert_eq!(
        events,
        vec![EventPayload::Session(SessionEvent::LoggedOut {
            reason: LogoutReason::UserRequested,
            redirect_to: "/login".to_string(),
        })]
    );
}
