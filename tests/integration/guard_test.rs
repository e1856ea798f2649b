//! Integration tests for the route guard and the role menu.

mod helpers;

use hrms_auth::{GuardDecision, GuardState};
use hrms_core::events::{EventPayload, LogoutReason, SessionEvent};
use hrms_entity::{Role, Session};

use helpers::{TestApp, contains, mint_token, occurrences};

#[tokio::test]
async fn test_employee_denied_admin_allowed_on_clients() {
    let app = TestApp::spawn().await;

    app.establish(Role::Employee);
    let denied = app.client.guard().navigate("/clients");
    assert_eq!(
        denied,
        GuardDecision::Unauthorized {
            from: "/clients".to_string(),
            redirect_to: "/unauthorized".to_string(),
        }
    );
    assert_eq!(denied.state(), Some(GuardState::AuthenticatedUnauthorized));
    assert_eq!(denied.destination(), "/unauthorized");

    app.establish(Role::Admin);
    let allowed = app.client.guard().navigate("/clients");
    assert_eq!(
        allowed,
        GuardDecision::Authorized {
            path: "/clients".to_string(),
            role: Some(Role::Admin),
        }
    );
    assert!(allowed.is_allowed());
}

#[tokio::test]
async fn test_no_session_redirects_to_login_keeping_origin() {
    let mut app = TestApp::spawn().await;

    let decision = app.client.guard().navigate("/employees?page=2");
    assert_eq!(
        decision,
        GuardDecision::Unauthenticated {
            from: "/employees?page=2".to_string(),
            redirect_to: "/login".to_string(),
        }
    );
    assert_eq!(decision.state(), Some(GuardState::Unauthenticated));

    // Clearing an already empty session announces nothing.
    assert!(app.drain_events().is_empty());
}

#[tokio::test]
async fn test_expired_token_logs_out() {
    let mut app = TestApp::spawn().await;
    app.store_raw(&Session {
        access_token: Some(mint_token(Role::Admin, -5)),
        refresh_token: Some("refresh-1".to_string()),
        role: Some(Role::Admin),
        ..Session::default()
    });

    let decision = app.client.guard().navigate("/departments");
    assert!(matches!(
        decision,
        GuardDecision::Unauthenticated { ref redirect_to, .. } if redirect_to == "/login"
    ));
    assert_eq!(app.client.session().session(), Session::default());

    let events = app.drain_events();
    assert!(contains(
        &events,
        &EventPayload::Session(SessionEvent::LoggedOut {
            reason: LogoutReason::TokenExpired,
            redirect_to: "/login".to_string(),
        })
    ));
    // The guard itself never renews.
    assert_eq!(app.backend.count("POST /api/renew-token"), 0);
}

#[tokio::test]
async fn test_unauthorized_page_always_renders_for_signed_in_users() {
    let app = TestApp::spawn().await;

    for role in Role::ALL {
        app.establish(role);
        let decision = app.client.guard().navigate("/unauthorized");
        assert!(decision.is_allowed(), "{role} was bounced from /unauthorized");
    }
}

#[tokio::test]
async fn test_public_routes_ignore_session() {
    let mut app = TestApp::spawn().await;

    let decision = app.client.guard().navigate("/login");
    assert_eq!(
        decision,
        GuardDecision::Public {
            path: "/login".to_string(),
        }
    );
    assert_eq!(decision.state(), None);
    assert!(app.drain_events().is_empty());
}

#[tokio::test]
async fn test_parameterized_sub_paths() {
    let app = TestApp::spawn().await;

    app.establish(Role::Admin);
    assert!(app.client.guard().navigate("/salary/edit/42").is_allowed());
    assert!(app.client.guard().navigate("/salary/add").is_allowed());
    assert!(!app.client.guard().navigate("/salary/edit/").is_allowed());

    app.establish(Role::Employee);
    assert!(!app.client.guard().navigate("/salary/edit/42").is_allowed());
    assert!(app.client.guard().navigate("/my-salary").is_allowed());
}

#[tokio::test]
async fn test_menu_follows_role() {
    let app = TestApp::spawn().await;
    assert!(app.client.checker().menu_for(None).is_empty());

    app.establish(Role::Employee);
    let role = app.client.session().current_role();
    let labels: Vec<String> = app
        .client
        .checker()
        .menu_for(role)
        .into_iter()
        .map(|m| m.label)
        .collect();
    assert_eq!(labels, ["Dashboard", "My Salary", "Profile"]);

    app.establish(Role::SuperAdmin);
    let role = app.client.session().current_role();
    let menu = app.client.checker().menu_for(role);
    assert!(menu.iter().any(|m| m.path == "/admin-registration"));
    assert!(!menu.iter().any(|m| m.path == "/my-salary"));
    assert!(menu.windows(2).all(|w| w[0].order <= w[1].order));
}

#[tokio::test]
async fn test_repeated_denials_do_not_log_out() {
    let mut app = TestApp::spawn().await;
    app.establish(Role::OnboardingManager);
    app.drain_events();

    for _ in 0..3 {
        assert!(!app.client.guard().navigate("/onboarding-managers").is_allowed());
    }
    assert!(app.client.session().is_authenticated());

    let events = app.drain_events();
    assert_eq!(
        occurrences(
            &events,
            &EventPayload::Session(SessionEvent::LoggedOut {
                reason: LogoutReason::TokenExpired,
                redirect_to: "/login".to_string(),
            })
        ),
        0
    );
}
