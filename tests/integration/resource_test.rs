//! Integration tests for the resource data hooks: caching, invalidation,
//! RBAC gating, and the merged role-assignment listing.

mod helpers;

use hrms_cache::QueryParams;
use hrms_client::http::message_of;
use hrms_core::ErrorKind;
use hrms_entity::client::NewClient;
use hrms_entity::role_assignment::AssignRole;
use hrms_entity::{EntityId, Role};

use helpers::TestApp;

const LIST: &str = "GET /api/clients";
const CREATE: &str = "POST /api/clients/create";

fn draft(name: &str) -> NewClient {
    NewClient {
        name: name.to_string(),
        email: Some("hello@initech.test".to_string()),
        phone: None,
        address: None,
    }
}

#[tokio::test]
async fn test_read_is_cached_until_write() {
    let app = TestApp::spawn().await;
    app.login().await;
    let params = QueryParams::new();

    let first = app.client.clients.read(&params).await.unwrap();
    let second = app.client.clients.read(&params).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].name, "Acme");
    assert_eq!(first[1].id, EntityId::from(2));
    assert_eq!(app.backend.count(LIST), 1);

    let created = app.client.clients.create(&draft("Initech")).await.unwrap();
    assert_eq!(
        message_of(&created).as_deref(),
        Some("Client created successfully")
    );
    assert_eq!(app.backend.count(CREATE), 1);

    app.client.clients.read(&params).await.unwrap();
    assert_eq!(app.backend.count(LIST), 2);
}

#[tokio::test]
async fn test_distinct_params_are_cached_separately() {
    let app = TestApp::spawn().await;
    app.login().await;

    let mut page_two = QueryParams::new();
    page_two.insert("page".to_string(), "2".to_string());

    app.client.clients.read(&QueryParams::new()).await.unwrap();
    app.client.clients.read(&page_two).await.unwrap();
    app.client.clients.read(&page_two).await.unwrap();
    assert_eq!(app.backend.count(LIST), 2);
}

#[tokio::test]
async fn test_failed_write_keeps_cache() {
    let app = TestApp::spawn().await;
    app.login().await;
    let params = QueryParams::new();
    app.client.clients.read(&params).await.unwrap();

    let err = app.client.clients.create(&draft("Acme")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(err.status, Some(409));
    assert_eq!(err.message, "Client already exists");

    app.client.clients.read(&params).await.unwrap();
    assert_eq!(app.backend.count(LIST), 1);
    let state = app.client.clients.snapshot(&params).await;
    assert_eq!(state.data.map(|rows| rows.len()), Some(2));
    assert!(!state.is_loading);
    assert!(!state.is_stale);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_update_and_delete_invalidate() {
    let app = TestApp::spawn().await;
    app.login().await;
    let params = QueryParams::new();
    let id = EntityId::from(1);

    app.client.clients.read(&params).await.unwrap();
    app.client.clients.update(&id, &draft("Acme Corp")).await.unwrap();
    app.client.clients.read(&params).await.unwrap();
    assert_eq!(app.backend.count(LIST), 2);
    assert_eq!(app.backend.count("PUT /api/clients/update"), 1);

    // Admins may not delete clients.
    let err = app.client.clients.delete(&id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(app.backend.count("DELETE /api/clients/delete"), 0);
}

#[tokio::test]
async fn test_super_admin_may_delete() {
    let app = TestApp::spawn().await;
    app.backend.set_login_role(Role::SuperAdmin);
    app.login().await;

    let body = app.client.clients.delete(&EntityId::from(2)).await.unwrap();
    assert_eq!(message_of(&body).as_deref(), Some("Client 2 deleted"));
    assert_eq!(app.backend.count("DELETE /api/clients/delete"), 1);
}

#[tokio::test]
async fn test_invalid_draft_is_not_sent() {
    let app = TestApp::spawn().await;
    app.login().await;

    let err = app.client.clients.create(&draft("")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(app.backend.count(CREATE), 0);
}

#[tokio::test]
async fn test_rbac_blocks_request_for_forbidden_role() {
    let app = TestApp::spawn().await;
    app.establish(Role::Employee);

    let err = app.client.clients.read(&QueryParams::new()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(app.backend.count(LIST), 0);

    let err = app.client.role_assignments.read().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(app.backend.count("GET /api/employee-role/assigned"), 0);
}

#[tokio::test]
async fn test_anonymous_reads_are_blocked() {
    let app = TestApp::spawn().await;

    let err = app.client.clients.read(&QueryParams::new()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(app.backend.count(LIST), 0);
}

#[tokio::test]
async fn test_role_assignments_merge_both_listings() {
    let app = TestApp::spawn().await;
    app.login().await;

    let rows = app.client.role_assignments.read().await.unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.employee_id.as_str()).collect();
    assert_eq!(ids, ["2", "3", "1"]);

    // Cid appears in both listings and keeps the unassigned shape.
    let cid = &rows[1];
    assert!(!cid.is_assigned);
    assert_eq!(cid.role_id, None);

    let ann = &rows[2];
    assert!(ann.is_assigned);
    assert_eq!(ann.role_id, Some(EntityId::from(10)));
    assert_eq!(ann.role_name.as_deref(), Some("Engineer"));

    app.client.role_assignments.read().await.unwrap();
    assert_eq!(app.backend.count("GET /api/employee-role/assigned"), 1);
    assert_eq!(app.backend.count("GET /api/employee-role/unassigned"), 1);
}

#[tokio::test]
async fn test_assign_invalidates_merged_listing() {
    let app = TestApp::spawn().await;
    app.login().await;

    app.client.role_assignments.read().await.unwrap();
    app.client
        .role_assignments
        .assign(&AssignRole {
            employee_id: EntityId::from(2),
            role_id: EntityId::from(11),
        })
        .await
        .unwrap();
    app.client.role_assignments.read().await.unwrap();

    assert_eq!(app.backend.count("POST /api/employee-role/create"), 1);
    assert_eq!(app.backend.count("GET /api/employee-role/assigned"), 2);
}

#[tokio::test]
async fn test_blank_assignment_is_not_sent() {
    let app = TestApp::spawn().await;
    app.login().await;

    let err = app
        .client
        .role_assignments
        .assign(&AssignRole {
            employee_id: EntityId::from(""),
            role_id: EntityId::from(11),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(app.backend.count("POST /api/employee-role/create"), 0);
}

#[tokio::test]
async fn test_focus_does_not_refetch_by_default() {
    let app = TestApp::spawn().await;
    app.login().await;
    let params = QueryParams::new();

    app.client.clients.read(&params).await.unwrap();
    assert!(!app.client.clients.on_window_focus(&params).await);
    app.client.clients.read(&params).await.unwrap();
    assert_eq!(app.backend.count(LIST), 1);
}
