//! Integration tests for the Warden HTTP gateway: service-key gate,
//! envelopes, login, and the privileged role flow.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use warden::prelude::*;
use warden::warden_session::ManualClock;

// =========================================================================
// Helpers
// =========================================================================

const SERVICE_KEY: &str = warden::SERVICE_KEY_HEADER;
const KEY: &str = "test-service-key";
const ADMIN: &str = "root@example.com";
const EDITOR: &str = "ed@example.com";

/// A router over an empty in-memory store, a clock frozen at 0, and
/// minimum-cost hashing.
async fn app() -> (Router, ManualClock) {
    app_with(MemoryStore::new()).await
}

/// Like [`app`], over a store the test has already filled.
async fn app_with(store: MemoryStore) -> (Router, ManualClock) {
    let clock = ManualClock::new(0);
    let server = WardenServer::builder()
        .bind("127.0.0.1:0")
        .service_key(KEY)
        .session_config(SessionConfig { lifetime_secs: 600 })
        .clock(clock.clone())
        .build(
            store,
            Argon2Verifier::with_params(8, 1, 1).expect("valid params"),
        )
        .await
        .expect("server should bind");
    (server.router(), clock)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(SERVICE_KEY, KEY)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(SERVICE_KEY, KEY)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends `request` and returns the status and the JSON body
/// (`Value::Null` when the body is empty).
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, body)
}

async fn create_user(app: &Router, email: &str, password: &str, role: &str) {
    let (status, body) = send(
        app,
        post(
            "/create-user",
            json!({ "name": "Test", "email": email, "password": password, "role": role }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create-user failed: {body}");
}

/// Logs in and returns the session code.
async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        post("/login", json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["session"]
        .as_str()
        .expect("session code")
        .to_string()
}

/// An app with one ADMIN and one EDITOR, both logged in.
async fn seeded() -> (Router, ManualClock, String, String) {
    let (app, clock) = app().await;
    create_user(&app, ADMIN, "admin-pw", ADMIN_ROLE).await;
    create_user(&app, EDITOR, "editor-pw", "EDITOR").await;
    let admin_code = login(&app, ADMIN, "admin-pw").await;
    let editor_code = login(&app, EDITOR, "editor-pw").await;
    (app, clock, admin_code, editor_code)
}

// =========================================================================
// Service-key gate
// =========================================================================

#[tokio::test]
async fn test_status_with_key_reports_up() {
    let (app, _clock) = app().await;

    let (status, body) = send(&app, get("/status")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "state": true }));
}

#[tokio::test]
async fn test_envelope_served_as_json() {
    let (app, _clock) = app().await;

    let response = app.oneshot(get("/roles")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok());
    assert_eq!(content_type, Some("application/json"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], br#"{"error":false,"data":[]}"#);
}

#[tokio::test]
async fn test_gate_missing_key_forbidden_with_empty_body() {
    let (app, _clock) = app().await;
    let request = Request::builder()
        .uri("/status")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_gate_wrong_key_forbidden() {
    let (app, _clock) = app().await;
    let request = Request::builder()
        .uri("/users")
        .header(SERVICE_KEY, "guess")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_gate_applies_before_login() {
    let (app, _clock) = app().await;
    create_user(&app, ADMIN, "admin-pw", ADMIN_ROLE).await;
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .body(Body::from(
            json!({ "email": ADMIN, "password": "admin-pw" }).to_string(),
        ))
        .unwrap();

    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (app, _clock) = app().await;
    let request = Request::builder()
        .uri("/status")
        .header(SERVICE_KEY, KEY)
        .header("origin", "https://intranet.example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    let allowed = response
        .headers()
        .get("access-control-allow-origin")
        .and_then(|v| v.to_str().ok());
    assert_eq!(allowed, Some("*"));
}

// =========================================================================
// Accounts
// =========================================================================

#[tokio::test]
async fn test_create_user_listed_without_password() {
    let (app, _clock) = app().await;
    create_user(&app, EDITOR, "editor-pw", "EDITOR").await;

    let (status, body) = send(&app, get("/users")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], false);
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], EDITOR);
    assert!(users[0].get("password").is_none());
}

#[tokio::test]
async fn test_create_user_duplicate_email_conflict() {
    let (app, _clock) = app().await;
    create_user(&app, EDITOR, "editor-pw", "EDITOR").await;

    let (status, body) = send(
        &app,
        post(
            "/create-user",
            json!({ "name": "Again", "email": EDITOR, "password": "other" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_user_malformed_body_bad_request_envelope() {
    let (app, _clock) = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/create-user")
        .header(SERVICE_KEY, KEY)
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_create_user_empty_password_bad_request() {
    let (app, _clock) = app().await;

    let (status, body) = send(
        &app,
        post(
            "/create-user",
            json!({ "name": "Ed", "email": EDITOR, "password": "" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "password must not be empty");
}

#[tokio::test]
async fn test_user_role_and_has_role() {
    let (app, _clock) = app().await;
    create_user(&app, EDITOR, "editor-pw", "EDITOR").await;

    let (_, role) = send(&app, get(&format!("/roles/{EDITOR}"))).await;
    let (_, yes) = send(&app, get(&format!("/has-role/EDITOR/{EDITOR}"))).await;
    let (_, no) = send(&app, get(&format!("/has-role/ADMIN/{EDITOR}"))).await;

    assert_eq!(role["data"], "EDITOR");
    assert_eq!(yes["data"], true);
    assert_eq!(no["data"], false);
}

#[tokio::test]
async fn test_user_role_unknown_email_not_found() {
    let (app, _clock) = app().await;

    let (status, body) = send(&app, get("/roles/ghost@example.com")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

// =========================================================================
// Login and sessions
// =========================================================================

#[tokio::test]
async fn test_login_corrupt_stored_digest_internal_error() {
    let store = MemoryStore::new();
    store
        .insert_user(User {
            name: "Legacy".into(),
            email: EDITOR.into(),
            password: "stored-in-the-clear".into(),
            role: "EDITOR".into(),
        })
        .await
        .unwrap();
    let (app, _clock) = app_with(store).await;

    let (status, body) = send(
        &app,
        post("/login", json!({ "email": EDITOR, "password": "stored-in-the-clear" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "internal error" }));
    let (_, sessions) = send(&app, get("/sessions")).await;
    assert_eq!(sessions["data"], json!({}));
}

#[tokio::test]
async fn test_login_returns_code_and_public_user() {
    let (app, _clock) = app().await;
    create_user(&app, EDITOR, "editor-pw", "EDITOR").await;

    let (status, body) = send(
        &app,
        post("/login", json!({ "email": EDITOR, "password": "editor-pw" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let code = body["data"]["session"].as_str().unwrap();
    assert_eq!(code.len(), 32);
    assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(body["data"]["user"]["role"], "EDITOR");
    assert!(body["data"]["user"].get("password").is_none());
}

#[tokio::test]
async fn test_login_unknown_email_and_wrong_password_look_the_same() {
    let (app, _clock) = app().await;
    create_user(&app, EDITOR, "editor-pw", "EDITOR").await;

    let unknown = send(
        &app,
        post("/login", json!({ "email": "ghost@example.com", "password": "x" })),
    )
    .await;
    let wrong = send(
        &app,
        post("/login", json!({ "email": EDITOR, "password": "nope" })),
    )
    .await;

    assert_eq!(unknown.0, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, wrong);
    assert_eq!(wrong.1["error"], "invalid credentials");
}

#[tokio::test]
async fn test_login_again_before_expiry_keeps_code() {
    let (app, clock) = app().await;
    create_user(&app, EDITOR, "editor-pw", "EDITOR").await;

    let first = login(&app, EDITOR, "editor-pw").await;
    clock.advance(Duration::from_secs(9 * 60));
    let second = login(&app, EDITOR, "editor-pw").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_validate_session_live_then_expired() {
    let (app, clock) = app().await;
    create_user(&app, EDITOR, "editor-pw", "EDITOR").await;
    let code = login(&app, EDITOR, "editor-pw").await;
    let body = json!({ "fromUser": EDITOR, "sessionCode": code });

    let (status, live) = send(&app, post("/validate-session", body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(live, json!({ "error": false }));

    clock.advance(Duration::from_secs(600));

    let (status, dead) = send(&app, post("/validate-session", body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(dead["error"], "access denied");
}

#[tokio::test]
async fn test_validate_session_wrong_code_forbidden() {
    let (app, _clock) = app().await;
    create_user(&app, EDITOR, "editor-pw", "EDITOR").await;
    login(&app, EDITOR, "editor-pw").await;

    let (status, _) = send(
        &app,
        post(
            "/validate-session",
            json!({ "fromUser": EDITOR, "sessionCode": "0".repeat(32) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sessions_lists_live_and_drops_expired() {
    let (app, clock) = app().await;
    create_user(&app, ADMIN, "admin-pw", ADMIN_ROLE).await;
    create_user(&app, EDITOR, "editor-pw", "EDITOR").await;
    login(&app, ADMIN, "admin-pw").await;
    clock.advance(Duration::from_secs(300));
    let editor_code = login(&app, EDITOR, "editor-pw").await;

    clock.advance(Duration::from_secs(300));
    let (status, body) = send(&app, get("/sessions")).await;

    assert_eq!(status, StatusCode::OK);
    let sessions = body["data"].as_object().unwrap();
    assert_eq!(sessions.len(), 1, "admin session expired at 600s");
    assert_eq!(sessions[EDITOR]["sessionCode"], editor_code.as_str());
    assert_eq!(sessions[EDITOR]["user"]["email"], EDITOR);
}

// =========================================================================
// Privileged role flow
// =========================================================================

#[tokio::test]
async fn test_add_role_twice_conflicts_and_lists_once() {
    let (app, _clock, admin_code, _) = seeded().await;
    let body = json!({ "fromUser": ADMIN, "sessionCode": admin_code, "name": "ADMIN" });

    let (first, _) = send(&app, post("/add-role", body.clone())).await;
    let (second, err) = send(&app, post("/add-role", body)).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    assert!(err["error"].is_string());

    let (_, roles) = send(&app, get("/roles")).await;
    let roles = roles["data"].as_array().unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0]["name"], "ADMIN");
}

#[tokio::test]
async fn test_add_role_blank_name_bad_request() {
    let (app, _clock, admin_code, _) = seeded().await;

    let (status, body) = send(
        &app,
        post(
            "/add-role",
            json!({ "fromUser": ADMIN, "sessionCode": admin_code, "name": "" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name must not be empty");
    let (_, roles) = send(&app, get("/roles")).await;
    assert_eq!(roles["data"], json!([]));
}

#[tokio::test]
async fn test_add_role_by_editor_access_denied() {
    let (app, _clock, _, editor_code) = seeded().await;

    let (status, body) = send(
        &app,
        post(
            "/add-role",
            json!({ "fromUser": EDITOR, "sessionCode": editor_code, "name": "REVIEWER" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "access denied");
    let (_, roles) = send(&app, get("/roles")).await;
    assert_eq!(roles["data"], json!([]));
}

#[tokio::test]
async fn test_add_role_with_stale_admin_session_access_denied() {
    let (app, clock, admin_code, _) = seeded().await;
    clock.advance(Duration::from_secs(601));

    let (status, body) = send(
        &app,
        post(
            "/add-role",
            json!({ "fromUser": ADMIN, "sessionCode": admin_code, "name": "REVIEWER" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "access denied");
}

#[tokio::test]
async fn test_config_role_accepts_id_alias_and_replaces_map() {
    let (app, _clock, admin_code, _) = seeded().await;
    send(
        &app,
        post(
            "/add-role",
            json!({ "fromUser": ADMIN, "sessionCode": admin_code, "name": "EDITOR" }),
        ),
    )
    .await;

    let (status, _) = send(
        &app,
        post(
            "/config-role",
            json!({
                "fromUser": ADMIN,
                "sessionCode": admin_code,
                "id": "EDITOR",
                "config": { "publish": true, "delete": false }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let (_, roles) = send(&app, get("/roles")).await;
    assert_eq!(
        roles["data"][0]["config"],
        json!({ "delete": false, "publish": true })
    );
}

#[tokio::test]
async fn test_config_role_unknown_role_not_found() {
    let (app, _clock, admin_code, _) = seeded().await;

    let (status, _) = send(
        &app,
        post(
            "/config-role",
            json!({
                "fromUser": ADMIN,
                "sessionCode": admin_code,
                "name": "GHOST",
                "config": {}
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_role_editor_cannot_promote_self() {
    let (app, _clock, _, editor_code) = seeded().await;

    let (status, _) = send(
        &app,
        post(
            "/set-role",
            json!({
                "fromUser": EDITOR,
                "sessionCode": editor_code,
                "email": EDITOR,
                "role": ADMIN_ROLE
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, role) = send(&app, get(&format!("/roles/{EDITOR}"))).await;
    assert_eq!(role["data"], "EDITOR");
}

#[tokio::test]
async fn test_set_role_unknown_user_not_found() {
    let (app, _clock, admin_code, _) = seeded().await;

    let (status, _) = send(
        &app,
        post(
            "/set-role",
            json!({
                "fromUser": ADMIN,
                "sessionCode": admin_code,
                "email": "ghost@example.com",
                "role": "EDITOR"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_editor_promoted_by_admin_gains_access() {
    let (app, clock, admin_code, editor_code) = seeded().await;
    let add_reviewer = json!({
        "fromUser": EDITOR,
        "sessionCode": editor_code,
        "name": "REVIEWER"
    });

    let (before, _) = send(&app, post("/add-role", add_reviewer.clone())).await;
    assert_eq!(before, StatusCode::FORBIDDEN);

    let (promoted, _) = send(
        &app,
        post(
            "/set-role",
            json!({
                "fromUser": ADMIN,
                "sessionCode": admin_code,
                "email": EDITOR,
                "role": ADMIN_ROLE
            }),
        ),
    )
    .await;
    assert_eq!(promoted, StatusCode::OK);

    clock.advance(Duration::from_secs(60));
    let renewed = login(&app, EDITOR, "editor-pw").await;
    assert_eq!(renewed, editor_code);

    let (after, _) = send(&app, post("/add-role", add_reviewer)).await;
    assert_eq!(after, StatusCode::OK);
}
