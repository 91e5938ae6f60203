//! Integration tests for the Parse authentication adapter

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use recsync_core::domain::Session;
use recsync_core::ports::IAuthProvider;
use recsync_parse::auth::ParseAuthAdapter;
use recsync_parse::StoreError;

use crate::common;

#[tokio::test]
async fn test_login_returns_session() {
    let (server, client) = common::setup_parse_mock().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("X-Parse-Revocable-Session", "1"))
        .and(body_json(json!({"username": "operator", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objectId": "u1",
            "username": "operator",
            "sessionToken": "r:fresh",
            "createdAt": "2024-01-01T00:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ParseAuthAdapter::new(client);
    let session = adapter.log_in("operator", "pw").await.expect("login failed");

    assert_eq!(session.user_id, "u1");
    assert_eq!(session.username, "operator");
    assert_eq!(session.session_token, "r:fresh");
}

#[tokio::test]
async fn test_login_bad_credentials() {
    let (server, client) = common::setup_parse_mock().await;
    common::mount_error(&server, "POST", "/login", 404, 101, "Invalid username/password.").await;

    let adapter = ParseAuthAdapter::new(client);
    let err = adapter.log_in("operator", "nope").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::InvalidCredentials(m)) if m == "Invalid username/password."
    ));
}

#[tokio::test]
async fn test_logout_sends_session_token() {
    let (server, client) = common::setup_parse_mock().await;

    Mock::given(method("POST"))
        .and(path("/logout"))
        .and(header("X-Parse-Session-Token", "r:mine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ParseAuthAdapter::new(client);
    adapter
        .log_out(&Session::new("u1", "operator", "r:mine"))
        .await
        .expect("logout failed");
}

#[tokio::test]
async fn test_current_user_validates_session() {
    let (server, client) = common::setup_parse_mock().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("X-Parse-Session-Token", "r:mine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objectId": "u1",
            "username": "renamed"
        })))
        .mount(&server)
        .await;
    common::mount_error(&server, "GET", "/users/me", 400, 209, "Invalid session token").await;

    let adapter = ParseAuthAdapter::new(client);
    let current = adapter
        .current_user(&Session::new("u1", "operator", "r:mine"))
        .await
        .unwrap();
    assert_eq!(current.username, "renamed");
    assert_eq!(current.session_token, "r:mine");

    let err = adapter
        .current_user(&Session::new("u1", "operator", "r:revoked"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::InvalidSession(_))
    ));
}
