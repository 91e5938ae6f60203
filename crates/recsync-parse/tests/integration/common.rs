//! Shared test helpers for Parse Server integration tests
//!
//! Provides wiremock-based mock server setup for Parse REST endpoints.
//! Each helper mounts the necessary mock endpoints on the given server.

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use recsync_parse::client::ParseClient;

/// Application id used by every mock
pub const APP_ID: &str = "test-app";

/// Session token accepted by the mocks
pub const SESSION_TOKEN: &str = "r:test-session";

/// Starts a mock server and returns a client pointing at it with a session
pub async fn setup_parse_mock() -> (MockServer, ParseClient) {
    let server = MockServer::start().await;
    let client = ParseClient::with_base_url(APP_ID, server.uri()).with_session_token(SESSION_TOKEN);
    (server, client)
}

/// A Parse object as returned by the REST API
pub fn parse_object(id: &str, fields: Value) -> Value {
    let mut object = json!({
        "objectId": id,
        "createdAt": "2024-05-01T10:00:00.000Z",
        "updatedAt": "2024-05-01T10:00:00.000Z",
    });
    if let (Some(target), Value::Object(extra)) = (object.as_object_mut(), fields) {
        target.extend(extra);
    }
    object
}

/// Mounts `GET /classes/{class}` returning the given objects for any page
pub async fn mount_query(server: &MockServer, class: &str, objects: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/classes/{class}")))
        .and(header("X-Parse-Application-Id", APP_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": objects })))
        .mount(server)
        .await;
}

/// Mounts a Parse error response for any request to `route`
pub async fn mount_error(server: &MockServer, verb: &str, route: &str, status: u16, code: i64, error: &str) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({ "code": code, "error": error })),
        )
        .mount(server)
        .await;
}
