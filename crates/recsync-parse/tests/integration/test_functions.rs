//! Integration tests for cloud function calls

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use recsync_core::functions;
use recsync_parse::functions::{call_function, hello};
use recsync_parse::StoreError;

use crate::common;

#[tokio::test]
async fn test_hello_matches_local_implementation() {
    let (server, client) = common::setup_parse_mock().await;

    Mock::given(method("POST"))
        .and(path("/functions/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"message": "Hello World!", "date": "02/11/2014"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let remote = hello(&client).await.expect("hello failed");
    assert_eq!(remote, functions::hello());
}

#[tokio::test]
async fn test_unknown_function() {
    let (server, client) = common::setup_parse_mock().await;
    common::mount_error(&server, "POST", "/functions/nope", 400, 141, "Invalid function: \"nope\"")
        .await;

    let err = call_function::<serde_json::Value>(&client, "nope", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Store { code: 141, .. }));
}
