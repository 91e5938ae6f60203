//! Integration tests for the Parse record store
//!
//! Verifies that ParseRecordStore maps query, save and delete onto the
//! `/classes` endpoints and converts responses into records.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use recsync_core::domain::{ClassName, Fields, Record, RecordId};
use recsync_core::ports::IRecordStore;
use recsync_parse::provider::ParseRecordStore;
use recsync_parse::StoreError;

use crate::common;

fn customer() -> ClassName {
    ClassName::new("Customer".to_string()).unwrap()
}

#[tokio::test]
async fn test_query_sends_limit_skip_and_session() {
    let (server, client) = common::setup_parse_mock().await;

    Mock::given(method("GET"))
        .and(path("/classes/Customer"))
        .and(query_param("limit", "2"))
        .and(query_param("skip", "4"))
        .and(header("X-Parse-Session-Token", common::SESSION_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                common::parse_object("a1", json!({"firstName": "Ada", "age": 36})),
                common::parse_object("a2", json!({"firstName": "Alan", "active": true})),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = ParseRecordStore::new(client);
    let records = store.query(&customer(), 2, 4).await.expect("query failed");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].value("id"), "a1");
    assert_eq!(records[0].fields().get("age"), Some("36"));
    assert_eq!(records[1].fields().get("active"), Some("true"));
    assert_eq!(records[1].value("createdAt"), "2024-05-01T10:00:00.000Z");
}

#[tokio::test]
async fn test_query_empty_class() {
    let (server, client) = common::setup_parse_mock().await;
    common::mount_query(&server, "Customer", vec![]).await;

    let store = ParseRecordStore::new(client);
    let records = store.query(&customer(), 1000, 0).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_save_new_record_posts_fields() {
    let (server, client) = common::setup_parse_mock().await;

    Mock::given(method("POST"))
        .and(path("/classes/Customer"))
        .and(body_json(json!({"ID": "7", "firstName": "A"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "objectId": "new1",
            "createdAt": "2024-06-01T08:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let row: Fields = [("id", "7"), ("firstName", "A")].into_iter().collect();
    let store = ParseRecordStore::new(client);
    let saved = store
        .save(&customer(), &Record::from_upload_row(&row))
        .await
        .expect("save failed");

    assert_eq!(saved.value("id"), "new1");
    assert_eq!(saved.value("createdAt"), "2024-06-01T08:00:00.000Z");
    assert_eq!(saved.value("updatedAt"), "2024-06-01T08:00:00.000Z");
    assert_eq!(saved.fields().get("ID"), Some("7"));
}

#[tokio::test]
async fn test_save_existing_record_puts_fields() {
    let (server, client) = common::setup_parse_mock().await;

    Mock::given(method("PUT"))
        .and(path("/classes/Customer/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updatedAt": "2024-06-02T09:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fields: Fields = [("firstName", "B")].into_iter().collect();
    let record = Record::new(fields).with_identity(RecordId::new("a1".into()).unwrap(), None, None);

    let store = ParseRecordStore::new(client);
    let saved = store.save(&customer(), &record).await.unwrap();
    assert_eq!(saved.value("id"), "a1");
    assert_eq!(saved.value("updatedAt"), "2024-06-02T09:00:00.000Z");
}

#[tokio::test]
async fn test_delete_record() {
    let (server, client) = common::setup_parse_mock().await;

    Mock::given(method("DELETE"))
        .and(path("/classes/Customer/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let store = ParseRecordStore::new(client);
    store
        .delete(&customer(), &RecordId::new("a1".into()).unwrap())
        .await
        .expect("delete failed");
}

#[tokio::test]
async fn test_delete_missing_record_is_not_found() {
    let (server, client) = common::setup_parse_mock().await;
    common::mount_error(&server, "DELETE", "/classes/Customer/gone", 404, 101, "Object not found.")
        .await;

    let store = ParseRecordStore::new(client);
    let err = store
        .delete(&customer(), &RecordId::new("gone".into()).unwrap())
        .await
        .unwrap_err();

    let store_err = err.downcast_ref::<StoreError>().expect("StoreError");
    assert!(matches!(store_err, StoreError::NotFound(_)));
    assert!(format!("{err:#}").contains("Customer/gone"));
}

#[tokio::test]
async fn test_invalid_session_is_classified() {
    let (server, client) = common::setup_parse_mock().await;
    common::mount_error(&server, "GET", "/classes/Customer", 400, 209, "Invalid session token").await;

    let store = ParseRecordStore::new(client);
    let err = store.query(&customer(), 10, 0).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::InvalidSession(_))
    ));
}

#[tokio::test]
async fn test_server_error_is_classified() {
    let (server, client) = common::setup_parse_mock().await;

    Mock::given(method("GET"))
        .and(path("/classes/Customer"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let store = ParseRecordStore::new(client);
    let err = store.query(&customer(), 10, 0).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::ServerError(m)) if m == "upstream unavailable"
    ));
}

#[tokio::test]
async fn test_throttled_request_is_retried() {
    let (server, client) = common::setup_parse_mock().await;

    Mock::given(method("GET"))
        .and(path("/classes/Customer"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    common::mount_query(
        &server,
        "Customer",
        vec![common::parse_object("a1", json!({}))],
    )
    .await;

    let store = ParseRecordStore::new(client);
    let records = store.query(&customer(), 10, 0).await.expect("query after retry");
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_throttling_gives_up_after_max_retries() {
    let (server, client) = common::setup_parse_mock().await;

    Mock::given(method("GET"))
        .and(path("/classes/Customer"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let store = ParseRecordStore::new(client.with_max_retries(1));
    let err = store.query(&customer(), 10, 0).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::TooManyRequests { retry_after }) if *retry_after == Duration::ZERO
    ));
}
