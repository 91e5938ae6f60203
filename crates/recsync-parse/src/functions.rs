//! Cloud function invocation
//!
//! `POST /functions/{name}` answers with `{"result": ...}`; these helpers
//! unwrap that envelope.

use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::debug;

use recsync_core::functions::{HelloResponse, HELLO_FUNCTION};

use crate::client::ParseClient;
use crate::StoreError;

#[derive(Debug, Deserialize)]
struct FunctionResponse<T> {
    result: T,
}

/// Calls a cloud function with JSON parameters
///
/// # Arguments
/// * `client` - Parse client (with session token if the function requires one)
/// * `name` - Function name
/// * `params` - JSON object passed as the request body
pub async fn call_function<T: DeserializeOwned>(
    client: &ParseClient,
    name: &str,
    params: &Value,
) -> Result<T, StoreError> {
    let path = format!("/functions/{name}");
    debug!(function = name, "Calling cloud function");

    let response: FunctionResponse<T> = client
        .send_json(Method::POST, &path, |rb| rb.json(params))
        .await?;
    Ok(response.result)
}

/// Calls the `hello` cloud function
pub async fn hello(client: &ParseClient) -> Result<HelloResponse, StoreError> {
    call_function(client, HELLO_FUNCTION, &Value::Object(Default::default())).await
}
