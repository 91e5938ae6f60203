//! Cloud functions
//!
//! Local implementation of the cloud functions the store deploys. The CLI
//! can run these without a server (`recsync hello --local`) and compare
//! them with the remote result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Name of the greeting function on the server
pub const HELLO_FUNCTION: &str = "hello";

/// Payload returned by the `hello` function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloResponse {
    /// Greeting text
    pub message: String,
    /// Fixed release date, formatted `MM/dd/yyyy`
    pub date: String,
}

/// Runs the `hello` function locally
pub fn hello() -> HelloResponse {
    // 2014-02-11 always exists; the fallback only keeps this total.
    let date = NaiveDate::from_ymd_opt(2014, 2, 11)
        .map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| "02/11/2014".to_string());

    HelloResponse {
        message: "Hello World!".to_string(),
        date,
    }
}
