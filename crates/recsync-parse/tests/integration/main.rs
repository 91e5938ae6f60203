//! Integration tests for recsync-parse
//!
//! Uses wiremock to simulate a Parse Server and verifies end-to-end
//! behavior of the ParseClient, record store, authentication and cloud
//! function calls.

mod common;

mod test_auth;
mod test_functions;
mod test_records;
