//! Common test utilities shared across integration tests.

use tabula::transport::MockTransport;
use tabula::{Client, ClientConfig};

/// A client over `transport` with a throwaway key.
pub fn client(transport: MockTransport) -> Client<MockTransport> {
    Client::new(transport, ClientConfig::new("test-key"))
}

/// A read payload holding `rows`.
pub fn read_body(rows: &[serde_json::Value]) -> String {
    serde_json::json!({
        "version": "3",
        "status": "ok",
        "response": {
            "included_rows": rows.len(),
            "data": rows,
        }
    })
    .to_string()
}
