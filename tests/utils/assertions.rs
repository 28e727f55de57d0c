//! Test assertion helpers - fluent API for verifying responses
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::http::StatusCode;
use serde_json::Value;

use super::actions::ApiResponse;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ResponseAssertion<'a> {
    response: &'a ApiResponse,
}

impl<'a> ResponseAssertion<'a> {
    pub fn of(response: &'a ApiResponse) -> Self {
        Self { response }
    }

    pub fn has_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status, expected,
            "unexpected status, body: {}",
            self.response.body
        );
        self
    }

    /// Error responses carry a message under "error" and nothing else
    pub fn is_error(self) -> Self {
        let object = self
            .response
            .body
            .as_object()
            .expect("error body should be a JSON object");
        assert_eq!(object.len(), 1);
        assert!(object["error"].is_string());
        self
    }

    pub fn has_field(self, pointer: &str, expected: Value) -> Self {
        assert_eq!(
            self.response.body.pointer(pointer),
            Some(&expected),
            "field {} mismatch in {}",
            pointer,
            self.response.body
        );
        self
    }

    pub fn lacks_field(self, pointer: &str) -> Self {
        assert!(
            self.response.body.pointer(pointer).is_none(),
            "field {} should be absent in {}",
            pointer,
            self.response.body
        );
        self
    }

    pub fn varies_on_authorization(self) -> Self {
        assert_eq!(self.response.vary.as_deref(), Some("Authorization"));
        self
    }

    pub fn entry_count(self, expected: usize) -> Self {
        let entries = self.response.body["workout"]["entries"]
            .as_array()
            .expect("workout should have entries");
        assert_eq!(entries.len(), expected);
        self
    }
}
