// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions

use axum::http::StatusCode;
use serde_json::Value;

use rolegate_core::{ConflictKind, CoreError, RoleSet};

// =============================================================================
// Error Body Assertions
// =============================================================================

/// Asserts an HTTP error response carries the given status and error code.
pub fn assert_api_error(response: &(StatusCode, Value), status: StatusCode, code: &str) {
    let (actual, body) = response;
    assert_eq!(*actual, status, "unexpected status, body: {}", body);
    assert_eq!(
        body["error"]["code"], code,
        "unexpected error code, body: {}",
        body
    );
}

/// Asserts a JSON array of strings holds exactly `expected`, in any order.
pub fn assert_names(value: &Value, expected: &[&str]) {
    let mut actual: Vec<&str> = value
        .as_array()
        .unwrap_or_else(|| panic!("expected an array, got {}", value))
        .iter()
        .filter_map(Value::as_str)
        .collect();
    actual.sort_unstable();
    let mut expected = expected.to_vec();
    expected.sort_unstable();
    assert_eq!(actual, expected);
}

// =============================================================================
// Core Error Assertions
// =============================================================================

/// Assertion helpers for [`CoreError`].
pub trait CoreErrorAssertions {
    /// Asserts the error is `Forbidden`.
    fn assert_forbidden(&self);

    /// Asserts the error is a conflict of `kind`.
    fn assert_conflict(&self, kind: ConflictKind);

    /// Asserts the error is `NotFound` for `entity`.
    fn assert_not_found(&self, entity: &str);

    /// Asserts the error is a retryable store failure.
    fn assert_store_unavailable(&self);
}

impl CoreErrorAssertions for CoreError {
    fn assert_forbidden(&self) {
        assert!(self.is_forbidden(), "expected Forbidden, got {:?}", self);
    }

    fn assert_conflict(&self, kind: ConflictKind) {
        match self {
            CoreError::Conflict { kind: actual, .. } => assert_eq!(*actual, kind),
            other => panic!("expected Conflict({:?}), got {:?}", kind, other),
        }
    }

    fn assert_not_found(&self, entity: &str) {
        match self {
            CoreError::NotFound { entity: actual, .. } => assert_eq!(*actual, entity),
            other => panic!("expected NotFound({}), got {:?}", entity, other),
        }
    }

    fn assert_store_unavailable(&self) {
        assert!(
            self.is_retryable(),
            "expected StoreUnavailable, got {:?}",
            self
        );
    }
}

// =============================================================================
// RoleSet Assertions
// =============================================================================

/// Assertion helpers for [`RoleSet`].
pub trait RoleSetAssertions {
    /// Asserts the set holds exactly `expected`.
    fn assert_exactly(&self, expected: &[&str]);
}

impl RoleSetAssertions for RoleSet {
    fn assert_exactly(&self, expected: &[&str]) {
        let mut actual = self.names();
        actual.sort_unstable();
        let mut expected = expected.to_vec();
        expected.sort_unstable();
        assert_eq!(actual, expected, "role set mismatch");
    }
}
