// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified token claims.

use serde::Serialize;
use serde_json::{Map, Value};

use super::AuthError;

/// Decoded, verified claim set of one request.
///
/// Holds every claim the token carried, not only the ones this service reads.
/// There is no way to mutate it once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClaimSet {
    claims: Map<String, Value>,
}

impl ClaimSet {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    /// Build from an arbitrary JSON value; only objects are claim sets.
    pub fn from_value(value: Value) -> Result<Self, AuthError> {
        match value {
            Value::Object(claims) => Ok(Self::new(claims)),
            other => Err(AuthError::UnparseableToken(format!(
                "claims payload is not an object: {other}"
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// `sub` claim, if it is a string.
    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// Raw `permissions` claim.
    pub fn permissions_claim(&self) -> Option<&Value> {
        self.get("permissions")
    }

    /// String entries of the `permissions` claim, in token order.
    ///
    /// Returns `None` when the claim is absent or not an array. Non-string
    /// entries are skipped.
    pub fn permissions(&self) -> Option<Vec<&str>> {
        self.permissions_claim()
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(Value::as_str).collect())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.claims
    }
}
