// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission strings and the permission check.
//!
//! ## Drink Permissions
//!
//! - `get:drinks-detail` - read full recipes
//! - `post:drinks` - create drinks
//! - `patch:drinks` - edit drinks
//! - `delete:drinks` - remove drinks

use serde_json::Value;

use super::{AuthError, ClaimSet};

pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub const POST_DRINKS: &str = "post:drinks";
pub const PATCH_DRINKS: &str = "patch:drinks";
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Check `required` against the claim set's `permissions` claim.
///
/// An empty `required` means "any authenticated caller with a non-empty
/// permission list".
pub fn check_permissions(required: &str, claims: &ClaimSet) -> Result<(), AuthError> {
    let granted = match claims.permissions_claim() {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => return Err(AuthError::NoPermissionsInPayload),
    };

    if required.is_empty() {
        return Ok(());
    }

    if granted.iter().any(|entry| entry.as_str() == Some(required)) {
        Ok(())
    } else {
        Err(AuthError::UserNotAllowed(required.to_string()))
    }
}
