// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Module
//!
//! This module gates the drinks API on Auth0-issued JWT permissions.
//!
//! ## Auth Flow
//!
//! 1. Frontend authenticates the user with Auth0
//! 2. Frontend sends `Authorization: Bearer <access token>`
//! 3. Server, per protected route:
//!    - Extracts the bearer token from the header
//!    - Resolves the signing key by `kid` from the Auth0 JWKS
//!    - Verifies the RS256 signature, expiry, issuer, audience
//!    - Checks the route's permission against the `permissions` claim
//! 4. The handler receives the verified claims
//!
//! ## Failure Surface
//!
//! Every failure is one [`AuthError`] variant with a fixed status and
//! description; nothing else leaves the gate.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod permissions;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::ClaimSet;
pub use error::AuthError;
pub use extractor::{bearer_token, Claims};
pub use jwks::{JwksManager, SigningKey};
pub use middleware::{require_permission, AuthConfig, Authorizer, PermissionGate};
pub use permissions::check_permissions;
pub use verifier::verify_token;
