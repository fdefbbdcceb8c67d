// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token extraction and the claims extractor for gated handlers.
//!
//! The permission gate (see `middleware.rs`) stores the verified [`ClaimSet`]
//! in the request extensions. Handlers behind the gate receive it with:
//!
//! ```rust,ignore
//! async fn create_drink(
//!     Claims(claims): Claims,
//!     State(state): State<AppState>,
//!     Json(request): Json<CreateDrinkRequest>,
//! ) -> Result<Json<DrinksResponse>, ApiError> {
//!     // claims.subject(), claims.permissions() ...
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderValue},
};

use super::{AuthError, ClaimSet};
use crate::error::ApiError;

/// Pull the bearer token out of an `Authorization` header value.
///
/// The scheme is matched case-insensitively; the token is returned verbatim.
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let header = match header {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AuthError::AuthHeaderMissing),
    };

    let raw = header.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
    if raw.trim().is_empty() {
        return Err(AuthError::AuthHeaderMissing);
    }

    let mut parts = raw.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

/// Verified claims of the current request.
///
/// Only available on routes wrapped by the permission gate.
pub struct Claims(pub ClaimSet);

impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ClaimSet>()
            .cloned()
            .map(Claims)
            .ok_or_else(|| {
                tracing::error!(path = %parts.uri.path(), "claims requested on an ungated route");
                ApiError::internal("Authorization context unavailable.")
            })
    }
}
