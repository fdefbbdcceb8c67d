// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors.
//!
//! Every failure in the permission gate maps to exactly one variant, and every
//! variant maps to one fixed `(code, status, description)` triple. The
//! description is the only text a caller ever sees.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Authorization error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No (or an empty) authorization header
    #[error("authorization header missing")]
    AuthHeaderMissing,
    /// Header is not `Bearer <token>`
    #[error("authorization header is not in bearer format")]
    InvalidAuthHeader,
    /// Token header carries no `kid`
    #[error("token header has no key id")]
    InvalidAuthenticationHeader,
    /// No JWKS entry carries the token's `kid`
    #[error("no signing key with kid '{0}'")]
    KeyNotFound(String),
    /// `exp` is in the past
    #[error("token expired")]
    TokenExpired,
    /// Audience, issuer or another registered claim did not validate
    #[error("token claims rejected: {0}")]
    InvalidClaims(String),
    /// Anything else the decoder refused
    #[error("token could not be parsed: {0}")]
    UnparseableToken(String),
    /// `permissions` claim absent or empty
    #[error("token carries no permissions")]
    NoPermissionsInPayload,
    /// Required permission not granted
    #[error("permission '{0}' not granted")]
    UserNotAllowed(String),
    /// JWKS endpoint unreachable or returned garbage
    #[error("failed to fetch JWKS: {0}")]
    KeySetUnavailable(String),
}

impl AuthError {
    /// Symbolic error code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AuthHeaderMissing => "auth_header_missing",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidAuthenticationHeader => "invalid_authentication_header",
            AuthError::KeyNotFound(_) | AuthError::UnparseableToken(_) => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::NoPermissionsInPayload => "no_permissions_in_payload",
            AuthError::UserNotAllowed(_) => "user_not_allowed",
            AuthError::KeySetUnavailable(_) => "jwks_unavailable",
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AuthHeaderMissing
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidAuthenticationHeader
            | AuthError::TokenExpired
            | AuthError::InvalidClaims(_)
            | AuthError::NoPermissionsInPayload => StatusCode::UNAUTHORIZED,
            AuthError::KeyNotFound(_) | AuthError::UnparseableToken(_) => StatusCode::BAD_REQUEST,
            AuthError::UserNotAllowed(_) => StatusCode::FORBIDDEN,
            AuthError::KeySetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Fixed, caller-facing description.
    pub fn description(&self) -> &'static str {
        match self {
            AuthError::AuthHeaderMissing => "Authorization header missing.",
            AuthError::InvalidAuthHeader => {
                "Authorization header must be in \"bearer\" token format."
            }
            AuthError::InvalidAuthenticationHeader => "Missing kid in token.",
            AuthError::KeyNotFound(_) => "Couldn't find a key with the right key id.",
            AuthError::TokenExpired => "Token expired.",
            AuthError::InvalidClaims(_) => {
                "Incorrect claims. Please, check the audience and issuer."
            }
            AuthError::UnparseableToken(_) => "Unable to parse authentication token.",
            AuthError::NoPermissionsInPayload => {
                "Authorization token doesn't contain permissions payload"
            }
            AuthError::UserNotAllowed(_) => "The user doesn't have the required permission",
            AuthError::KeySetUnavailable(_) => "Unable to fetch signing keys.",
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::new(err.status_code(), err.description())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
