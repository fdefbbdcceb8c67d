// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission gate middleware for Axum.
//!
//! A gate pairs the shared [`Authorizer`] with the permission one route
//! requires. Layer it onto the route; the handler then reads the verified
//! claims with the [`Claims`](super::Claims) extractor.
//!
//! ```rust,ignore
//! let route = post(drinks::create_drink).route_layer(
//!     axum::middleware::from_fn_with_state(
//!         state.authorizer.gate(permissions::POST_DRINKS),
//!         require_permission,
//!     ),
//! );
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::Algorithm;

use super::extractor::bearer_token;
use super::jwks::{JwksManager, DEFAULT_CACHE_TTL, DEFAULT_FETCH_TIMEOUT};
use super::permissions::check_permissions;
use super::verifier::verify_token;
use super::{AuthError, ClaimSet};

/// Authorization configuration, fixed at start-up.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Authority domain, e.g. `coffee.eu.auth0.com`
    pub domain: String,
    /// Expected `aud`
    pub audience: String,
    /// Expected `iss`, derived from the domain
    pub issuer: String,
    /// Key set location, derived from the domain
    pub jwks_url: String,
    /// Accepted signature algorithms
    pub algorithms: Vec<Algorithm>,
    /// Clock skew tolerance for `exp`/`nbf`, in seconds
    pub leeway_seconds: u64,
    /// Key set cache TTL; zero fetches on every request
    pub cache_ttl: Duration,
    /// Timeout for the key set request
    pub fetch_timeout: Duration,
}

impl AuthConfig {
    /// Create a configuration for `domain` and `audience`.
    ///
    /// Issuer becomes `https://<domain>/` and the key set is read from
    /// `https://<domain>/.well-known/jwks.json`.
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            issuer: format!("https://{domain}/"),
            jwks_url: format!("https://{domain}/.well-known/jwks.json"),
            domain,
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            leeway_seconds: 0,
            cache_ttl: DEFAULT_CACHE_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Read keys from somewhere other than the derived URL.
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// Runs the full authorization chain for a request.
#[derive(Clone)]
pub struct Authorizer {
    config: Arc<AuthConfig>,
    jwks: JwksManager,
}

impl Authorizer {
    pub fn new(config: AuthConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;
        let jwks = JwksManager::with_client(client, config.jwks_url.clone())
            .with_cache_ttl(config.cache_ttl);
        Ok(Self {
            config: Arc::new(config),
            jwks,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn jwks(&self) -> &JwksManager {
        &self.jwks
    }

    /// Extract, resolve, verify, then check `permission`.
    pub async fn authorize(
        &self,
        header: Option<&HeaderValue>,
        permission: &str,
    ) -> Result<ClaimSet, AuthError> {
        let token = bearer_token(header)?;
        let key = self.jwks.resolve(token).await?;
        let claims = verify_token(token, &key, &self.config)?;
        check_permissions(permission, &claims)?;
        Ok(claims)
    }

    /// Gate state for a route that requires `permission`.
    pub fn gate(&self, permission: &'static str) -> PermissionGate {
        if permission.is_empty() {
            tracing::warn!("permission gate created without a required permission");
        }
        PermissionGate {
            authorizer: self.clone(),
            permission,
        }
    }
}

/// Middleware state: who verifies, and what they must grant.
#[derive(Clone)]
pub struct PermissionGate {
    authorizer: Authorizer,
    permission: &'static str,
}

impl PermissionGate {
    pub fn permission(&self) -> &'static str {
        self.permission
    }
}

/// Permission gate middleware function.
///
/// Rejections carry only the error's status and fixed description.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request.headers().get(AUTHORIZATION);

    match gate.authorizer.authorize(header, gate.permission).await {
        Ok(claims) => {
            tracing::debug!(
                permission = gate.permission,
                subject = claims.subject().unwrap_or("-"),
                "request authorized"
            );
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => {
            match &err {
                AuthError::KeySetUnavailable(detail) => {
                    tracing::error!(%detail, "signing keys unavailable");
                }
                other => tracing::info!(
                    code = other.code(),
                    status = other.status_code().as_u16(),
                    permission = gate.permission,
                    reason = %other,
                    "request rejected"
                ),
            }
            err.into_response()
        }
    }
}
