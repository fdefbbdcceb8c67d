// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signature and registered-claim verification.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use super::jwks::SigningKey;
use super::middleware::AuthConfig;
use super::{AuthError, ClaimSet};

/// Verify `token` against `key` and return its full claim set.
pub fn verify_token(
    token: &str,
    key: &SigningKey,
    config: &AuthConfig,
) -> Result<ClaimSet, AuthError> {
    if key.kty != "RSA" {
        return Err(AuthError::UnparseableToken(format!(
            "key '{}' has unsupported type '{}'",
            key.kid, key.kty
        )));
    }

    let decoding_key = DecodingKey::from_rsa_components(&key.n, &key.e)
        .map_err(|e| AuthError::UnparseableToken(format!("bad RSA components: {e}")))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.algorithms = config.algorithms.clone();
    validation.set_audience(&[&config.audience]);
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = config.leeway_seconds;

    let token_data = decode::<Map<String, Value>>(token, &decoding_key, &validation)
        .map_err(|e| classify(e.into_kind()))?;

    Ok(ClaimSet::new(token_data.claims))
}

fn classify(kind: ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature => AuthError::InvalidClaims(format!("{kind:?}")),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::InvalidClaims(format!("missing claim '{claim}'"))
        }
        other => AuthError::UnparseableToken(format!("{other:?}")),
    }
}
