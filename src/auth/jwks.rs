// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching, caching and key selection.
//!
//! ## Behaviour
//!
//! - The key set is fetched from `https://<domain>/.well-known/jwks.json`
//! - With a non-zero TTL the set is cached process-wide; concurrent misses
//!   wait on a single in-flight fetch
//! - With a zero TTL every lookup fetches the set again
//! - A `kid` missing from a cached set triggers one refresh, so rotated keys
//!   are picked up without waiting for the TTL
//! - Entries that are not well-formed key objects are skipped
//! - Transport and decoding failures surface as `KeySetUnavailable`, never as
//!   a missing key

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::decode_header;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default timeout for the JWKS request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Public key descriptor used for signature verification.
///
/// Carries exactly the fields needed to rebuild an RSA key; anything else the
/// JWKS entry had is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    pub kty: String,
    pub kid: String,
    #[serde(rename = "use")]
    pub usage: Option<String>,
    pub n: String,
    pub e: String,
}

/// JWKS document as served by the issuer.
#[derive(Debug, Clone, Deserialize)]
struct KeySet {
    #[serde(default)]
    keys: Vec<serde_json::Value>,
}

/// One entry of the key set. Unknown members are ignored by serde.
#[derive(Debug, Clone, Deserialize)]
struct KeySetEntry {
    kid: Option<String>,
    kty: Option<String>,
    #[serde(rename = "use")]
    usage: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

/// JWKS cache entry.
struct CacheEntry {
    keys: Arc<Vec<KeySetEntry>>,
    fetched_at: Instant,
}

/// Resolves the signing key for a token from the issuer's JWKS.
#[derive(Clone)]
pub struct JwksManager {
    /// JWKS URL
    jwks_url: String,
    /// Cache TTL, zero disables the cache
    cache_ttl: Duration,
    /// Cached key set
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// Held while a fetch is in flight
    fetch_lock: Arc<Mutex<()>>,
    /// HTTP client
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a manager with the default cache TTL and fetch timeout.
    pub fn new(jwks_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_FETCH_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, jwks_url))
    }

    /// Create with a preconfigured HTTP client.
    pub fn with_client(client: reqwest::Client, jwks_url: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            fetch_lock: Arc::new(Mutex::new(())),
            client,
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Resolve the signing key for `token` from its unverified header.
    ///
    /// The `kid` check happens before any network access.
    pub async fn resolve(&self, token: &str) -> Result<SigningKey, AuthError> {
        let header = decode_header(token).map_err(|e| {
            AuthError::UnparseableToken(format!("unreadable token header: {e}"))
        })?;
        let kid = header.kid.ok_or(AuthError::InvalidAuthenticationHeader)?;
        self.signing_key(&kid).await
    }

    /// Select the first key set entry whose `kid` matches.
    pub async fn signing_key(&self, kid: &str) -> Result<SigningKey, AuthError> {
        let (keys, fresh) = self.key_set().await?;
        if let Some(entry) = find(&keys, kid) {
            return reduce(entry, kid);
        }
        if fresh {
            return Err(AuthError::KeyNotFound(kid.to_string()));
        }

        tracing::debug!(kid, "kid not in cached JWKS, refreshing");
        let keys = self.refresh_stale(&keys).await?;
        let entry = find(&keys, kid).ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))?;
        reduce(entry, kid)
    }

    /// Fetch JWKS, going through the cache when enabled.
    ///
    /// The flag is true when the set was fetched during this call.
    async fn key_set(&self) -> Result<(Arc<Vec<KeySetEntry>>, bool), AuthError> {
        if self.cache_ttl.is_zero() {
            return Ok((Arc::new(self.fetch_jwks().await?), true));
        }

        if let Some(keys) = self.cached().await {
            return Ok((keys, false));
        }

        let _in_flight = self.fetch_lock.lock().await;

        // Another task may have refreshed while we waited for the lock.
        if let Some(keys) = self.cached().await {
            return Ok((keys, true));
        }

        Ok((self.store_fetched().await?, true))
    }

    /// Replace `stale` with a freshly fetched set, unless another task
    /// already did while we waited for the lock.
    async fn refresh_stale(
        &self,
        stale: &Arc<Vec<KeySetEntry>>,
    ) -> Result<Arc<Vec<KeySetEntry>>, AuthError> {
        let _in_flight = self.fetch_lock.lock().await;

        if let Some(keys) = self.cached().await {
            if !Arc::ptr_eq(&keys, stale) {
                return Ok(keys);
            }
        }

        self.store_fetched().await
    }

    /// Fetch and cache the set. Callers hold `fetch_lock`.
    async fn store_fetched(&self) -> Result<Arc<Vec<KeySetEntry>>, AuthError> {
        let keys = Arc::new(self.fetch_jwks().await?);
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }

    async fn cached(&self) -> Option<Arc<Vec<KeySetEntry>>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.keys.clone())
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch_jwks(&self) -> Result<Vec<KeySetEntry>, AuthError> {
        tracing::debug!(url = %self.jwks_url, "fetching JWKS");

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeySetUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwks: KeySet = response
            .json()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        let total = jwks.keys.len();
        let keys: Vec<KeySetEntry> = jwks
            .keys
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();

        if keys.len() < total {
            tracing::debug!(skipped = total - keys.len(), "skipped malformed JWKS entries");
        }
        tracing::debug!(keys = keys.len(), "JWKS fetched");
        Ok(keys)
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let _in_flight = self.fetch_lock.lock().await;
        self.store_fetched().await?;
        Ok(())
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        self.cached().await.is_some()
    }
}

fn find<'a>(keys: &'a [KeySetEntry], kid: &str) -> Option<&'a KeySetEntry> {
    keys.iter().find(|entry| entry.kid.as_deref() == Some(kid))
}

/// Reduce a matched entry to the verification descriptor.
fn reduce(entry: &KeySetEntry, kid: &str) -> Result<SigningKey, AuthError> {
    let missing = |field: &str| {
        AuthError::UnparseableToken(format!("JWKS key '{kid}' has no '{field}' member"))
    };

    Ok(SigningKey {
        kty: entry.kty.clone().ok_or_else(|| missing("kty"))?,
        kid: kid.to_string(),
        usage: entry.usage.clone(),
        n: entry.n.clone().ok_or_else(|| missing("n"))?,
        e: entry.e.clone().ok_or_else(|| missing("e"))?,
    })
}
