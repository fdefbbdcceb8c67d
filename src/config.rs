// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup and stays
//! constant afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH0_DOMAIN` | Token issuer domain | Required |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `AUTH_ALGORITHMS` | Comma-separated accepted algorithms (RSA family) | `RS256` |
//! | `JWKS_URL` | Override for `https://<domain>/.well-known/jwks.json` | Derived |
//! | `JWKS_CACHE_TTL_SECS` | Key set cache TTL, `0` fetches per request | `300` |
//! | `JWKS_FETCH_TIMEOUT_SECS` | Key set request timeout | `10` |
//! | `JWT_LEEWAY_SECS` | Clock skew tolerance for `exp`/`nbf` | `0` |
//! | `HOST` | Server bind address (IPv4 or IPv6 literal) | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

use crate::auth::AuthConfig;

pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";
pub const AUTH_ALGORITHMS_ENV: &str = "AUTH_ALGORITHMS";
pub const JWKS_URL_ENV: &str = "JWKS_URL";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const JWKS_FETCH_TIMEOUT_ENV: &str = "JWKS_FETCH_TIMEOUT_SECS";
pub const JWT_LEEWAY_ENV: &str = "JWT_LEEWAY_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 8080;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    pub log_format: LogFormat,
    pub auth: AuthConfig,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let domain = var(AUTH0_DOMAIN_ENV).ok_or(ConfigError::Missing(AUTH0_DOMAIN_ENV))?;
        let domain = domain.trim().trim_end_matches('/').to_string();
        if domain.contains("://") || domain.contains('/') {
            return Err(invalid(AUTH0_DOMAIN_ENV, &domain, "expected a bare host name"));
        }

        let audience = var(API_AUDIENCE_ENV).ok_or(ConfigError::Missing(API_AUDIENCE_ENV))?;

        let mut auth = AuthConfig::new(domain, audience.trim());

        if let Some(raw) = var(AUTH_ALGORITHMS_ENV) {
            auth = auth.with_algorithms(parse_algorithms(&raw)?);
        }

        if let Some(raw) = var(JWKS_URL_ENV) {
            let url = Url::parse(raw.trim())
                .map_err(|e| invalid(JWKS_URL_ENV, &raw, &e.to_string()))?;
            auth = auth.with_jwks_url(url.as_str());
        }
        Url::parse(&auth.jwks_url)
            .map_err(|e| invalid(AUTH0_DOMAIN_ENV, &auth.domain, &e.to_string()))?;

        if let Some(secs) = parse_value::<u64>(&var, JWKS_CACHE_TTL_ENV)? {
            auth = auth.with_cache_ttl(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_value::<u64>(&var, JWKS_FETCH_TIMEOUT_ENV)? {
            auth = auth.with_fetch_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_value::<u64>(&var, JWT_LEEWAY_ENV)? {
            auth = auth.with_leeway(secs);
        }

        let log_format = match var(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(invalid(LOG_FORMAT_ENV, other, "expected 'json' or 'pretty'")),
        };

        Ok(Self {
            host: parse_value::<IpAddr>(&var, HOST_ENV)?.unwrap_or(DEFAULT_HOST),
            port: parse_value::<u16>(&var, PORT_ENV)?.unwrap_or(DEFAULT_PORT),
            log_format,
            auth,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn invalid(name: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| invalid(name, &raw, &e.to_string()))
        })
        .transpose()
}

/// Parse a comma-separated algorithm list. Keys come from an RSA JWKS, so
/// only RSA algorithms are accepted.
fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let algorithm = Algorithm::from_str(name)
            .map_err(|e| invalid(AUTH_ALGORITHMS_ENV, name, &e.to_string()))?;
        match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => algorithms.push(algorithm),
            _ => return Err(invalid(AUTH_ALGORITHMS_ENV, name, "not an RSA algorithm")),
        }
    }

    if algorithms.is_empty() {
        return Err(invalid(AUTH_ALGORITHMS_ENV, raw, "no algorithm given"));
    }
    Ok(algorithms)
}
