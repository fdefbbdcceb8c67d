// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Coffee Shop API - drinks service with permission-gated routes
//!
//! Protected routes accept Auth0 RS256 access tokens; the `permissions`
//! claim decides which drink operations a caller may run.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token extraction, JWKS key resolution, verification, permission gate
//! - `config` - Environment configuration
//! - `store` - In-memory drink store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
pub mod telemetry;
