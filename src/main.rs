// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use coffee_shop_api::{
    api::router, auth::Authorizer, config::Settings, state::AppState, store::InMemoryStore,
    telemetry,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    telemetry::init(settings.log_format);

    tracing::info!(
        domain = %settings.auth.domain,
        audience = %settings.auth.audience,
        jwks_url = %settings.auth.jwks_url,
        cache_ttl_secs = settings.auth.cache_ttl.as_secs(),
        "Loaded auth configuration"
    );

    let addr = settings.bind_addr();

    let authorizer = Authorizer::new(settings.auth).expect("Failed to create HTTP client");
    let state = AppState::new(InMemoryStore::new(), authorizer);
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!(%addr, "Coffee shop API listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
