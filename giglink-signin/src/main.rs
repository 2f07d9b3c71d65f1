//! GigLink Federated Sign-In Service
//!
//! Verifies Google/Apple identity credentials and resolves them into
//! application sessions, with explicit link confirmation when an email
//! collides with an existing password account.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use giglink_core::{ClientAssertionConfig, TokenSigner};
use giglink_signin::{
    routes, AppState, Config, HttpCodeExchanger, HttpKeyFetcher, InMemoryAccountStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "giglink_signin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(port = config.port, "Loaded configuration");

    let signer = TokenSigner::new(&config.session_secret);

    // Apple's web flow needs a client assertion for the code exchange
    let apple_assertion = config.apple_signing.as_ref().and_then(|signing| {
        config
            .apple
            .client_ids
            .first()
            .map(|client_id| ClientAssertionConfig {
                team_id: signing.team_id.clone(),
                client_id: client_id.clone(),
                key_id: signing.key_id.clone(),
                private_key_pem: signing.private_key_pem.clone(),
            })
    });
    let exchanger = HttpCodeExchanger::new(apple_assertion, config.apple.redirect_uri.clone());

    // Create app state
    let state = Arc::new(AppState::new(
        InMemoryAccountStore::new(),
        signer,
        HttpKeyFetcher::new(),
        exchanger,
        config.google.clone(),
        config.apple.clone(),
    ));

    // Create router
    let app = routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Sign-in service listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
