//! UserHub - Authenticated User-Profile API
//! Mission: Registration, login, and role-gated profile endpoints over JWT

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use userhub_backend::{
    api::create_router,
    auth::{AuthState, JwtHandler, UserStore},
    config::AppConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    let _ = dotenv();
    init_tracing();

    // Misconfiguration (short signing key, missing CORS origin) stops the
    // process here, before any request is served.
    let config = AppConfig::from_env()?;

    let user_store = Arc::new(UserStore::new(&config.auth_db_path)?);
    let jwt_handler = Arc::new(JwtHandler::from_config(&config));
    let state = AuthState::new(user_store, jwt_handler);

    info!("Authentication store ready at {}", config.auth_db_path);

    let app = create_router(state, &config)?;

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with an env-filterable subscriber
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "userhub_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
