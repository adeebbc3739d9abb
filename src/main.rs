//! CollabMarket Auth Gate
//! Mission: Sessions, bearer-token authentication and role gates for the
//! influencer-marketing marketplace API

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use collabmarket_auth::{
    api::DirectoryState,
    app::build_router,
    auth::{AuthState, TokenService, UserStore},
    config::{load_env, AppConfig},
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    info!("🚀 CollabMarket auth gate starting");

    let config = AppConfig::from_env()?;

    let user_store = Arc::new(UserStore::new(&config.auth_db_path)?);
    let tokens = Arc::new(TokenService::new(
        config.jwt_secret.clone(),
        config.token_ttl_secs,
    ));

    let auth_state = AuthState::new(user_store.clone(), tokens.clone());
    let directory_state = DirectoryState::new(
        user_store,
        Duration::from_secs(config.directory_cache_ttl_secs),
    );

    info!("🔐 Accounts database at: {}", config.auth_db_path);
    info!("⏱  Session tokens live for {}s", config.token_ttl_secs);

    let app = build_router(auth_state, directory_state, tokens);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collabmarket_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
