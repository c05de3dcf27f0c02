use std::net::SocketAddr;

use anyhow::Context;
use anyhow::Result;
use community_referrals::{AppState, Config, init_pool, init_router, run_migrations};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let pool = init_pool(&config).await?;
    run_migrations(&pool).await?;

    let app = init_router(AppState::from_pool(pool));

    let addr: SocketAddr = ([0, 0, 0, 0], config.server_port).into();
    let listener = TcpListener::bind(addr).await?;

    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
