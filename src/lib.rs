//! Community referral endpoints for the event-management application.

mod api;
mod config;
mod error;
mod extract;
mod responses;
mod service;
mod session;
mod store;
mod types;

use anyhow::Context;
use anyhow::Result;
pub use api::{AppState, init_router};
pub use config::Config;
pub use error::ApiError;
pub use responses::{REQUEST_ID_HEADER, Status};
pub use service::{ReferralService, ServiceError};
pub use session::{SessionContext, USER_ID_HEADER, USER_TYPE_HEADER};
pub use store::{PgReferralStore, PgUserLookup, ReferralStore, StoreError, UserLookup};
pub use types::{
    NewReferral, Referral, ReferralRequest, ReferralView, STATE_OPEN, USER_TYPE_ADMIN, User,
};
use sqlx::{PgPool, postgres::PgPoolOptions};

/// Initializes the database pool.
pub async fn init_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;
    Ok(pool)
}

/// Applies the schema in `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!()
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    Ok(())
}
