//! Persistence for referrals and the user lookup they depend on.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::{NewReferral, Referral, User};

const REFERRAL_COLUMNS: &str = "id, code, state, version, referrer_id, updated_by_id, updated_on";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("User not found.")]
    UserNotFound { id: Option<i64> },
    #[error("Referral {id} with version {version} does not exist or was modified concurrently.")]
    StaleReferral { id: i64, version: i32 },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ReferralStore: Send + Sync + 'static {
    async fn select_by_id_and_code(
        &self,
        id: i64,
        code: Uuid,
    ) -> Result<Option<Referral>, StoreError>;

    /// Stores a new referral, assigning its id, code and version.
    async fn create(&self, referral: NewReferral) -> Result<Referral, StoreError>;

    /// Stores a changed referral. The given version must match the stored one;
    /// the returned referral carries the next version.
    async fn update(&self, referral: Referral) -> Result<Referral, StoreError>;
}

#[async_trait]
pub trait UserLookup: Send + Sync + 'static {
    /// Fails with [`StoreError::UserNotFound`] when no user has this id.
    async fn select_by_id(&self, id: i64) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgReferralStore {
    pool: PgPool,
}

impl PgReferralStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferralStore for PgReferralStore {
    async fn select_by_id_and_code(
        &self,
        id: i64,
        code: Uuid,
    ) -> Result<Option<Referral>, StoreError> {
        let referral = sqlx::query_as::<_, Referral>(&format!(
            "SELECT {REFERRAL_COLUMNS} FROM referrals WHERE id = $1 AND code = $2"
        ))
        .bind(id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(referral)
    }

    async fn create(&self, referral: NewReferral) -> Result<Referral, StoreError> {
        let created = sqlx::query_as::<_, Referral>(&format!(
            r#"INSERT INTO referrals (code, state, version, referrer_id, updated_by_id, updated_on)
               VALUES ($1, $2, 0, $3, $4, $5)
               RETURNING {REFERRAL_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&referral.state)
        .bind(referral.referrer_id)
        .bind(referral.updated_by_id)
        .bind(referral.updated_on)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, referral: Referral) -> Result<Referral, StoreError> {
        let updated = sqlx::query_as::<_, Referral>(&format!(
            r#"UPDATE referrals
               SET state = $1, referrer_id = $2, updated_by_id = $3, updated_on = $4,
                   version = version + 1
               WHERE id = $5 AND code = $6 AND version = $7
               RETURNING {REFERRAL_COLUMNS}"#
        ))
        .bind(&referral.state)
        .bind(referral.referrer_id)
        .bind(referral.updated_by_id)
        .bind(referral.updated_on)
        .bind(referral.id)
        .bind(referral.code)
        .bind(referral.version)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or(StoreError::StaleReferral {
            id: referral.id,
            version: referral.version,
        })
    }
}

#[derive(Clone)]
pub struct PgUserLookup {
    pool: PgPool,
}

impl PgUserLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserLookup for PgUserLookup {
    async fn select_by_id(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(r#"SELECT id, type FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::UserNotFound { id: Some(id) })
    }
}
