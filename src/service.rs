use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::SessionContext;
use crate::store::{ReferralStore, StoreError, UserLookup};
use crate::types::{ReferralRequest, ReferralView, User};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid id / code / version / state.")]
    InvalidCreate,
    #[error("Invalid id / code / version / referrer / state.")]
    InvalidUpdate,
    #[error("Insufficient privilege.")]
    InsufficientPrivilege,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fetch, create and update for community referrals.
#[derive(Clone)]
pub struct ReferralService {
    referrals: Arc<dyn ReferralStore>,
    users: Arc<dyn UserLookup>,
}

impl ReferralService {
    pub fn new(referrals: Arc<dyn ReferralStore>, users: Arc<dyn UserLookup>) -> Self {
        Self { referrals, users }
    }

    /// Looks up a referral by the id and code pair; no session is needed.
    pub async fn fetch(&self, id: i64, code: Uuid) -> Result<Option<ReferralView>, ServiceError> {
        let referral = self.referrals.select_by_id_and_code(id, code).await?;
        Ok(referral.as_ref().map(ReferralView::from))
    }

    /// Creates an `OPEN` referral with the session user as referrer.
    pub async fn create(
        &self,
        request: ReferralRequest,
        session: &SessionContext,
    ) -> Result<ReferralView, ServiceError> {
        let draft = request.into_create().ok_or(ServiceError::InvalidCreate)?;

        let user = self.session_user(session).await?;
        let referral = draft.into_new_referral(&user, Utc::now());
        let created = self.referrals.create(referral).await?;

        info!(referral_id = created.id, user_id = user.id, "referral created");
        Ok(ReferralView::from(&created))
    }

    /// Replaces a referral's state and referrer. Admin sessions only.
    pub async fn update(
        &self,
        request: ReferralRequest,
        session: &SessionContext,
    ) -> Result<ReferralView, ServiceError> {
        let update = request.into_update().ok_or(ServiceError::InvalidUpdate)?;
        if !session.is_admin() {
            return Err(ServiceError::InsufficientPrivilege);
        }

        // State transitions are not checked against the stored state.
        let referrer = self.users.select_by_id(update.referrer).await?;
        let updated_by = self.session_user(session).await?;
        let referral = update.into_referral(&referrer, &updated_by, Utc::now());
        let updated = self.referrals.update(referral).await?;

        info!(
            referral_id = updated.id,
            version = updated.version,
            user_id = updated_by.id,
            "referral updated"
        );
        Ok(ReferralView::from(&updated))
    }

    async fn session_user(&self, session: &SessionContext) -> Result<User, ServiceError> {
        let Some(id) = session.user_id else {
            debug!("session carries no user id");
            return Err(StoreError::UserNotFound { id: None }.into());
        };
        Ok(self.users.select_by_id(id).await?)
    }
}
