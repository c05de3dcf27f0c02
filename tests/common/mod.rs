#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use community_referrals::{
    AppState, NewReferral, Referral, ReferralService, ReferralStore, StoreError, User, UserLookup,
};
use uuid::Uuid;

pub const ADMIN_ID: i64 = 1;
pub const MEMBER_ID: i64 = 2;
pub const OTHER_MEMBER_ID: i64 = 3;
pub const UNKNOWN_ID: i64 = 404;

#[derive(Default)]
pub struct MemoryReferrals {
    rows: Mutex<Vec<Referral>>,
    next_id: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryReferrals {
    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Default::default()
        }
    }

    pub fn insert(&self, referral: Referral) {
        self.rows.lock().unwrap().push(referral);
    }

    pub fn get(&self, id: i64) -> Option<Referral> {
        self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    pub fn writes(&self) -> usize {
        self.creates.load(Ordering::SeqCst) + self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReferralStore for MemoryReferrals {
    async fn select_by_id_and_code(
        &self,
        id: i64,
        code: Uuid,
    ) -> Result<Option<Referral>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.id == id && r.code == code).cloned())
    }

    async fn create(&self, referral: NewReferral) -> Result<Referral, StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let id = 100 + self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        let created = Referral {
            id,
            code: Uuid::new_v4(),
            state: referral.state,
            version: 0,
            referrer_id: referral.referrer_id,
            updated_by_id: referral.updated_by_id,
            updated_on: referral.updated_on,
        };
        self.insert(created.clone());
        Ok(created)
    }

    async fn update(&self, referral: Referral) -> Result<Referral, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut rows = self.rows.lock().unwrap();
        let stale = StoreError::StaleReferral {
            id: referral.id,
            version: referral.version,
        };
        let Some(row) = rows
            .iter_mut()
            .find(|r| r.id == referral.id && r.code == referral.code)
        else {
            return Err(stale);
        };
        if row.version != referral.version {
            return Err(stale);
        }
        *row = Referral {
            version: referral.version + 1,
            ..referral
        };
        Ok(row.clone())
    }
}

pub struct MemoryUsers {
    users: HashMap<i64, User>,
}

impl Default for MemoryUsers {
    fn default() -> Self {
        let users = [
            (ADMIN_ID, "ADMIN"),
            (MEMBER_ID, "MEMBER"),
            (OTHER_MEMBER_ID, "MEMBER"),
        ]
        .into_iter()
        .map(|(id, user_type)| {
            (
                id,
                User {
                    id,
                    user_type: user_type.to_string(),
                },
            )
        })
        .collect();
        Self { users }
    }
}

#[async_trait]
impl UserLookup for MemoryUsers {
    async fn select_by_id(&self, id: i64) -> Result<User, StoreError> {
        self.users
            .get(&id)
            .cloned()
            .ok_or(StoreError::UserNotFound { id: Some(id) })
    }
}

pub fn stored_referral(id: i64) -> Referral {
    Referral {
        id,
        code: Uuid::new_v4(),
        state: "OPEN".to_string(),
        version: 0,
        referrer_id: MEMBER_ID,
        updated_by_id: MEMBER_ID,
        updated_on: Utc::now(),
    }
}

pub fn service(referrals: Arc<MemoryReferrals>) -> ReferralService {
    ReferralService::new(referrals, Arc::new(MemoryUsers::default()))
}

pub fn app_state(referrals: Arc<MemoryReferrals>) -> AppState {
    AppState::new(service(referrals))
}
