use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;

use crate::extract::{INVALID_CODE, parse_code};

/// The only state a referral may be created in.
pub const STATE_OPEN: &str = "OPEN";
/// The user type allowed to update referrals.
pub const USER_TYPE_ADMIN: &str = "ADMIN";

/// A user of the event-management application.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    /// The ID of the user.
    pub id: i64,
    /// The user type, e.g. `ADMIN`.
    #[sqlx(rename = "type")]
    pub user_type: String,
}

/// A community referral.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Referral {
    /// The ID of the referral.
    pub id: i64,
    /// The referral code, shared together with the ID.
    pub code: Uuid,
    /// The lifecycle state of the referral.
    pub state: String,
    /// The optimistic-concurrency version.
    pub version: i32,
    /// The ID of the user who referred.
    pub referrer_id: i64,
    /// The ID of the user who last changed the referral.
    pub updated_by_id: i64,
    /// The timestamp of the last change.
    pub updated_on: DateTime<Utc>,
}

/// A referral that has not been stored yet. The store assigns id, code and version.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReferral {
    pub state: String,
    pub referrer_id: i64,
    pub updated_by_id: i64,
    pub updated_on: DateTime<Utc>,
}

/// The body accepted by `POST /referral` and `PUT /referral`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRequest {
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "canonical_code")]
    pub code: Option<Uuid>,
    pub version: Option<i32>,
    pub state: Option<String>,
    pub referrer: Option<i64>,
}

fn canonical_code<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_code(&raw).ok_or_else(|| de::Error::custom(INVALID_CODE)))
        .transpose()
}

/// The fields a create request is allowed to carry.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateReferral {
    pub state: String,
}

/// A request with every field an update needs.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReferral {
    pub id: i64,
    pub code: Uuid,
    pub version: i32,
    pub state: String,
    pub referrer: i64,
}

impl ReferralRequest {
    /// Returns `None` when the request carries a server-assigned field or a
    /// state other than `OPEN`.
    pub fn into_create(self) -> Option<CreateReferral> {
        if self.id.is_some() || self.code.is_some() || self.version.is_some() {
            return None;
        }
        match self.state {
            Some(state) if state == STATE_OPEN => Some(CreateReferral { state }),
            _ => None,
        }
    }

    /// Returns `None` unless id, code, version, state and referrer are all present.
    pub fn into_update(self) -> Option<UpdateReferral> {
        Some(UpdateReferral {
            id: self.id?,
            code: self.code?,
            version: self.version?,
            state: self.state?,
            referrer: self.referrer?,
        })
    }
}

impl CreateReferral {
    pub fn into_new_referral(self, user: &User, now: DateTime<Utc>) -> NewReferral {
        NewReferral {
            state: self.state,
            referrer_id: user.id,
            updated_by_id: user.id,
            updated_on: now,
        }
    }
}

impl UpdateReferral {
    pub fn into_referral(self, referrer: &User, updated_by: &User, now: DateTime<Utc>) -> Referral {
        Referral {
            id: self.id,
            code: self.code,
            state: self.state,
            version: self.version,
            referrer_id: referrer.id,
            updated_by_id: updated_by.id,
            updated_on: now,
        }
    }
}

/// The referral fields returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralView {
    pub id: i64,
    pub code: Uuid,
    pub state: String,
    pub version: i32,
    pub referrer: i64,
    pub updated_by: i64,
    pub updated_on: DateTime<Utc>,
}

impl From<&Referral> for ReferralView {
    fn from(referral: &Referral) -> Self {
        Self {
            id: referral.id,
            code: referral.code,
            state: referral.state.clone(),
            version: referral.version,
            referrer: referral.referrer_id,
            updated_by: referral.updated_by_id,
            updated_on: referral.updated_on,
        }
    }
}
