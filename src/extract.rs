use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request, rejection::JsonRejection},
    http::request::Parts,
};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::error::ApiError;

pub const INVALID_CODE: &str = "Invalid code.";
const INVALID_ID: &str = "Invalid id.";

static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .expect("referral code pattern compiles")
});

/// Parses a referral code, accepting only the hyphenated 8-4-4-4-12 hex form.
pub fn parse_code(raw: &str) -> Option<Uuid> {
    if !CODE_PATTERN.is_match(raw) {
        return None;
    }
    Uuid::parse_str(raw).ok()
}

/// `/{referral_id}/{referral_code}`, validated before the handler runs.
#[derive(Debug)]
pub struct ReferralPath {
    pub id: i64,
    pub code: Uuid,
}

impl<S> FromRequestParts<S> for ReferralPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((id, code)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest(INVALID_ID.into()))?;

        let id = id
            .parse::<i64>()
            .map_err(|_| ApiError::BadRequest(INVALID_ID.into()))?;
        let code = parse_code(&code).ok_or_else(|| ApiError::BadRequest(INVALID_CODE.into()))?;

        Ok(Self { id, code })
    }
}

/// JSON body whose rejections render as a FAILURE envelope.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}
