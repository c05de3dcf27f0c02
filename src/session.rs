//! Identity of the caller, as forwarded by the session layer in front of this service.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
use crate::types::USER_TYPE_ADMIN;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_TYPE_HEADER: &str = "x-user-type";

const INVALID_SESSION: &str = "Invalid session.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: Option<i64>,
    pub user_type: Option<String>,
}

impl SessionContext {
    pub fn new(user_id: i64, user_type: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            user_type: Some(user_type.into()),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user_type.as_deref() == Some(USER_TYPE_ADMIN)
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, ApiError> {
    parts
        .headers
        .get(name)
        .map(|v| v.to_str())
        .transpose()
        .map_err(|_| ApiError::BadRequest(INVALID_SESSION.into()))
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)?
            .map(|raw| raw.trim().parse::<i64>())
            .transpose()
            .map_err(|_| ApiError::BadRequest(INVALID_SESSION.into()))?;
        let user_type = header(parts, USER_TYPE_HEADER)?.map(str::to_string);

        Ok(Self { user_id, user_type })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(req: Request<()>) -> Result<SessionContext, ApiError> {
        let (mut parts, _) = req.into_parts();
        SessionContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_both_headers() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "42")
            .header(USER_TYPE_HEADER, "ADMIN")
            .body(())
            .unwrap();

        let session = extract(req).await.unwrap();
        assert_eq!(session, SessionContext::new(42, "ADMIN"));
        assert!(session.is_admin());
    }

    #[tokio::test]
    async fn missing_headers_give_an_anonymous_session() {
        let session = extract(Request::builder().body(()).unwrap()).await.unwrap();
        assert_eq!(session, SessionContext::default());
        assert!(!session.is_admin());
    }

    #[tokio::test]
    async fn non_numeric_user_id_is_rejected() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "abc")
            .body(())
            .unwrap();
        assert!(matches!(extract(req).await, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn admin_check_is_exact() {
        assert!(!SessionContext::new(1, "admin").is_admin());
        assert!(!SessionContext::new(1, "MEMBER").is_admin());
    }
}
