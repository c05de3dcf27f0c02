use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use crate::responses::{RequestMeta, Status};
use crate::service::ServiceError;
use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound,
    Internal(String),
}

#[derive(Debug)]
pub struct ApiErrorWithMeta {
    error: ApiError,
    meta: RequestMeta,
}

impl ApiError {
    pub fn with_meta(self, meta: RequestMeta) -> ApiErrorWithMeta {
        ApiErrorWithMeta { error: self, meta }
    }

    fn render(self, request_id: Option<&str>) -> Response {
        let request_id = request_id.unwrap_or("-");
        let (status, message) = match self {
            ApiError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            ApiError::BadRequest(msg) => {
                warn!(request_id, "rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Internal(msg) => {
                error!(request_id, "internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = json!({
            "status": Status::Failure,
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidCreate
            | ServiceError::InvalidUpdate
            | ServiceError::InsufficientPrivilege
            | ServiceError::Store(StoreError::UserNotFound { .. }) => {
                ApiError::BadRequest(err.to_string())
            }
            ServiceError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.render(None)
    }
}

impl IntoResponse for ApiErrorWithMeta {
    fn into_response(self) -> Response {
        self.error.render(Some(&self.meta.request_id))
    }
}
