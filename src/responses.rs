use axum::{
    Json,
    body::Body,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct RequestMeta {
    pub request_id: String,
}

fn new_meta() -> RequestMeta {
    RequestMeta {
        request_id: Uuid::new_v4().to_string(),
    }
}

// Middleware: attaches RequestMeta into request extensions and echoes the id back
pub async fn meta_middleware(mut req: Request<Body>, next: Next) -> Response {
    let meta = new_meta();
    let header = HeaderValue::from_str(&meta.request_id).ok();
    req.extensions_mut().insert(meta);

    let mut res = next.run(req).await;
    if let Some(value) = header {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Success,
    Failure,
}

#[derive(Serialize)]
pub struct SuccessEnvelope<T> {
    pub status: Status,
    #[serde(flatten)]
    pub data: T,
}

pub struct ApiOk<T> {
    body: SuccessEnvelope<T>,
}

impl<T> ApiOk<T> {
    pub fn ok(data: T) -> Self {
        Self {
            body: SuccessEnvelope {
                status: Status::Success,
                data,
            },
        }
    }
}

impl<T: Serialize> IntoResponse for ApiOk<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.body)).into_response()
    }
}
