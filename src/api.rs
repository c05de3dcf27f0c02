use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::State,
    middleware,
    routing::{get, post},
};
use sqlx::PgPool;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::error::{ApiError, ApiErrorWithMeta};
use crate::extract::{ReferralPath, ValidJson};
use crate::responses::{ApiOk, RequestMeta, meta_middleware};
use crate::service::ReferralService;
use crate::session::SessionContext;
use crate::store::{PgReferralStore, PgUserLookup};
use crate::types::{ReferralRequest, ReferralView};

/// The application state.
#[derive(Clone)]
pub struct AppState {
    /// The referral operations.
    pub service: ReferralService,
}

impl AppState {
    pub fn new(service: ReferralService) -> Self {
        Self { service }
    }

    /// Wires the Postgres-backed stores.
    pub fn from_pool(pool: PgPool) -> Self {
        let referrals = Arc::new(PgReferralStore::new(pool.clone()));
        let users = Arc::new(PgUserLookup::new(pool));
        Self::new(ReferralService::new(referrals, users))
    }
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/referral/{referral_id}/{referral_code}",
            get(get_referral_handler),
        )
        .route(
            "/referral",
            post(create_referral_handler).put(update_referral_handler),
        )
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(meta_middleware))
}

async fn get_referral_handler(
    State(st): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    path: ReferralPath,
) -> Result<ApiOk<ReferralView>, ApiErrorWithMeta> {
    let referral = st
        .service
        .fetch(path.id, path.code)
        .await
        .map_err(|e| ApiError::from(e).with_meta(meta.clone()))?;

    match referral {
        Some(view) => Ok(ApiOk::ok(view)),
        None => Err(ApiError::NotFound.with_meta(meta)),
    }
}

async fn create_referral_handler(
    State(st): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    session: SessionContext,
    ValidJson(req): ValidJson<ReferralRequest>,
) -> Result<ApiOk<ReferralView>, ApiErrorWithMeta> {
    let view = st
        .service
        .create(req, &session)
        .await
        .map_err(|e| ApiError::from(e).with_meta(meta))?;

    Ok(ApiOk::ok(view))
}

async fn update_referral_handler(
    State(st): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    session: SessionContext,
    ValidJson(req): ValidJson<ReferralRequest>,
) -> Result<ApiOk<ReferralView>, ApiErrorWithMeta> {
    let view = st
        .service
        .update(req, &session)
        .await
        .map_err(|e| ApiError::from(e).with_meta(meta))?;

    Ok(ApiOk::ok(view))
}
