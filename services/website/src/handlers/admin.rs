//! JSON admin API. Every route except login and logout sits behind the
//! staff token check and the active-account check.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use validator::Validate;

use suzstar_auth::{expired_staff_cookie, staff_cookie, Claims};
use suzstar_common::{ApiResponse, FieldErrors};
use suzstar_database::Page;

use crate::admin::{
    self, AdminModel, Appointments, BlogPosts, BulkResult, ContactMessages, Counselors, EventRegistrations,
    Events, ExportRequest, Faqs, MarkReadRequest, NewsletterSubscribers, Resources, Services,
    SetStatusRequest, SiteSettings, Testimonials,
};
use crate::error::JsonError;
use crate::forms::merge;
use crate::services::staff::{LoginRequest, LoginResponse};
use crate::services::{AppState, StaffService};

type JsonResult<T> = Result<Json<ApiResponse<T>>, JsonError>;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/services", resource_routes::<Services>())
        .nest("/counselors", resource_routes::<Counselors>())
        .nest("/blog-posts", resource_routes::<BlogPosts>())
        .nest("/appointments", resource_routes::<Appointments>())
        .nest("/contact-messages", resource_routes::<ContactMessages>())
        .nest("/resources", resource_routes::<Resources>())
        .nest("/testimonials", resource_routes::<Testimonials>())
        .nest("/faqs", resource_routes::<Faqs>())
        .nest("/events", resource_routes::<Events>())
        .nest("/event-registrations", resource_routes::<EventRegistrations>())
        .nest("/newsletter-subscribers", resource_routes::<NewsletterSubscribers>())
        .nest("/site-settings", resource_routes::<SiteSettings>())
        .route("/appointments/actions/set-status", post(set_status))
        .route("/contact-messages/actions/mark-read", post(mark_read))
        .route("/newsletter-subscribers/actions/export", post(export_subscribers))
        .route(
            "/media/*path",
            put(upload_media).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

fn resource_routes<M: AdminModel>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<M>).post(create::<M>))
        .route("/:id", get(read::<M>).put(update::<M>).delete(remove::<M>))
}

async fn list<M: AdminModel>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> JsonResult<Page<M::Record>> {
    let page = admin::list::<M>(&state.db_pool, &params).await?;
    Ok(Json(ApiResponse::success(page)))
}

async fn read<M: AdminModel>(State(state): State<AppState>, Path(id): Path<i64>) -> JsonResult<M::Record> {
    let record = admin::get::<M>(&state.db_pool, id).await?;
    Ok(Json(ApiResponse::success(record)))
}

async fn create<M: AdminModel>(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<M::Record>>), JsonError> {
    let values = admin::payload::<M>(body, &claims, true)?;
    let record = admin::create::<M>(&state.db_pool, values).await?;
    tracing::debug!(table = M::TABLE, staff = %claims.username, "Record created via admin");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

async fn update<M: AdminModel>(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> JsonResult<M::Record> {
    let values = admin::payload::<M>(body, &claims, false)?;
    let record = admin::update::<M>(&state.db_pool, id, values).await?;
    Ok(Json(ApiResponse::success(record)))
}

async fn remove<M: AdminModel>(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, JsonError> {
    admin::delete::<M>(&state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_status(State(state): State<AppState>, Json(request): Json<SetStatusRequest>) -> JsonResult<BulkResult> {
    let result = admin::set_appointment_status(&state.db_pool, &request).await?;
    Ok(Json(ApiResponse::success(result)))
}

async fn mark_read(State(state): State<AppState>, Json(request): Json<MarkReadRequest>) -> JsonResult<BulkResult> {
    let result = admin::mark_messages_read(&state.db_pool, &request).await?;
    Ok(Json(ApiResponse::success(result)))
}

async fn export_subscribers(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, JsonError> {
    let subscribers = admin::subscribers_for_export(&state.db_pool, &request.ids).await?;
    let csv = admin::subscribers_csv(&subscribers)?;
    tracing::info!(count = subscribers.len(), "Subscribers exported");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"subscribers.csv\""),
        ],
        csv,
    )
        .into_response())
}

async fn upload_media(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<Value>>), JsonError> {
    let url = state.file_store.store(&body, &path).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(json!({ "path": path, "url": url }))),
    ))
}

pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Response, JsonError> {
    let mut errors = FieldErrors::new();
    merge(&mut errors, request.validate());
    errors.into_result(())?;

    let response: LoginResponse = StaffService::new(&state).login(request).await?;
    let cookie = HeaderValue::from_str(&staff_cookie(&response.token, response.expires_in))
        .map_err(|e| suzstar_common::AppError::Internal(format!("Invalid cookie: {}", e)))?;

    Ok(([(header::SET_COOKIE, cookie)], Json(ApiResponse::success(response))).into_response())
}

pub async fn logout() -> Response {
    (
        [(header::SET_COOKIE, expired_staff_cookie())],
        Json(ApiResponse::success("Logged out".to_string())),
    )
        .into_response()
}

/// Refuses tokens whose account has since been deactivated or removed.
pub async fn require_active_staff(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id = claims.user_id().map_err(|_| StatusCode::UNAUTHORIZED)?;
    let active = StaffService::new(&state).is_active(user_id).await.map_err(|e| {
        tracing::error!(error = %e, "Staff lookup failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    if !active {
        tracing::info!(username = %claims.username, "Token of inactive staff account refused");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}
