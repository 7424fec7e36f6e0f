use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE,
        },
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    app_state::AppState,
    camera::{redact::redact_url_credentials, service::CoordinatorStatus},
    config::{SettingsUpdate, SnapshotSettings},
    core::errors::AppError,
};

const RTSP_TRANSPORTS: [&str; 5] = ["tcp", "udp", "udp_multicast", "http", "https"];

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Headers that let dashboards on other origins embed the snapshot.
fn cross_origin_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers
}

pub async fn root() -> &'static str {
    "camsnap: GET /snapshot for the current frame"
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn snapshot(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let request = state.settings().await.to_request();
    let data = state
        .snapshots
        .get_snapshot(&request)
        .await
        .inspect_err(|err| {
            warn!(
                "snapshot request failed (url={}): {}",
                redact_url_credentials(&request.params.input_url),
                redact_url_credentials(&err.to_string())
            );
        })?;

    let mut headers = cross_origin_headers();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );

    Ok((StatusCode::OK, headers, data).into_response())
}

pub async fn snapshot_options() -> Response {
    (StatusCode::NO_CONTENT, cross_origin_headers()).into_response()
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<CoordinatorStatus> {
    Json(state.snapshots.status())
}

pub async fn settings(State(state): State<Arc<AppState>>) -> Json<SnapshotSettings> {
    Json(state.settings().await.redacted())
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SettingsUpdate>,
) -> Result<Json<SnapshotSettings>, AppError> {
    if payload
        .rtsp_transport
        .as_deref()
        .is_some_and(|transport| !RTSP_TRANSPORTS.contains(&transport.trim()))
    {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            format!("rtsp_transport must be one of {}", RTSP_TRANSPORTS.join(", ")),
        ));
    }
    if payload
        .ffmpeg_path
        .as_deref()
        .is_some_and(|path| path.trim().is_empty())
    {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "ffmpeg_path cannot be empty",
        ));
    }

    let updated = state
        .update_settings(|settings| settings.apply(payload))
        .await
        .redacted();
    info!(
        "snapshot settings updated: url={} ttl_ms={} timeout_sec={}",
        updated.input_url, updated.cache_ttl_ms, updated.timeout_sec
    );
    Ok(Json(updated))
}
