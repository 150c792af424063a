use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::info;

use super::{
    error::ApiError,
    models::{DownloadAudioPayload, HealthResponse, InfoPayload, ServiceInfo},
    state::AppState,
    utils, validation,
};
use crate::humanize::ByteSize;
use crate::media::Cookies;
use crate::pipeline::MediaInfo;

/// Service description (GET /)
pub async fn root() -> impl IntoResponse {
    let endpoints = BTreeMap::from([
        ("GET /", "API information"),
        ("GET /health", "Health check"),
        ("POST /download-audio", "Download audio, optionally trimmed to a time range"),
        ("POST /info", "Media metadata without downloading"),
    ]);

    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoints,
    })
}

/// Health check endpoint (GET /health)
///
/// Returns 503 Service Unavailable when the work directory cannot be
/// written, since no download could succeed.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let writable = state.workspace.is_writable().await;

    let (status_code, status) = if writable {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status,
        timestamp: chrono::Utc::now(),
        work_dir: if writable { "accessible" } else { "not accessible" },
        version: env!("CARGO_PKG_VERSION"),
        metrics: state.metrics.snapshot(),
    };

    (status_code, Json(response))
}

/// Audio download endpoint (POST /download-audio)
///
/// ## Flow:
/// 1. Validate Content-Type, read the size-limited body, decode the payload
/// 2. Fetch full audio, walking the candidate URLs in order
/// 3. Trim to `startTime..endTime` when a range was given
/// 4. Stream the file back; it is deleted once the body is done or dropped
pub async fn download_audio(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    let result = serve_download(&state, &headers, body).await;
    match &result {
        Ok(_) => state.metrics.download_served(),
        Err(_) => state.metrics.download_failed(),
    }
    result
}

async fn serve_download(state: &AppState, headers: &HeaderMap, body: Body) -> Result<Response, ApiError> {
    let payload: DownloadAudioPayload = read_json(state, headers, body).await?;
    let request = validation::download_request(payload)?;

    info!(
        url = %request.source_url,
        format = %request.format,
        trimmed = request.range.is_some(),
        "Download requested"
    );

    let fetched = state.orchestrator.fetch(&request, &state.workspace).await?;
    let identifier = fetched.identifier;

    let artifact = state
        .lifecycle
        .finalize(fetched.artifact, request.range, request.format, &fetched.scope)
        .await
        .map_err(|e| ApiError::pipeline(e.into_error(), Some(identifier.clone())))?;

    let filename = utils::attachment_name(&identifier, request.range, request.format);
    let disposition = HeaderValue::from_str(&utils::content_disposition(&filename))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let size = artifact.size_bytes();

    info!(filename, size = %ByteSize(size), kind = ?artifact.kind(), "Streaming audio");

    let stream = artifact
        .into_body_stream()
        .await
        .map_err(|e| ApiError::pipeline(e.into(), Some(identifier)))?;

    let response = (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(request.format.mime_type())),
            (header::CONTENT_LENGTH, HeaderValue::from(size)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response();

    Ok(response)
}

/// Metadata endpoint (POST /info)
pub async fn media_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<MediaInfo>, ApiError> {
    let payload: InfoPayload = read_json(&state, &headers, body).await?;
    let url = payload.url.unwrap_or_default();
    let cookies = match payload.cookies.as_deref() {
        Some(raw) => Cookies::parse(raw)?,
        None => None,
    };
    let info = state.probe.probe(&url, cookies.as_ref()).await?;
    Ok(Json(info))
}

/// Validates Content-Type, reads the body under the configured limit and
/// decodes it.
async fn read_json<T: DeserializeOwned>(
    state: &AppState,
    headers: &HeaderMap,
    body: Body,
) -> Result<T, ApiError> {
    // Must be application/json (optionally with charset parameter)
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidPayload("missing Content-Type header".into()))?;
    utils::parse_content_type(content_type)?;

    let max_size = state.config.server.max_body_bytes.as_usize();
    let data = Limited::new(body, max_size)
        .collect()
        .await
        .map_err(|err| {
            if err.downcast_ref::<LengthLimitError>().is_some() {
                ApiError::PayloadTooLarge(max_size + 1)
            } else {
                ApiError::InvalidPayload(err.to_string())
            }
        })?
        .to_bytes();

    utils::validate_body_size(&data, max_size)?;

    Ok(serde_json::from_slice(&data)?)
}
