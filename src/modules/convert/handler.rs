use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};
use validator::Validate;

use super::dto::ConvertRequest;
use super::service::ConvertService;
use crate::common::error::ConversionError;
use crate::common::response::{ApiError, ApiSuccess, ConvertResponse, ErrorResponse};
use crate::config::settings::AppConfig;
use crate::state::AppState;

/// Download a remote video and convert it into an autoplay-friendly MP4
#[utoipa::path(
    post,
    path = "/convert",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "Converted", body = ConvertResponse),
        (status = 400, description = "Missing or invalid URL", body = ErrorResponse),
        (status = 500, description = "Download or transcode failed", body = ErrorResponse)
    ),
    tag = "Convert"
)]
pub async fn convert(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return ApiError(rejection.body_text(), rejection.status()).into_response();
        }
        Err(rejection) => {
            warn!("Unreadable /convert body: {}", rejection.body_text());
            ConvertRequest::default()
        }
    };

    if payload.validate().is_err() {
        return ConversionError::missing_url().into_response();
    }

    let public_base = public_base(&state.config, &headers);

    match ConvertService::convert(&state, payload.url.as_deref(), &public_base).await {
        Ok(url) => ApiSuccess(ConvertResponse::success(url), StatusCode::OK).into_response(),
        Err(e) => {
            error!("❌ Conversion error: {}", e);
            e.into_response()
        }
    }
}

/// Scheme and host that clients used to reach this server.
pub fn public_base(config: &AppConfig, headers: &HeaderMap) -> String {
    if let Some(base) = &config.public_base_url {
        return base.clone();
    }

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("localhost:{}", config.server_port));

    format!("{}://{}", proto, host)
}
