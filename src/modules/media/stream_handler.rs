use std::io::SeekFrom;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

use super::range::RangeRequest;
use crate::common::error::ConversionError;
use crate::state::AppState;

pub const VIDEO_MP4: &str = "video/mp4";
const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Serve a converted video with support for Range requests
#[utoipa::path(
    get,
    path = "/{file_name}",
    params(
        ("file_name" = String, Path, description = "Asset name returned by /convert, e.g. `<id>.mp4`"),
        ("Range" = Option<String>, Header, description = "Byte range, e.g. `bytes=0-1023`")
    ),
    responses(
        (status = 200, description = "Full content"),
        (status = 206, description = "Partial Content"),
        (status = 404, description = "Not Found", body = crate::common::response::ErrorResponse),
        (status = 416, description = "Range Not Satisfiable")
    ),
    tag = "Media"
)]
pub async fn stream_asset(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(path) = state.storage.resolve_public(&file_name) else {
        return ConversionError::NotFound.into_response();
    };

    let mut file = match File::open(&path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return ConversionError::NotFound.into_response();
        }
        Err(e) => {
            error!("Failed to open {}: {}", path.display(), e);
            return ConversionError::io(path, e).into_response();
        }
    };

    let file_size = match file.metadata().await {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => return ConversionError::NotFound.into_response(),
        Err(e) => return ConversionError::io(path, e).into_response(),
    };

    let range_header = headers.get(header::RANGE).and_then(|h| h.to_str().ok());
    let range = RangeRequest::parse(range_header, file_size);
    debug!("Serving {} ({} bytes) as {:?}", file_name, file_size, range);

    let builder = Response::builder()
        .header(header::CONTENT_TYPE, VIDEO_MP4)
        .header(header::ACCEPT_RANGES, "bytes");

    let response = match range {
        RangeRequest::Full => builder
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, file_size)
            .header(header::CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE)
            .body(Body::from_stream(ReaderStream::new(file))),
        RangeRequest::Partial { start, end } => {
            let length = end - start + 1;

            if let Err(e) = file.seek(SeekFrom::Start(start)).await {
                return ConversionError::io(path, e).into_response();
            }

            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_LENGTH, length)
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, file_size),
                )
                .header(header::CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE)
                .body(Body::from_stream(ReaderStream::new(file.take(length))))
        }
        RangeRequest::Unsatisfiable => builder
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{}", file_size))
            .body(Body::empty()),
    };

    response.unwrap_or_else(|e| {
        error!("Failed to build response: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}
