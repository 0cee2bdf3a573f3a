use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::common::response::ApiError;

pub const MISSING_URL: &str = "Missing URL";

/// Failure taxonomy of the download → transcode → serve pipeline.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{0}")]
    Validation(String),
    #[error("Download failed ({status})")]
    Download { status: u16 },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Transcode failed: {cause}")]
    Transcode { cause: String },
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Not found")]
    NotFound,
}

pub type ConversionResult<T> = Result<T, ConversionError>;

impl ConversionError {
    pub fn missing_url() -> Self {
        ConversionError::Validation(MISSING_URL.to_string())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConversionError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ConversionError::Validation(_) => StatusCode::BAD_REQUEST,
            ConversionError::NotFound => StatusCode::NOT_FOUND,
            ConversionError::Download { .. }
            | ConversionError::Transport(_)
            | ConversionError::Transcode { .. }
            | ConversionError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ConversionError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) if error.is_status() => ConversionError::Download {
                status: status.as_u16(),
            },
            _ => ConversionError::Transport(error.to_string()),
        }
    }
}

impl IntoResponse for ConversionError {
    fn into_response(self) -> Response {
        ApiError(self.to_string(), self.status_code()).into_response()
    }
}
