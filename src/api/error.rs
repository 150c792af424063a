use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::error::{DownloadError, Error, InputError, ProcessError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("payload invalid: {0}")]
    InvalidPayload(String),
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),
    #[error("{source}")]
    Pipeline {
        source: Error,
        video_id: Option<String>,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Wrap a pipeline failure together with the identifier it concerns.
    pub fn pipeline(source: Error, video_id: Option<String>) -> Self {
        ApiError::Pipeline { source, video_id }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Pipeline {
                source: Error::Input(_),
                ..
            } => StatusCode::BAD_REQUEST,
            ApiError::Pipeline { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidPayload(_) => "invalid_payload",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::Pipeline { source, .. } => source.kind(),
            ApiError::Internal(_) => "internal",
        }
    }

    fn to_body(&self) -> ErrorResponse {
        let mut body = ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
            details: None,
            video_id: None,
            has_hash: None,
            tried_urls: None,
            attempts: None,
        };

        let ApiError::Pipeline { source, video_id } = self else {
            return body;
        };
        body.video_id = video_id.clone();

        match source {
            Error::Input(e) => body.error = e.to_string(),
            Error::Process(ProcessError::TrimFailed { detail }) => {
                body.error = "failed to create audio chunk".to_string();
                body.details = Some(detail.clone());
            }
            Error::Process(e) => {
                body.error = "external tool failed".to_string();
                body.details = Some(e.to_string());
            }
            Error::Download(DownloadError::AllCandidatesExhausted {
                identifier,
                hash,
                attempts,
            }) => {
                body.error = "failed to download audio".to_string();
                body.details = Some(
                    attempts
                        .last()
                        .and_then(|a| a.error_detail.clone())
                        .unwrap_or_else(|| "all candidate URLs failed".to_string()),
                );
                body.video_id = Some(identifier.clone());
                body.has_hash = Some(hash.is_some());
                body.tried_urls = Some(attempts.iter().map(|a| a.candidate.url.clone()).collect());
                body.attempts = Some(attempts.clone());
            }
            Error::Download(DownloadError::InvalidMetadata(detail)) => {
                body.error = "extractor returned unreadable metadata".to_string();
                body.details = Some(detail.clone());
            }
            Error::Download(e) => body.error = e.to_string(),
            // io errors may name paths under the work directory
            Error::Io(_) => body.error = "internal storage error".to_string(),
        }

        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Request failed");
        } else {
            tracing::warn!(kind = self.kind(), error = %self, "Request rejected");
        }

        (status, Json(self.to_body())).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::InvalidPayload(value.to_string())
    }
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        ApiError::pipeline(value, None)
    }
}

impl From<InputError> for ApiError {
    fn from(value: InputError) -> Self {
        ApiError::pipeline(value.into(), None)
    }
}
