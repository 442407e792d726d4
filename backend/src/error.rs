use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use landscape_shared::ErrorResponse;

const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),
    #[error("SAM-2 processing failed ({status}): {body}")]
    SegmentationSubmitFailed { status: u16, body: String },
    #[error("Failed to check status: {0}")]
    SegmentationStatusFailed(String),
    #[error("Failed to download image: {0}")]
    ImageDownloadFailed(String),
    #[error("Invalid mask data: {0}")]
    InvalidMaskData(String),
    #[error("Image editing failed: {0}")]
    EditingFailed(String),
    #[error("Upload failed: {0}")]
    StorageWriteFailed(#[from] std::io::Error),
    #[error("Image analysis failed: {0}")]
    AnalysisFailed(String),
    #[error("{provider} unavailable: {reason}")]
    UpstreamUnavailable { provider: &'static str, reason: String },
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn upstream(provider: &'static str, err: reqwest::Error) -> Self {
        ApiError::UpstreamUnavailable {
            provider,
            reason: err.to_string(),
        }
    }

    /// Authentication rejections mean the provider is unusable, not that the request was bad.
    pub fn is_auth_status(status: reqwest::StatusCode) -> bool {
        status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
    }
}

pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidImageFormat(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // style-edit reports every stage failure as a server error, mask included
            ApiError::InvalidMaskData(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
