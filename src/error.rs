//! Error kinds surfaced by the analysis pipeline and their JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const TOO_SHORT_MESSAGE: &str = "الجملة قصيرة جدًا. 🙃";
pub const NOT_ARABIC_MESSAGE: &str = "الجملة تحتوي على أحرف غير عربية أو غير مفهومة. 🙃";
pub const AUTH_FAILURE_MESSAGE: &str =
    "Failed to obtain access token. Please check the API key and network connection.";
pub const VALIDATION_REJECTED_MESSAGE: &str =
    "الحقييقققهه، الجملة قصيرة بزيادة أو فيها رموز غير مفهومة. 🙃";
const UPSTREAM_PREFIX: &str = "في مشكلة: ";

/// Failure of the IAM token exchange.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("token endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("token response did not contain an access_token")]
    MissingToken,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("sentence shorter than two characters")]
    TooShort,
    #[error("sentence is not mostly Arabic")]
    NotArabic,
    #[error(transparent)]
    Auth(#[from] TokenError),
    /// `status` is `None` when no response arrived at all.
    #[error("model endpoint failed (status {status:?})")]
    Upstream { status: Option<u16>, body: String },
    #[error("model judged the sentence unanalyzable")]
    ValidationRejected,
}

impl AnalysisError {
    /// Message shown to the end user.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::TooShort => TOO_SHORT_MESSAGE.to_string(),
            AnalysisError::NotArabic => NOT_ARABIC_MESSAGE.to_string(),
            AnalysisError::Auth(_) => AUTH_FAILURE_MESSAGE.to_string(),
            AnalysisError::Upstream { body, .. } => format!("{}{}", UPSTREAM_PREFIX, body),
            AnalysisError::ValidationRejected => VALIDATION_REJECTED_MESSAGE.to_string(),
        }
    }

    /// Stable label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::TooShort | AnalysisError::NotArabic => "input_rejected",
            AnalysisError::Auth(_) => "auth_failure",
            AnalysisError::Upstream { .. } => "upstream_failure",
            AnalysisError::ValidationRejected => "validation_rejected",
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

pub fn respond_with_error(status: StatusCode, err: ErrorResponse) -> Response {
    (status, Json(err)).into_response()
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        respond_with_error(StatusCode::BAD_REQUEST, ErrorResponse::new(self.user_message()))
    }
}
