use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use collector::GithubApiError;
use common::AnalysisError;
use exporter::ExportError;
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    RateLimited(String),
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidArgument(_) => Self::BadRequest(err.to_string()),
            AnalysisError::Parse { .. } | AnalysisError::MissingField(_) => {
                Self::Internal(format!("unexpected event feed: {err}"))
            }
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnknownFormat(_) => Self::NotFound(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<std::fmt::Error> for ApiError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(github) = err.downcast_ref::<GithubApiError>() {
            return match github {
                GithubApiError::NotFound { .. } => Self::NotFound(github.to_string()),
                GithubApiError::RateLimited { .. } => Self::RateLimited(github.to_string()),
                GithubApiError::Http { .. } => Self::Internal(github.to_string()),
            };
        }
        match err.downcast::<AnalysisError>() {
            Ok(analysis) => analysis.into(),
            Err(err) => Self::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            ApiError::Internal(msg) => {
                error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        let body = Json(ErrorBody { error: message });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
