use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use client::ClientError;
use content::ContentError;

/// Request-level failures and their HTTP mapping. Upstream validation
/// rejections never reach this type; the edit handlers turn them into
/// form re-renders instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Client(ClientError),
    #[error(transparent)]
    Content(ContentError),
    #[error(transparent)]
    Notify(#[from] service::notify::NotifyError),
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        if err.is_not_found() {
            AppError::NotFound
        } else {
            AppError::Client(err)
        }
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::UnknownFramework(_)
            | ContentError::UnknownSection(_)
            | ContentError::UnknownQuestion(_) => AppError::NotFound,
            other => AppError::Content(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Client(err) => {
                error!(error = %err, "data API failure");
                (StatusCode::BAD_GATEWAY, "the data API is unavailable".to_string())
            }
            AppError::Content(err) => {
                error!(error = %err, "content failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "content unavailable".to_string())
            }
            AppError::Notify(err) => {
                error!(error = %err, "notification failure");
                (StatusCode::BAD_GATEWAY, "could not send the email".to_string())
            }
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}
