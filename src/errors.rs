use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pdf::ExportError;
use crate::templates::RenderError;

/// Error returned by document handlers. Every kind keeps the `{detail}` body the
/// front-end reads, with its own status code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Render(RenderError::TemplateNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "TEMPLATE_NOT_FOUND")
            }
            AppError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_ERROR"),
            AppError::Export(ExportError::RenderTimeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "RENDER_TIMEOUT")
            }
            AppError::Export(ExportError::NotConfigured(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "EXPORTER_NOT_CONFIGURED")
            }
            AppError::Export(ExportError::Failure(_)) => (StatusCode::BAD_GATEWAY, "EXPORTER_FAILURE"),
            AppError::Export(ExportError::Io(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORTER_IO"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("{}: {:?}", code, self);
        } else {
            tracing::warn!("{}: {}", code, self);
        }

        let body = Json(json!({
            "detail": self.to_string(),
            "code": code,
        }));

        (status, body).into_response()
    }
}
