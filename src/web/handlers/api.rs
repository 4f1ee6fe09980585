use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::core::error::AppError;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "qrsmith"
    }))
}

/// Handle 404 errors for API routes
pub async fn api_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({
        "error": "not_found",
        "message": "API endpoint not found"
    })))
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EmptyInput | AppError::Encoder(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LogoTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnreadableFile(_) => StatusCode::BAD_REQUEST,
            AppError::UndecodableImage(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Export(_) | AppError::Io(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        (status, Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        })))
            .into_response()
    }
}
