use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use crate::errors::{
    AppError,
    RegistrationError,
    StorageError,
    CropError,
};

// The IntoResponse trait implementation converts AppError into a JSON error body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (status, Json(json!({ "error": public_message(self) }))).into_response()
    }
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Auth(_) => StatusCode::UNAUTHORIZED,

        AppError::Registration(RegistrationError::UsernameTaken) => StatusCode::CONFLICT,
        AppError::Registration(_) => StatusCode::BAD_REQUEST,

        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,

        // Quota exhaustion blocks the user until records are deleted
        AppError::Storage(StorageError::QuotaExceeded) => StatusCode::INSUFFICIENT_STORAGE,
        AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,

        AppError::Analysis(_) => StatusCode::BAD_GATEWAY,

        AppError::Crop(CropError::SelectionTooSmall { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Crop(_) => StatusCode::BAD_REQUEST,

        AppError::Credential(_) | AppError::Session(_) | AppError::Task(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// Messages shown to the client; internal details stay in the logs.
fn public_message(err: AppError) -> String {
    match err {
        AppError::Auth(msg) | AppError::Validation(msg) | AppError::NotFound(msg) => msg,
        AppError::Registration(e) => e.to_string(),
        AppError::Storage(StorageError::QuotaExceeded) => StorageError::QuotaExceeded.to_string(),
        AppError::Storage(_) => "Storage unavailable".to_string(),
        // Every analysis failure surfaces as a single connectivity error
        AppError::Analysis(_) => {
            "Connection to analysis unit failed during batch analysis.".to_string()
        }
        AppError::Crop(e) => e.to_string(),
        AppError::Credential(_) | AppError::Session(_) | AppError::Task(_) => {
            "Server error".to_string()
        }
    }
}
