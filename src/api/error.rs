use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed multipart body: {0}")]
    Parse(#[from] MultipartError),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Failed to write {path}: {source}")]
    StorageWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    StorageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn storage_write(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        AppError::StorageWrite {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn storage_read(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        AppError::StorageRead {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Parse(e) => (StatusCode::BAD_REQUEST, e.body_text()),
            AppError::InvalidFileName(name) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid file name: {}", name),
            ),
            e @ (AppError::StorageWrite { .. } | AppError::StorageRead { .. }) => {
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
