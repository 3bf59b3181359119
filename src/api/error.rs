use crate::services::storage::StorageError;
use crate::utils::validation::FileNameError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file provided")]
    MissingFile,

    #[error("No file name provided")]
    MissingFileName,

    #[error("Invalid file name: {0}")]
    InvalidFileName(#[from] FileNameError),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Object storage is not configured")]
    Configuration,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFile
            | AppError::MissingFileName
            | AppError::InvalidFileName(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
            AppError::Configuration | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let body = match self {
            AppError::MissingFile | AppError::MissingFileName => ErrorResponse {
                error: message,
                details: None,
            },
            AppError::InvalidFileName(e) => ErrorResponse {
                error: e.to_string(),
                details: None,
            },
            AppError::Multipart(e) => ErrorResponse {
                error: e.body_text(),
                details: None,
            },
            AppError::Configuration => {
                tracing::error!("Upload rejected: object store credentials are not configured");
                ErrorResponse {
                    error: "Object storage is not configured".to_string(),
                    details: None,
                }
            }
            AppError::Storage(e) => {
                tracing::error!("Object store write failed: {}", e);
                ErrorResponse {
                    error: "Failed to upload file".to_string(),
                    details: Some(e.to_string()),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
