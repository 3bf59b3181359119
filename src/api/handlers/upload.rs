use crate::AppState;
use crate::api::error::{AppError, ErrorResponse};
use crate::services::upload_service::IncomingFile;
use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

pub const FILE_FIELD: &str = "file";
pub const FILE_NAME_FIELD: &str = "fileName";

/// Multipart body accepted by `POST /api/upload` (documentation only).
#[derive(Deserialize, ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, description = "File and the name to store it under", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing file or file name", body = ErrorResponse),
        (status = 500, description = "Storage or configuration failure", body = ErrorResponse)
    ),
    tag = "upload"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<IncomingFile> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILE_FIELD {
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field.bytes().await?;
            file = Some(IncomingFile { data, content_type });
        } else if name == FILE_NAME_FIELD {
            file_name = Some(field.text().await?);
        } else {
            debug!("Ignoring unexpected multipart field '{}'", name);
        }
    }

    let file = file.ok_or(AppError::MissingFile)?;
    let file_name = file_name
        .filter(|n| !n.is_empty())
        .ok_or(AppError::MissingFileName)?;

    info!("📦 Upload received: '{}' ({} bytes)", file_name, file.data.len());

    let stored = state.upload_service.upload(file, &file_name).await?;

    Ok(Json(UploadResponse {
        success: true,
        url: stored.url,
        message: "File uploaded successfully".to_string(),
    }))
}
