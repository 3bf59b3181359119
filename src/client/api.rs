use super::ClientConfig;
use super::form::{SelectedFile, ValidationErrors, validate};
use crate::api::handlers::upload::{FILE_FIELD, FILE_NAME_FIELD, UploadResponse};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, warn};

pub const GENERIC_REQUEST_FAILURE: &str = "Failed to upload file. Please try again.";
pub const GENERIC_UNEXPECTED_FAILURE: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("An upload is already in progress")]
    SubmissionInProgress,

    /// The HTTP layer failed: the server answered with an error status, or
    /// could not be reached at all (`status` is `None`).
    #[error("Upload request failed (status: {status:?}): {}", .error.as_deref().unwrap_or("no response body"))]
    Request {
        status: Option<u16>,
        error: Option<String>,
        details: Option<String>,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ClientError {
    /// Text shown next to the file field.
    pub fn display_message(&self) -> String {
        match self {
            ClientError::Validation(errors) => errors.to_string(),
            ClientError::SubmissionInProgress => self.to_string(),
            ClientError::Request {
                error: Some(error),
                details: Some(details),
                ..
            } => format!("{}: {}", error, details),
            ClientError::Request {
                error: Some(error),
                ..
            } => error.clone(),
            ClientError::Request { error: None, .. } => GENERIC_REQUEST_FAILURE.to_string(),
            ClientError::Unexpected(_) => GENERIC_UNEXPECTED_FAILURE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_builder() {
            ClientError::Unexpected(e.to_string())
        } else {
            ClientError::Request {
                status: e.status().map(|s| s.as_u16()),
                error: None,
                details: None,
            }
        }
    }
}

#[derive(Deserialize)]
struct ServerError {
    error: Option<String>,
    details: Option<String>,
}

/// Cleared on drop so a failed or panicked submission never leaves the gate shut.
struct PendingGuard<'a>(&'a AtomicBool);

impl<'a> PendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// HTTP side of the upload client. Clones share the pending flag.
#[derive(Clone, Debug)]
pub struct UploadClient {
    http: reqwest::Client,
    upload_url: String,
    pending: Arc<AtomicBool>,
}

impl UploadClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Unexpected(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            upload_url: config.upload_url(),
            pending: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Validates, then uploads. Invalid input never reaches the network.
    pub async fn submit(
        &self,
        file: Option<&SelectedFile>,
        file_name: &str,
    ) -> Result<UploadResponse, ClientError> {
        validate(file, file_name).map_err(ClientError::Validation)?;
        match file {
            Some(file) => self.upload(file, file_name).await,
            None => Err(ClientError::Validation(ValidationErrors::missing_file())),
        }
    }

    /// Sends one multipart POST. Never retries.
    pub async fn upload(
        &self,
        file: &SelectedFile,
        file_name: &str,
    ) -> Result<UploadResponse, ClientError> {
        let _guard = PendingGuard::acquire(&self.pending).ok_or(ClientError::SubmissionInProgress)?;

        let part = Part::bytes(file.data.to_vec())
            .file_name(file.name.clone())
            .mime_str(file.content_type())?;
        let form = Form::new()
            .part(FILE_FIELD, part)
            .text(FILE_NAME_FIELD, file_name.to_string());

        debug!("POST {} ({} bytes)", self.upload_url, file.data.len());
        let response = self.http.post(&self.upload_url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ServerError>().await.ok();
            warn!("Upload rejected with status {}", status);
            return Err(ClientError::Request {
                status: Some(status.as_u16()),
                error: body.as_ref().and_then(|b| b.error.clone()),
                details: body.and_then(|b| b.details),
            });
        }

        let body: UploadResponse = response.json().await?;
        if !body.success {
            return Err(ClientError::Unexpected(
                "Server did not confirm the upload".to_string(),
            ));
        }

        Ok(body)
    }
}
