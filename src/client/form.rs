use super::api::{ClientError, UploadClient};
use super::clipboard::Clipboard;
use crate::services::upload_service::DEFAULT_CONTENT_TYPE;
use bytes::Bytes;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

/// How long "Copied!" stays visible after a successful copy.
pub const COPY_ACK_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a file to upload")]
    MissingFile,

    #[error("File name is required")]
    MissingName,
}

/// Every failed check from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn missing_file() -> Self {
        Self(vec![ValidationError::MissingFile])
    }

    pub fn contains(&self, error: ValidationError) -> bool {
        self.0.contains(&error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// A file picked by the user, fully read into memory.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();
        Ok(Self::new(name, data))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Declared type, else a guess from the extension
    pub fn content_type(&self) -> &str {
        match &self.content_type {
            Some(ct) => ct.as_str(),
            None => mime_guess::from_path(&self.name)
                .first_raw()
                .unwrap_or(DEFAULT_CONTENT_TYPE),
        }
    }

    /// `Selected: a.png (0.01 KB)`
    pub fn summary(&self) -> String {
        format!("Selected: {} ({:.2} KB)", self.name, self.size() as f64 / 1024.0)
    }
}

/// Runs both checks; all failures are reported together.
pub fn validate(file: Option<&SelectedFile>, file_name: &str) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if file.is_none() {
        errors.push(ValidationError::MissingFile);
    }
    if file_name.trim().is_empty() {
        errors.push(ValidationError::MissingName);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Per-field messages shown under the inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub file: Option<String>,
    pub file_name: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.file_name.is_none()
    }

    fn from_validation(errors: &ValidationErrors) -> Self {
        let mut out = Self::default();
        for e in errors.iter() {
            match e {
                ValidationError::MissingFile => out.file = Some(e.to_string()),
                ValidationError::MissingName => out.file_name = Some(e.to_string()),
            }
        }
        out
    }
}

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    Uploaded { url: String },
    Failed { message: String },
}

impl UploadResult {
    pub fn error_message(&self) -> Option<&str> {
        match self {
            UploadResult::Uploaded { .. } => None,
            UploadResult::Failed { message } => Some(message),
        }
    }
}

#[derive(Debug, Default)]
pub struct UploadForm {
    file: Option<SelectedFile>,
    file_name: String,
    errors: FormErrors,
    uploaded_url: Option<String>,
    copied_at: Option<Instant>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        self.file = Some(file);
        self.errors.file = None;
    }

    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.file_name = name.into();
        self.errors.file_name = None;
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn uploaded_url(&self) -> Option<&str> {
        self.uploaded_url.as_deref()
    }

    /// Re-runs validation and replaces the field errors.
    pub fn validate(&mut self) -> bool {
        match validate(self.file.as_ref(), &self.file_name) {
            Ok(()) => {
                self.errors = FormErrors::default();
                true
            }
            Err(errors) => {
                self.errors = FormErrors::from_validation(&errors);
                false
            }
        }
    }

    /// Submits the current input through `client`.
    ///
    /// On success the inputs are cleared and the locator kept; on failure the
    /// inputs stay so the user can retry without picking the file again.
    pub async fn submit(&mut self, client: &UploadClient) -> UploadResult {
        if client.is_pending() {
            return UploadResult::Failed {
                message: ClientError::SubmissionInProgress.display_message(),
            };
        }

        if !self.validate() {
            let message = [&self.errors.file, &self.errors.file_name]
                .into_iter()
                .flatten()
                .cloned()
                .collect::<Vec<_>>()
                .join("; ");
            return UploadResult::Failed { message };
        }

        self.uploaded_url = None;
        self.copied_at = None;

        match client.submit(self.file.as_ref(), &self.file_name).await {
            Ok(response) => {
                info!("Upload successful: {}", response.url);
                self.uploaded_url = Some(response.url.clone());
                self.file = None;
                self.file_name.clear();
                UploadResult::Uploaded { url: response.url }
            }
            Err(e) => {
                let message = e.display_message();
                warn!("Upload failed: {}", e);
                if !matches!(e, ClientError::SubmissionInProgress) {
                    self.errors.file = Some(message.clone());
                }
                UploadResult::Failed { message }
            }
        }
    }

    /// Copies the last locator. Failures are logged and otherwise ignored.
    pub fn copy_locator(&mut self, clipboard: &mut dyn Clipboard) {
        let Some(url) = self.uploaded_url.as_deref() else {
            return;
        };

        match clipboard.write_text(url) {
            Ok(()) => self.copied_at = Some(Instant::now()),
            Err(e) => warn!("Failed to copy: {}", e),
        }
    }

    /// True for a short while after a successful copy.
    pub fn copy_acknowledged(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < COPY_ACK_DURATION)
    }
}
