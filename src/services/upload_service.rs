use crate::api::error::AppError;
use crate::config::StorageConfig;
use crate::services::clock::Clock;
use crate::services::storage::StorageService;
use crate::utils::validation::FileNamePolicy;
use bytes::Bytes;
use std::sync::Arc;
use tracing::info;

pub const KEY_PREFIX: &str = "uploads";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// File part as received from the multipart body.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub data: Bytes,
    pub content_type: Option<String>,
}

impl IncomingFile {
    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub key: String,
    pub url: String,
}

/// `uploads/<unixMillis>-<fileName>`
pub fn storage_key(timestamp_millis: i64, file_name: &str) -> String {
    format!("{}/{}-{}", KEY_PREFIX, timestamp_millis, file_name)
}

pub struct UploadService {
    storage: Arc<dyn StorageService>,
    config: StorageConfig,
    name_policy: FileNamePolicy,
    clock: Arc<dyn Clock>,
}

impl UploadService {
    pub fn new(
        storage: Arc<dyn StorageService>,
        config: StorageConfig,
        name_policy: FileNamePolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            config,
            name_policy,
            clock,
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Authorizes, derives the key, writes the object and builds its locator.
    ///
    /// Presence of the file and name is checked by the caller. Nothing is
    /// written to the store unless credentials are configured.
    pub async fn upload(&self, file: IncomingFile, file_name: &str) -> Result<StoredUpload, AppError> {
        if !self.config.has_credentials() {
            return Err(AppError::Configuration);
        }

        self.name_policy.check(file_name)?;

        let key = storage_key(self.clock.now_millis(), file_name);
        let size = file.data.len();
        let content_type = file.content_type().to_string();

        self.storage
            .put_object(&key, file.data, &content_type)
            .await?;

        let url = self.config.locator(&key);
        info!("☁️  Stored {} ({} bytes, {})", key, size, content_type);

        Ok(StoredUpload { key, url })
    }
}
