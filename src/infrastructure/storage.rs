use crate::config::StorageConfig;
use crate::services::storage::S3StorageService;
use aws_sdk_s3::config::{Credentials, Region};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the S3 client once at startup; the handler receives it through `AppState`.
pub async fn setup_storage(config: &StorageConfig) -> Arc<S3StorageService> {
    let mut loader = aws_config::from_env().region(Region::new(config.region.clone()));

    match &config.credentials {
        Some(creds) => {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id.clone(),
                creds.secret_access_key.clone(),
                None,
                None,
                "static",
            ));
        }
        None => {
            warn!("⚠️  AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY not set; uploads will fail until configured");
            loader = loader.no_credentials();
        }
    }

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.endpoint_url.is_some())
        .build();

    info!(
        "☁️  S3 Storage: bucket '{}' in {}{}",
        config.bucket,
        config.region,
        config
            .endpoint_url
            .as_deref()
            .map(|e| format!(" via {}", e))
            .unwrap_or_default()
    );

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);
    Arc::new(S3StorageService::new(s3_client, config.bucket.clone()))
}
