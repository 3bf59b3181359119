use crate::utils::validation::FileNamePolicy;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_BUCKET: &str = "my-default-bucket";

/// Static credentials for the object store
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}

/// Object store configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Region used for the client and the public locator (default: "us-east-1")
    pub region: String,

    /// Target bucket (default: "my-default-bucket")
    pub bucket: String,

    /// Access key + secret key. `None` when either is missing or empty.
    pub credentials: Option<Credentials>,

    /// Custom endpoint (MinIO, localstack). Enables path-style addressing.
    pub endpoint_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
            credentials: None,
            endpoint_url: None,
        }
    }
}

impl StorageConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        let access_key_id = non_empty_var("AWS_ACCESS_KEY_ID");
        let secret_access_key = non_empty_var("AWS_SECRET_ACCESS_KEY");
        let credentials = match (access_key_id, secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(Credentials {
                access_key_id,
                secret_access_key,
            }),
            _ => None,
        };

        Self {
            region: non_empty_var("AWS_REGION").unwrap_or(default.region),
            bucket: non_empty_var("AWS_S3_BUCKET_NAME").unwrap_or(default.bucket),
            credentials,
            endpoint_url: non_empty_var("AWS_ENDPOINT_URL"),
        }
    }

    pub fn with_credentials(mut self, access_key_id: &str, secret_access_key: &str) -> Self {
        self.credentials = Some(Credentials {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
        });
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Public virtual-hosted style URL for an object key
    pub fn locator(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        )
    }
}

/// HTTP server and upload limits
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:3000)
    pub bind_addr: SocketAddr,

    /// Maximum file size in bytes (default: 256 MB)
    pub max_file_size: usize,

    /// How the declared file name is turned into a key segment
    pub name_policy: FileNamePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000),
            max_file_size: 256 * 1024 * 1024, // 256 MB
            name_policy: FileNamePolicy::Verbatim,
        }
    }
}

impl ServerConfig {
    /// Fails when `UPLOAD_NAME_POLICY` is set to something other than a known policy
    pub fn from_env() -> anyhow::Result<Self> {
        let default = Self::default();

        let host: IpAddr = env::var("HOST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.bind_addr.ip());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.bind_addr.port());

        let name_policy = match non_empty_var("UPLOAD_NAME_POLICY") {
            Some(raw) => raw
                .parse::<FileNamePolicy>()
                .map_err(|e| anyhow::anyhow!("UPLOAD_NAME_POLICY: {}", e))?,
            None => default.name_policy,
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            name_policy,
        })
    }

    /// Body limit for the upload route: file size plus room for multipart framing
    pub fn body_limit(&self) -> usize {
        self.max_file_size.saturating_add(1024 * 1024)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const STORAGE_VARS: [&str; 5] = [
        "AWS_REGION",
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "AWS_S3_BUCKET_NAME",
        "AWS_ENDPOINT_URL",
    ];
    const SERVER_VARS: [&str; 4] = ["HOST", "PORT", "MAX_FILE_SIZE", "UPLOAD_NAME_POLICY"];

    fn set_vars(vars: &[(&str, &str)]) {
        for (key, value) in vars {
            unsafe { env::set_var(key, value) };
        }
    }

    fn clear_vars(keys: &[&str]) {
        for key in keys {
            unsafe { env::remove_var(key) };
        }
    }

    #[test]
    fn test_default_storage_config() {
        let config = StorageConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.bucket, "my-default-bucket");
        assert!(!config.has_credentials());
        assert!(config.endpoint_url.is_none());
    }

    #[test]
    fn test_locator_format() {
        let config = StorageConfig {
            region: "eu-west-2".to_string(),
            bucket: "assets".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.locator("uploads/42-logo"),
            "https://assets.s3.eu-west-2.amazonaws.com/uploads/42-logo"
        );
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let config = StorageConfig::default().with_credentials("AKIA", "very-secret");
        let printed = format!("{:?}", config);
        assert!(printed.contains("AKIA"));
        assert!(!printed.contains("very-secret"));
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.max_file_size, 256 * 1024 * 1024);
        assert_eq!(config.name_policy, FileNamePolicy::Verbatim);
        assert!(config.body_limit() > config.max_file_size);
    }

    #[test]
    fn test_body_limit_saturates() {
        let config = ServerConfig {
            max_file_size: usize::MAX,
            ..Default::default()
        };
        assert_eq!(config.body_limit(), usize::MAX);
    }

    #[test]
    #[serial]
    fn test_storage_from_env_requires_both_keys() {
        clear_vars(&STORAGE_VARS);
        set_vars(&[("AWS_ACCESS_KEY_ID", "AKIA")]);
        assert!(!StorageConfig::from_env().has_credentials());

        clear_vars(&STORAGE_VARS);
        set_vars(&[("AWS_SECRET_ACCESS_KEY", "secret")]);
        assert!(!StorageConfig::from_env().has_credentials());

        set_vars(&[("AWS_ACCESS_KEY_ID", "  ")]);
        assert!(!StorageConfig::from_env().has_credentials());

        set_vars(&[("AWS_ACCESS_KEY_ID", "AKIA")]);
        let config = StorageConfig::from_env();
        let credentials = config.credentials.expect("both keys set");
        assert_eq!(credentials.access_key_id, "AKIA");
        assert_eq!(credentials.secret_access_key, "secret");

        clear_vars(&STORAGE_VARS);
    }

    #[test]
    #[serial]
    fn test_storage_from_env_blank_values_use_defaults() {
        clear_vars(&STORAGE_VARS);
        set_vars(&[
            ("AWS_REGION", "  "),
            ("AWS_S3_BUCKET_NAME", ""),
            ("AWS_ENDPOINT_URL", ""),
        ]);

        let config = StorageConfig::from_env();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.bucket, "my-default-bucket");
        assert!(config.endpoint_url.is_none());

        set_vars(&[
            ("AWS_REGION", "ap-southeast-1"),
            ("AWS_S3_BUCKET_NAME", "brand-assets"),
            ("AWS_ENDPOINT_URL", "http://localhost:9000"),
        ]);
        let config = StorageConfig::from_env();
        assert_eq!(config.region, "ap-southeast-1");
        assert_eq!(config.bucket, "brand-assets");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));

        clear_vars(&STORAGE_VARS);
    }

    #[test]
    #[serial]
    fn test_server_from_env() {
        clear_vars(&SERVER_VARS);
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.name_policy, FileNamePolicy::Verbatim);

        set_vars(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
            ("MAX_FILE_SIZE", "1048576"),
            ("UPLOAD_NAME_POLICY", "Strict"),
        ]);
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8081".parse::<SocketAddr>().unwrap());
        assert_eq!(config.max_file_size, 1024 * 1024);
        assert_eq!(config.name_policy, FileNamePolicy::Strict);

        clear_vars(&SERVER_VARS);
    }

    #[test]
    #[serial]
    fn test_server_from_env_rejects_unknown_name_policy() {
        clear_vars(&SERVER_VARS);
        set_vars(&[("UPLOAD_NAME_POLICY", "stritc")]);

        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("UPLOAD_NAME_POLICY"), "got: {}", err);
        assert!(err.to_string().contains("stritc"), "got: {}", err);

        clear_vars(&SERVER_VARS);
    }
}
