//! Upload client.
//!
//! [`UploadForm`] holds what a user has entered (file, name, errors, last
//! locator) and drives a single submission through [`UploadClient`], which
//! owns the HTTP connection pool and the pending-submission gate.

pub mod api;
pub mod clipboard;
pub mod form;

pub use api::{ClientError, UploadClient};
pub use clipboard::{Clipboard, MemoryClipboard, Osc52Clipboard};
pub use form::{
    FormErrors, SelectedFile, UploadForm, UploadResult, ValidationError, ValidationErrors,
    validate,
};

use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);
pub const UPLOAD_PATH: &str = "/api/upload";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL, without the `/api/upload` suffix
    pub base_url: String,

    /// Whole-request timeout (default: 30s)
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_API_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Reads `API_URL` and `API_TIMEOUT` (milliseconds)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            base_url: env::var("API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default.base_url),

            timeout: env::var("API_TIMEOUT")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(default.timeout),
        }
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), UPLOAD_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_client_vars() {
        unsafe {
            env::remove_var("API_URL");
            env::remove_var("API_TIMEOUT");
        }
    }

    #[test]
    fn test_default_client_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.timeout, Duration::from_millis(30000));
    }

    #[test]
    fn test_upload_url_trims_trailing_slash() {
        let config = ClientConfig {
            base_url: "https://assets.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.upload_url(), "https://assets.example.com/api/upload");
    }

    #[test]
    #[serial]
    fn test_client_from_env() {
        clear_client_vars();
        unsafe {
            env::set_var("API_URL", "https://assets.example.com");
            env::set_var("API_TIMEOUT", "1500");
        }

        let config = ClientConfig::from_env();
        assert_eq!(config.base_url, "https://assets.example.com");
        assert_eq!(config.timeout, Duration::from_millis(1500));

        clear_client_vars();
    }

    #[test]
    #[serial]
    fn test_client_from_env_invalid_values_use_defaults() {
        clear_client_vars();
        unsafe {
            env::set_var("API_URL", "   ");
            env::set_var("API_TIMEOUT", "soon");
        }

        let config = ClientConfig::from_env();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, DEFAULT_API_TIMEOUT);

        unsafe { env::set_var("API_TIMEOUT", "0") };
        assert_eq!(ClientConfig::from_env().timeout, DEFAULT_API_TIMEOUT);

        clear_client_vars();
    }
}
