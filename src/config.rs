// Run configuration: credentials, API base URL resolution and the
// parameters of one upload batch.

use std::fmt;
use std::path::PathBuf;

use tracing::warn;

use crate::error::UploadError;

pub const PROD_BASE_URL: &str = "https://clearconsensus.io/apigw/api/v1/";
pub const ONBOARDING_BASE_URL: &str = "https://onboarding.clearconsensus.io/apigw/api/v1/";

/// Content type used for the storage PUT unless overridden.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// API key and secret. Lives for one run and is never written anywhere.
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Credentials {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Map a mode name to its API base URL. Unknown modes fall back to
/// production.
pub fn api_base_url(mode: &str) -> &'static str {
    match mode {
        "prod" => PROD_BASE_URL,
        "onboarding" => ONBOARDING_BASE_URL,
        other => {
            warn!("Unrecognized mode {:?}, using production API", other);
            PROD_BASE_URL
        }
    }
}

/// Everything one batch needs.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub credentials: Credentials,
    pub mode: String,
    pub description: String,
    /// Replaces the mode-derived base URL when set.
    pub api_url: Option<String>,
    pub content_type: String,
}

impl UploadConfig {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        credentials: Credentials,
        mode: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        UploadConfig {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            credentials,
            mode: mode.into(),
            description: description.into(),
            api_url: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Fail unless both credential fields are present.
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.credentials.is_complete() {
            Ok(())
        } else {
            Err(UploadError::Configuration {
                mode: self.mode.clone(),
            })
        }
    }

    /// Base URL for API calls, always ending in `/`.
    pub fn base_url(&self) -> String {
        match &self.api_url {
            Some(url) if url.ends_with('/') => url.clone(),
            Some(url) => format!("{}/", url),
            None => api_base_url(&self.mode).to_string(),
        }
    }
}
