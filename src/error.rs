// Error types for the submission upload pipeline.
//
// `Configuration`, `HttpClient` and `Discovery` abort a run. Every other
// variant is scoped to a single file: the batch logs it, records it in
// the report and moves on.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while uploading a batch of files.
#[derive(Error, Debug)]
pub enum UploadError {
    /// API key or secret missing
    #[error("{mode} API key and secret are required")]
    Configuration { mode: String },

    /// HTTP client could not be initialized
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Input directory missing or unreadable
    #[error("failed to read files from {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File name does not split into six segments
    #[error("invalid file name {name:?}: expected 6 underscore-separated segments, found {segments}")]
    Parse { name: String, segments: usize },

    /// File name is not valid UTF-8, so it cannot be split at all
    #[error("invalid file name {name:?}: not valid UTF-8")]
    InvalidFileName { name: String },

    /// Upload link could not be obtained
    #[error("failed to generate upload link for {}: {failure}", path.display())]
    LinkRequest { path: PathBuf, failure: HttpFailure },

    /// File bytes could not be sent to the upload link
    #[error("failed to upload file {}: {failure}", path.display())]
    Transfer { path: PathBuf, failure: HttpFailure },

    /// Uploaded file could not be moved to the output directory
    #[error("error moving file from {} to {}: {source}", from.display(), to.display())]
    Archive {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    /// Whether this error stops the whole run rather than one file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            UploadError::Configuration { .. }
                | UploadError::HttpClient(_)
                | UploadError::Discovery { .. }
        )
    }
}

/// What went wrong during an HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection, DNS, TLS or body streaming failure; no response.
    Transport,
    /// Server answered with a non-2xx status.
    Status,
    /// Response body was not JSON.
    InvalidJson,
    /// JSON response had no `s3Url` string.
    MissingUploadUrl,
    /// Local file could not be opened for sending.
    LocalFile,
}

/// Diagnostic detail for a failed HTTP exchange. Response fields are set
/// only when the server actually answered.
#[derive(Debug)]
pub struct HttpFailure {
    pub kind: FailureKind,
    pub message: String,
    pub status: Option<StatusCode>,
    pub headers: Option<HeaderMap>,
    pub body: Option<String>,
}

impl HttpFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        HttpFailure {
            kind,
            message: message.into(),
            status: None,
            headers: None,
            body: None,
        }
    }

    pub fn with_response(mut self, status: StatusCode, headers: HeaderMap, body: String) -> Self {
        self.status = Some(status);
        self.headers = Some(headers);
        self.body = Some(body);
        self
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}
