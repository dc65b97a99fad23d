// API client module: a small blocking HTTP client for the upload API.
// It asks the API gateway for a pre-signed upload link and then PUTs the
// file bytes to that link. One client is built per run and reused.

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::asset::Asset;
use crate::config::Credentials;
use crate::error::{FailureKind, HttpFailure, UploadError};
use crate::token::create_token;

/// Marker the API uses to tell submissions apart from other uploads.
pub const SUBMISSION_MODE: &str = "submission";

const JSON: &str = "application/json";

/// Body of `POST upload/data`.
#[derive(Serialize, Debug)]
pub struct UploadLinkRequest<'a> {
    pub client: &'a str,
    pub file_name: &'a str,
    pub mode: &'a str,
    pub asset: &'a Asset,
    pub description: &'a str,
}

/// Blocking client bound to one API base URL and credential pair.
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl ApiClient {
    /// `base_url` must end with `/`; endpoint paths are appended to it.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self, UploadError> {
        let client = Client::builder().build().map_err(UploadError::HttpClient)?;
        Ok(ApiClient {
            client,
            base_url: base_url.into(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the API for a pre-signed upload URL. Returns the `s3Url` field
    /// of the response.
    pub fn request_upload_link(&self, request: &UploadLinkRequest) -> Result<String, HttpFailure> {
        let url = format!("{}upload/data", self.base_url);
        info!("Sending request to: {}", url);
        if let Ok(payload) = serde_json::to_string_pretty(request) {
            debug!("Payload: {}", payload);
        }
        debug!(
            "Headers: x-api-key={}, x-api-token=<redacted>, content-type={}, accept={}",
            self.credentials.api_key, JSON, JSON
        );

        // A new token per request; the server decides how long one is valid.
        let token = create_token(&self.credentials.api_key, &self.credentials.api_secret);
        let res = self
            .client
            .post(&url)
            .header("x-api-key", &self.credentials.api_key)
            .header("x-api-token", token)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .json(request)
            .send()
            .map_err(transport_failure)?;

        let status = res.status();
        let headers = res.headers().clone();
        info!("Response status code: {}", status);
        debug!("Response headers: {:?}", headers);

        // Read the body once as text so every failure below can carry it.
        let body = match res.text() {
            Ok(body) => body,
            Err(e) => {
                let mut failure = transport_failure(e);
                failure.status = Some(status);
                failure.headers = Some(headers);
                return Err(failure);
            }
        };

        if !status.is_success() {
            return Err(HttpFailure::new(FailureKind::Status, "upload link request rejected")
                .with_response(status, headers, body));
        }

        // Parse into a `Value` first so "not JSON" and "no s3Url" stay
        // distinguishable.
        let data: Value = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(e) => {
                return Err(HttpFailure::new(
                    FailureKind::InvalidJson,
                    format!("failed to parse response as JSON: {}", e),
                )
                .with_response(status, headers, body))
            }
        };

        match data.get("s3Url").and_then(Value::as_str) {
            Some(link) => Ok(link.to_string()),
            None => Err(HttpFailure::new(
                FailureKind::MissingUploadUrl,
                "invalid response from server: missing s3Url",
            )
            .with_response(status, headers, body)),
        }
    }

    /// Stream the file at `path` to a pre-signed `link` with a PUT.
    pub fn transfer_file(&self, link: &str, path: &Path, content_type: &str) -> Result<(), HttpFailure> {
        let file = File::open(path).map_err(|e| {
            HttpFailure::new(
                FailureKind::LocalFile,
                format!("failed to open {}: {}", path.display(), e),
            )
        })?;

        // The blocking `Body` built from a `File` knows its length, so the
        // request carries a Content-Length as pre-signed URLs expect.
        let res = self
            .client
            .put(link)
            .header(CONTENT_TYPE, content_type)
            .body(file)
            .send()
            .map_err(transport_failure)?;

        debug!("Upload response status code: {}", res.status());
        if !res.status().is_success() {
            return Err(status_failure(res, "upload rejected by storage"));
        }
        Ok(())
    }
}

fn transport_failure(e: reqwest::Error) -> HttpFailure {
    HttpFailure::new(FailureKind::Transport, e.to_string())
}

fn status_failure(res: Response, message: &str) -> HttpFailure {
    let status = res.status();
    let headers = res.headers().clone();
    let body = res.text().unwrap_or_default();
    HttpFailure::new(FailureKind::Status, message).with_response(status, headers, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::parse_file_name;

    #[test]
    fn request_body_matches_api_shape() {
        let parsed = parse_file_name("AAPL_EQ_RISK_ACME_20240101_0930").unwrap();
        let request = UploadLinkRequest {
            client: &parsed.client,
            file_name: "AAPL_EQ_RISK_ACME_20240101_0930.csv",
            mode: SUBMISSION_MODE,
            asset: &parsed.asset,
            description: "Sample submission upload",
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "client": "ACME",
                "file_name": "AAPL_EQ_RISK_ACME_20240101_0930.csv",
                "mode": "submission",
                "asset": {
                    "name": "AAPL",
                    "sub_asset": "EQ",
                    "service": "RISK",
                    "snap_time": "0930",
                    "date": "20240101",
                },
                "description": "Sample submission upload",
            })
        );
    }

    #[test]
    fn unreachable_host_is_a_transport_failure() {
        let api = ApiClient::new("http://127.0.0.1:1/", Credentials::new("k", "s")).unwrap();
        let parsed = parse_file_name("A_B_C_D_E_F").unwrap();
        let request = UploadLinkRequest {
            client: &parsed.client,
            file_name: "A_B_C_D_E_F.csv",
            mode: SUBMISSION_MODE,
            asset: &parsed.asset,
            description: "",
        };
        let failure = api.request_upload_link(&request).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Transport);
        assert!(failure.status.is_none());
        assert!(failure.body.is_none());
    }

    #[test]
    fn missing_local_file_fails_before_sending() {
        let api = ApiClient::new("http://127.0.0.1:1/", Credentials::new("k", "s")).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let failure = api
            .transfer_file("http://127.0.0.1:1/x", &dir.path().join("gone.csv"), "text/plain")
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::LocalFile);
    }
}
