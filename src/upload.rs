// Upload orchestration.
//
// Each file goes through four steps in order: parse its name, request an
// upload link, PUT the bytes, move it to the output directory. A failure
// in any step is logged, recorded in the `BatchReport` and the batch
// continues with the next file. Only missing credentials or an unreadable
// input directory stop the run.

use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::api::{ApiClient, UploadLinkRequest, SUBMISSION_MODE};
use crate::asset::{parse_path, Asset};
use crate::config::UploadConfig;
use crate::discover::list_files;
use crate::error::{FailureKind, HttpFailure, UploadError};

/// Extension of the files picked up from the input directory.
pub const INPUT_EXTENSION: &str = "csv";

/// One file on its way through the pipeline.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub path: PathBuf,
    pub file_name: String,
    pub asset: Asset,
    pub client: String,
    /// Pre-signed destination, set once the API hands it out.
    pub upload_link: Option<String>,
}

impl UploadTask {
    /// Build a task from a discovered path by parsing its file name.
    pub fn from_path(path: PathBuf) -> Result<Self, UploadError> {
        let parsed = parse_path(&path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(UploadTask {
            path,
            file_name,
            asset: parsed.asset,
            client: parsed.client,
            upload_link: None,
        })
    }

    pub fn request_upload_link(&mut self, api: &ApiClient, description: &str) -> Result<(), UploadError> {
        let request = UploadLinkRequest {
            client: &self.client,
            file_name: &self.file_name,
            mode: SUBMISSION_MODE,
            asset: &self.asset,
            description,
        };
        let link = api
            .request_upload_link(&request)
            .map_err(|failure| UploadError::LinkRequest {
                path: self.path.clone(),
                failure,
            })?;
        self.upload_link = Some(link);
        Ok(())
    }

    pub fn transfer_file(&self, api: &ApiClient, content_type: &str) -> Result<(), UploadError> {
        let Some(link) = self.upload_link.as_deref() else {
            return Err(UploadError::LinkRequest {
                path: self.path.clone(),
                failure: HttpFailure::new(
                    FailureKind::MissingUploadUrl,
                    "no upload link acquired before transfer",
                ),
            });
        };
        api.transfer_file(link, &self.path, content_type)
            .map_err(|failure| UploadError::Transfer {
                path: self.path.clone(),
                failure,
            })
    }

    /// Move the file into `output_dir`, creating it if needed. Returns the
    /// new path. This is a plain rename, so both directories must be on the
    /// same filesystem.
    pub fn archive(&self, output_dir: &Path) -> Result<PathBuf, UploadError> {
        let target = output_dir.join(&self.file_name);
        let archive_error = |source: std::io::Error| UploadError::Archive {
            from: self.path.clone(),
            to: target.clone(),
            source,
        };

        fs::create_dir_all(output_dir).map_err(archive_error)?;
        fs::rename(&self.path, &target).map_err(archive_error)?;
        info!(
            "File moved successfully from {} to {}",
            self.path.display(),
            target.display()
        );
        Ok(target)
    }
}

#[derive(Debug)]
pub struct UploadedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: UploadError,
}

/// Outcome of one batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub uploaded: Vec<UploadedFile>,
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Upload every matching file in `config.input_dir`.
///
/// `progress` gets its length set to the number of discovered files and is
/// advanced once per file; pass `ProgressBar::hidden()` when no terminal
/// output is wanted.
pub fn submission_upload(config: &UploadConfig, progress: &ProgressBar) -> Result<BatchReport, UploadError> {
    // Fail before anything touches the filesystem or the network.
    config.validate()?;

    let api = ApiClient::new(config.base_url(), config.credentials.clone())?;
    let files = list_files(&config.input_dir, INPUT_EXTENSION)?;
    info!("Found {} file(s) to upload via {}", files.len(), api.base_url());
    progress.set_length(files.len() as u64);

    let mut report = BatchReport::default();
    for path in files {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        progress.set_message(display_name.clone());
        info!("Processing file: {}", display_name);

        // Any error here belongs to this file only: record it and move on.
        match process_file(&api, config, &path) {
            Ok(destination) => {
                info!("{} uploaded!", display_name);
                report.uploaded.push(UploadedFile {
                    source: path,
                    destination,
                });
            }
            Err(err) => {
                log_failure(&err);
                report.failed.push(FailedFile { path, error: err });
            }
        }
        progress.inc(1);
    }

    info!(
        "Upload finished: {} uploaded, {} failed",
        report.uploaded.len(),
        report.failed.len()
    );
    Ok(report)
}

fn process_file(api: &ApiClient, config: &UploadConfig, path: &Path) -> Result<PathBuf, UploadError> {
    // Parse, then link, then transfer, then archive. A file is moved only
    // after its bytes were accepted.
    let mut task = UploadTask::from_path(path.to_path_buf())?;
    task.request_upload_link(api, &config.description)?;
    task.transfer_file(api, &config.content_type)?;
    task.archive(&config.output_dir)
}

fn log_failure(err: &UploadError) {
    error!("{}", err);
    if let UploadError::LinkRequest { failure, .. } | UploadError::Transfer { failure, .. } = err {
        if let Some(status) = failure.status {
            error!("Error status: {}", status);
        }
        if let Some(headers) = &failure.headers {
            error!("Error headers: {:?}", headers);
        }
        if let Some(body) = &failure.body {
            error!("Error response: {}", body);
        }
    }
}
