// Input directory scanning.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::UploadError;

/// List files directly inside `directory` whose name ends with
/// `.{extension}` (case-insensitive). Symlinks are followed; entries that
/// do not resolve to a file are skipped. Paths are sorted so runs are
/// reproducible.
pub fn list_files(directory: &Path, extension: &str) -> Result<Vec<PathBuf>, UploadError> {
    info!("Reading files from: {}", directory.display());

    let discovery_error = |source: std::io::Error| UploadError::Discovery {
        path: directory.to_path_buf(),
        source,
    };
    let suffix = format!(".{}", extension.to_lowercase());

    let mut files = Vec::new();
    for entry in fs::read_dir(directory).map_err(discovery_error)? {
        let entry = entry.map_err(discovery_error)?;
        let name = entry.file_name();
        if !name.to_string_lossy().to_lowercase().ends_with(&suffix) {
            continue;
        }

        // `Path::is_file` follows symlinks, `DirEntry::file_type` does not.
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        } else {
            debug!("Skipping {}: not a file", path.display());
        }
    }
    files.sort();
    Ok(files)
}
