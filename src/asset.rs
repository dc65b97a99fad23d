// Filename parsing: `assetName_subAsset_service_client_snapDate_snapTime.csv`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::UploadError;

const SEGMENT_COUNT: usize = 6;

/// Asset metadata sent with every upload link request. Field names and
/// order mirror the `asset` object the API expects.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub sub_asset: String,
    pub service: String,
    pub snap_time: String,
    pub date: String,
}

/// Result of parsing a file name: the asset plus the client segment,
/// which travels at the top level of the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFileName {
    pub asset: Asset,
    pub client: String,
}

/// Parse an extension-stripped file name.
pub fn parse_file_name(stem: &str) -> Result<ParsedFileName, UploadError> {
    let segments: Vec<&str> = stem.split('_').collect();
    let [name, sub_asset, service, client, date, snap_time] = segments[..] else {
        return Err(UploadError::Parse {
            name: stem.to_string(),
            segments: segments.len(),
        });
    };

    Ok(ParsedFileName {
        asset: Asset {
            name: name.to_string(),
            sub_asset: sub_asset.to_string(),
            service: service.to_string(),
            snap_time: snap_time.to_string(),
            date: date.to_string(),
        },
        client: client.to_string(),
    })
}

/// Parse the file name of `path`, ignoring its directory and extension.
pub fn parse_path(path: &Path) -> Result<ParsedFileName, UploadError> {
    // `file_stem` drops the last extension only: `a.b.csv` gives `a.b`.
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| UploadError::InvalidFileName {
            name: path.display().to_string(),
        })?;
    parse_file_name(stem)
}
