// Library root
// ------------
// The binary (`main.rs`) only parses flags and hands an `UploadConfig` to
// `upload::submission_upload`.
//
// Module responsibilities:
// - `token`: HMAC auth token sent with every API request.
// - `discover`: lists candidate files in the input directory.
// - `asset`: turns a file name into asset metadata.
// - `api`: blocking HTTP calls (upload link request, file PUT).
// - `upload`: runs every file through parse, link, transfer, archive.
// - `config`: credentials, mode to base URL mapping, run parameters.
// - `error`: the `UploadError` type shared by all of the above.
// - `ui`: terminal prompts, progress bar and summary.
pub mod api;
pub mod asset;
pub mod config;
pub mod discover;
pub mod error;
pub mod token;
pub mod ui;
pub mod upload;

pub use config::{Credentials, UploadConfig};
pub use error::UploadError;
pub use upload::{submission_upload, BatchReport};
