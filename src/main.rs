// Entrypoint for the uploader.
// - Keeps `main` small: parse flags, set up logging, run one batch.
// - Per-file failures are reported in the summary; only missing
//   credentials or an unreadable input directory make the process fail.

mod cli;

use anyhow::Context;
use clap::Parser;
use submission_upload::{
    config::{Credentials, UploadConfig},
    ui,
    upload,
};

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The bar is created first so the logger can pause it around each line.
    let progress = ui::progress_bar();
    cli::init_logging(cli.verbose, &progress);

    // Missing values stay empty here; the batch rejects them before it
    // touches any file.
    let mut credentials = Credentials::new(
        cli.api_key.unwrap_or_default(),
        cli.api_secret.unwrap_or_default(),
    );
    if cli.prompt {
        ui::prompt_missing_credentials(&mut credentials)?;
    }

    let mut config = UploadConfig::new(cli.input, cli.output, credentials, cli.mode, cli.description)
        .with_content_type(cli.content_type);
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url);
    }

    let report = upload::submission_upload(&config, &progress).context("Error in submission upload")?;
    progress.finish_and_clear();

    ui::print_summary(&report);
    Ok(())
}
