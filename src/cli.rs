// Command-line arguments and logging setup for the binary.
// Every credential and endpoint flag can also come from the environment,
// so the same invocation works from a shell or a scheduled job.

use clap::Parser;
use indicatif::ProgressBar;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use submission_upload::config::DEFAULT_CONTENT_TYPE;
use submission_upload::ui::SuspendingWriter;

/// Upload submission files to ClearConsensus.
///
/// Picks up `*.csv` files named
/// `assetName_subAsset_service_client_snapDate_snapTime.csv` from the input
/// directory, uploads each one and moves it to the output directory.
#[derive(Parser, Debug)]
#[command(name = "submission-upload")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// API key
    #[arg(long, env = "CLEARCONSENSUS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API secret used to sign request tokens
    #[arg(long, env = "CLEARCONSENSUS_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Target environment: "prod" or "onboarding" (anything else means prod)
    #[arg(long, env = "CLEARCONSENSUS_MODE", default_value = "onboarding")]
    pub mode: String,

    /// Free-text description attached to every upload
    #[arg(long, default_value = "Sample submission upload")]
    pub description: String,

    /// Directory to read files from
    #[arg(long, default_value = "Input")]
    pub input: PathBuf,

    /// Directory uploaded files are moved to
    #[arg(long, default_value = "Uploaded")]
    pub output: PathBuf,

    /// Override the API base URL derived from --mode
    #[arg(long, env = "API_GATEWAY_URL")]
    pub api_url: Option<String>,

    /// Content-Type sent with the file upload
    #[arg(long, default_value = DEFAULT_CONTENT_TYPE)]
    pub content_type: String,

    /// Prompt for a missing API key or secret
    #[arg(long)]
    pub prompt: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Logs go to stderr so the summary on stdout stays clean. `RUST_LOG`
/// takes precedence over `-v`. Each line is written with `progress`
/// suspended, so the bar and the log never draw over each other.
pub fn init_logging(verbose: u8, progress: &ProgressBar) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(SuspendingWriter::new(progress.clone(), std::io::stderr)))
        .with(filter)
        .init();
}
