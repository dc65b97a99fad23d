// UI layer: credential prompts with `dialoguer`, a progress bar with
// `indicatif`, and the end-of-run summary.
//
// The bar and the log output share stderr. Log lines are written through
// `SuspendingWriter`, which hides the bar while a line is printed and
// redraws it afterwards, so neither overwrites the other.

use anyhow::Result;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::Credentials;
use crate::upload::BatchReport;

/// Ask for whichever of key and secret is still empty. The secret is read
/// without echo.
pub fn prompt_missing_credentials(credentials: &mut Credentials) -> Result<()> {
    // `Input::interact_text()` prompts and returns what the user typed.
    if credentials.api_key.is_empty() {
        credentials.api_key = Input::new().with_prompt("API key").interact_text()?;
    }
    // `Password` hides input in the terminal.
    if credentials.api_secret.is_empty() {
        credentials.api_secret = Password::new().with_prompt("API secret").interact()?;
    }
    Ok(())
}

/// Bar that counts processed files and shows the current file name.
pub fn progress_bar() -> ProgressBar {
    // Nothing is drawn until the batch sets a length, so prompts that run
    // before the upload are not disturbed.
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}") {
        pb.set_style(style);
    }
    pb
}

/// `MakeWriter` for `tracing_subscriber` that suspends `bar` around every
/// write to the inner writer.
#[derive(Clone)]
pub struct SuspendingWriter<M> {
    bar: ProgressBar,
    inner: M,
}

impl<M> SuspendingWriter<M> {
    pub fn new(bar: ProgressBar, inner: M) -> Self {
        SuspendingWriter { bar, inner }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for SuspendingWriter<M> {
    type Writer = Suspended<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        Suspended {
            bar: self.bar.clone(),
            inner: self.inner.make_writer(),
        }
    }
}

/// Writer handed out by `SuspendingWriter`, one per log event.
pub struct Suspended<W> {
    bar: ProgressBar,
    inner: W,
}

impl<W: io::Write> io::Write for Suspended<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.suspend(|| self.inner.write(buf))
    }

    // The formatter hands over a whole line at once; keep it in a single
    // suspend so the bar is not redrawn mid-line.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.bar.suspend(|| self.inner.write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.bar.suspend(|| self.inner.flush())
    }
}

pub fn print_summary(report: &BatchReport) {
    if report.total() == 0 {
        println!("No files to upload.");
        return;
    }
    for file in &report.uploaded {
        println!("uploaded  {}", file.destination.display());
    }
    for file in &report.failed {
        println!("failed    {}: {}", file.path.display(), file.error);
    }
    println!(
        "{} of {} file(s) uploaded",
        report.uploaded.len(),
        report.total()
    );
}
