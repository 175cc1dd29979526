//! Spinners for commands that wait on the network.

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::output::OutputFormat;

/// Create a spinner with a message.
///
/// JSON output and non-terminal stderr get a hidden bar so machine-readable
/// output stays clean.
pub fn spinner(msg: &str, format: OutputFormat) -> ProgressBar {
    if format == OutputFormat::Json {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run an async operation with a spinner, clearing it on completion.
pub async fn with_spinner<F, T>(msg: &str, format: OutputFormat, fut: F) -> T
where
    F: Future<Output = T>,
{
    let pb = spinner(msg, format);
    let result = fut.await;
    pb.finish_and_clear();
    result
}
