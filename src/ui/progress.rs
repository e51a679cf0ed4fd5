//! Download progress bar.

use indicatif::{ProgressBar, ProgressStyle};

/// Build a visible progress indicator for a download.
///
/// Starts as a byte-counting spinner; [`set_download_length`] turns it into a
/// bar once the response size is known.
pub fn download_bar() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.magenta} {bytes} received") {
        bar.set_style(style);
    }
    bar
}

/// Record the expected size of a download and switch `bar` to a sized bar.
pub fn set_download_length(bar: &ProgressBar, len: u64) {
    bar.set_length(len);
    if let Ok(style) = ProgressStyle::with_template(
        "  {bar:40.magenta/dim} {bytes}/{total_bytes} {bytes_per_sec} eta {eta}",
    ) {
        bar.set_style(style.progress_chars("━╸ "));
    }
}
