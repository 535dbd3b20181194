//! Progress indicator utilities.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner counting processed items.
///
/// The total is unknown up front because listing pages are fetched lazily.
pub fn create_item_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{pos} items, {elapsed}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
