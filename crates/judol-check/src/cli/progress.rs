//! Progress display while pages are being fetched.
//!
//! Uses `indicatif` to draw a bar on stderr with a running tally of
//! marker hits and failures.

use crate::audit::report::FetchResult;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Running counts shown next to the bar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub done: usize,
    pub matched: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record(&mut self, result: &FetchResult) {
        self.done += 1;
        if result.has_marker() {
            self.matched += 1;
        }
        if !result.is_ok() {
            self.failed += 1;
        }
    }

    pub fn message(&self) -> String {
        format!("{} matched, {} failed", self.matched, self.failed)
    }
}

/// Create the fetch progress bar, or a hidden one when `visible` is false.
pub fn create_fetch_progress(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "  {spinner:.cyan} [{bar:30.cyan/dim}] {pos}/{len} {msg} {elapsed:.dim}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("\u{2588}\u{2589}\u{2591}");
    bar.set_style(style);
    bar.set_message(Tally::default().message());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Advance the bar for one finished URL.
pub fn advance(bar: &ProgressBar, tally: &mut Tally, result: &FetchResult) {
    tally.record(result);
    bar.set_message(tally.message());
    bar.inc(1);
}
