//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: one indicatif bar of completed pages out of total.
//! Non-TTY or disabled: hidden bar; the coordinator logs progress instead.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {bar:40.green/dim} {pos:>5}/{len:5} {elapsed_precise} {wide_msg:.dim}")
        .expect("invalid template")
        .progress_chars("=> ")
}

/// Completed-page counter, optionally drawn on stderr
pub struct CrawlProgress {
    bar: ProgressBar,
}

impl CrawlProgress {
    /// Create a progress reporter, drawing only when enabled and stderr is a TTY.
    pub fn new(enabled: bool) -> Self {
        if enabled && std::io::stderr().is_terminal() {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            bar.set_style(bar_style());
            Self { bar }
        } else {
            Self::hidden()
        }
    }

    /// Counter that never draws.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Whether nothing is drawn.
    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    /// Reset to zero out of `total`.
    pub fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        if !self.bar.is_hidden() {
            self.bar.enable_steady_tick(Duration::from_millis(120));
        }
    }

    /// One more page written.
    pub fn advance(&self) {
        self.bar.inc(1);
    }

    /// Pages written so far.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Total pages, once started.
    pub fn total(&self) -> Option<u64> {
        self.bar.length()
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }

    /// Stop drawing and leave the bar where the failure happened.
    pub fn abandon(&self) {
        self.bar.abandon_with_message("failed");
    }
}

impl Default for CrawlProgress {
    fn default() -> Self {
        Self::hidden()
    }
}
