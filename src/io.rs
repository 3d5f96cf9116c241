//! File input/output.

pub mod grid_file;
pub mod obj;
pub mod utils;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use lazy_static::lazy_static;

lazy_static! {
    static ref DEFAULT_PROGRESS_STYLE: ProgressStyle = ProgressStyle::default_bar()
        .template("Progress: {bar:40}  {percent}% | ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
}

/// How much non-critical output to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    /// Print nothing.
    Quiet,
    /// Print status messages.
    Messages,
    /// Print status messages and show progress bars.
    Progress,
}

impl Verbosity {
    /// Whether status messages should be printed.
    pub fn print_messages(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Whether progress bars should be shown.
    pub fn show_progress(&self) -> bool {
        matches!(self, Self::Progress)
    }

    /// Creates a progress bar for the given number of work items, which is
    /// hidden unless progress should be shown.
    pub fn create_progress_bar(&self, n_items: usize) -> ProgressBar {
        if self.show_progress() {
            let progress_bar = ProgressBar::new(n_items as u64);
            progress_bar.set_style(DEFAULT_PROGRESS_STYLE.clone());
            progress_bar
        } else {
            ProgressBar::with_draw_target(Some(n_items as u64), ProgressDrawTarget::hidden())
        }
    }
}

/// Whether or not to automatically overwrite existing files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverwriteMode {
    Always,
    Never,
}
