use crate::domain::model::Progress;
use crate::domain::ports::ProgressObserver;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_progress(&self, _progress: Progress) {}
}

/// Logs once per whole-percent change rather than once per record.
#[derive(Debug)]
pub struct TracingProgress {
    last_percent: AtomicU8,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self {
            last_percent: AtomicU8::new(u8::MAX),
        }
    }
}

impl Default for TracingProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for TracingProgress {
    fn on_progress(&self, progress: Progress) {
        let percent = progress.percent();
        if self.last_percent.swap(percent, Ordering::Relaxed) != percent {
            tracing::debug!(
                "Progress {}% ({}/{})",
                percent,
                progress.processed,
                progress.limit
            );
        }
    }
}

#[cfg(feature = "cli")]
pub use bar::BarProgress;

#[cfg(feature = "cli")]
mod bar {
    use super::*;
    use indicatif::{ProgressBar, ProgressStyle};

    /// Terminal progress bar on stderr.
    pub struct BarProgress {
        bar: ProgressBar,
    }

    impl BarProgress {
        pub fn new(limit: u64, visible: bool) -> Self {
            if !visible {
                return Self {
                    bar: ProgressBar::hidden(),
                };
            }

            let bar = ProgressBar::new(limit);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% ({pos}/{len})")
            {
                bar.set_style(style.progress_chars("#>-"));
            }
            Self { bar }
        }

        pub fn finish(&self) {
            self.bar.finish_and_clear();
        }
    }

    impl ProgressObserver for BarProgress {
        fn on_progress(&self, progress: Progress) {
            self.bar.set_position(progress.processed);
        }
    }
}
