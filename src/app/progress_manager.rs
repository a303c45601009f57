//! Progress UI (spinner) for export runs.

use std::time::Duration;

use dmw_export_core::{LogProgress, ProgressObserver};
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner that shows the latest progress message.
pub(crate) struct SpinnerProgress {
    spinner: ProgressBar,
}

impl SpinnerProgress {
    pub(crate) fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }
}

impl ProgressObserver for SpinnerProgress {
    fn on_progress(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }
}

impl Drop for SpinnerProgress {
    fn drop(&mut self) {
        self.spinner.finish_and_clear();
    }
}

/// Progress sink for one run: a spinner on interactive terminals, log lines otherwise.
pub(crate) enum RunProgress {
    Spinner(SpinnerProgress),
    Log(LogProgress),
}

impl RunProgress {
    pub(crate) fn new(use_spinner: bool) -> Self {
        if use_spinner {
            Self::Spinner(SpinnerProgress::new())
        } else {
            Self::Log(LogProgress)
        }
    }

    pub(crate) fn observer(&self) -> &dyn ProgressObserver {
        match self {
            Self::Spinner(spinner) => spinner,
            Self::Log(log) => log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_progress_without_spinner_logs() {
        let progress = RunProgress::new(false);
        assert!(matches!(progress, RunProgress::Log(_)));
        progress.observer().on_progress("Fetching page 2/3");
    }

    #[test]
    fn test_spinner_accepts_messages_and_clears_on_drop() {
        let progress = RunProgress::new(true);
        progress.observer().on_progress("Meta: total=1, perPage=1, lastPage=1");
        progress.observer().on_progress("Wrote: out.csv");
        drop(progress);
    }
}
