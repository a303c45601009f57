//! Progress notifications emitted by the pagination aggregator.

/// Receives human-readable progress messages on the calling task.
///
/// Called after page-1 metadata is parsed, before every subsequent page
/// fetch, and once after aggregation finishes.
pub trait ProgressObserver: Send + Sync {
    /// Handles one progress message.
    fn on_progress(&self, message: &str);
}

impl<F> ProgressObserver for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_progress(&self, message: &str) {
        self(message);
    }
}

/// Observer that discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _message: &str) {}
}

/// Observer that forwards messages to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, message: &str) {
        tracing::info!("{message}");
    }
}
