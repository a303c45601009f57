//! Binary-side runtime pieces: tracing setup, terminal detection, progress UI.

pub(crate) mod logging;
pub(crate) mod progress_manager;
pub(crate) mod terminal;
