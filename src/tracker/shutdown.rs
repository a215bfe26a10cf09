use std::sync::Arc;

use tracing::warn;

use super::{EmissionReport, RunTracker};
use crate::error::TrackerError;

/// Finalizes the run exactly once, either through `finish` or on drop.
///
/// Hold it for as long as the instrumented work runs; dropping it at the end
/// of `main` plays the role of a process-exit hook.
#[must_use = "dropping the guard finalizes the run immediately"]
#[derive(Debug)]
pub struct ShutdownGuard {
    tracker: Option<Arc<RunTracker>>,
}

impl ShutdownGuard {
    pub fn new(tracker: Arc<RunTracker>) -> Self {
        Self {
            tracker: Some(tracker),
        }
    }

    /// Finalizes now and hands back the outcome instead of logging it.
    pub fn finish(mut self) -> Result<EmissionReport, TrackerError> {
        match self.tracker.take() {
            Some(tracker) => tracker.finalize(),
            None => Err(TrackerError::AlreadyFinalized),
        }
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        if let Some(tracker) = self.tracker.take() {
            if let Err(e) = tracker.finalize() {
                warn!("Lineage finalize on shutdown failed: {}", e);
            }
        }
    }
}
