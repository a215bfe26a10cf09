#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use frame_lineage::error::EmitError;
use frame_lineage::lineage::event::RunEvent;
use frame_lineage::transport::{Emitter, RecordingEmitter};
use frame_lineage::{LineageConfig, RunTracker};

/// Emitter that always fails, counting attempts.
#[derive(Debug, Default)]
pub struct FailingEmitter {
    pub attempts: AtomicUsize,
}

impl FailingEmitter {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Emitter for FailingEmitter {
    fn emit(&self, _event: &RunEvent) -> Result<(), EmitError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(EmitError::Transport("collector unreachable".to_string()))
    }
}

pub fn recording_tracker() -> (RunTracker, Arc<RecordingEmitter>) {
    recording_tracker_with(LineageConfig::default())
}

pub fn recording_tracker_with(config: LineageConfig) -> (RunTracker, Arc<RecordingEmitter>) {
    let emitter = Arc::new(RecordingEmitter::new());
    let tracker = RunTracker::new(&config, Box::new(Arc::clone(&emitter)));
    (tracker, emitter)
}

pub fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
