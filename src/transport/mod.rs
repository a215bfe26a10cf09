//! Delivery of run events to a lineage collector.
//!
//! The tracker only needs `emit`. Retries, batching and timeouts belong to
//! the emitter implementation.

pub mod console;
pub mod http;

use std::sync::{Mutex, PoisonError};

use crate::config::TransportConfig;
use crate::error::EmitError;
use crate::lineage::event::{EventType, RunEvent};

pub use console::ConsoleEmitter;
pub use http::HttpEmitter;

pub trait Emitter: Send + Sync {
    /// Delivers one event. Blocks until the collector answered or failed.
    fn emit(&self, event: &RunEvent) -> Result<(), EmitError>;
}

/// Builds the emitter selected by configuration.
pub fn from_config(config: &TransportConfig) -> Result<Box<dyn Emitter>, EmitError> {
    match config {
        TransportConfig::Http(http) => Ok(Box::new(HttpEmitter::new(http)?)),
        TransportConfig::Console => Ok(Box::new(ConsoleEmitter)),
        TransportConfig::Noop => Ok(Box::new(NoopEmitter)),
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEmitter;

impl Emitter for NoopEmitter {
    fn emit(&self, _event: &RunEvent) -> Result<(), EmitError> {
        Ok(())
    }
}

/// Keeps every emitted event in memory.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, event_type: EventType) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

impl Emitter for RecordingEmitter {
    fn emit(&self, event: &RunEvent) -> Result<(), EmitError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }
}

// Lets callers keep a handle on a shared emitter (e.g. a RecordingEmitter)
// while the tracker owns another.
impl<E: Emitter + ?Sized> Emitter for std::sync::Arc<E> {
    fn emit(&self, event: &RunEvent) -> Result<(), EmitError> {
        (**self).emit(event)
    }
}
