//! Run lifecycle tracking.
//!
//! # INVARIANTS
//! - At most one START event per run, emitted by the first caller of
//!   `ensure_start_emitted`. A failed START is not retried.
//! - Exactly one COMPLETE event, emitted by `finalize`.
//! - A START whose emission began before `finalize` is delivered first.
//! - Inputs and outputs are keyed by `HandleToken`; re-observing a handle
//!   replaces its reference.
//!
//! Lineage is a side channel: nothing in here panics or fails the host's I/O.

pub mod job;
pub mod run_id;
pub mod shutdown;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::LineageConfig;
use crate::error::{EmitError, TrackerError};
use crate::lineage::event::{Dataset, EventType, Job, RunEvent};
use crate::lineage::reference::{DatasetReference, HandleToken};
use crate::lineage::resolver::{DatasetResolver, StorageResolver};
use crate::transport::{self, Emitter};

use job::JobName;
pub use shutdown::ShutdownGuard;

/// What a single emission put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmissionReport {
    pub event_type: EventType,
    pub inputs: usize,
    pub outputs: usize,
    /// References the resolver could not name. Left out of the event.
    pub skipped: usize,
}

#[derive(Debug, Default)]
struct RunState {
    job_name: JobName,
    inputs: HashMap<HandleToken, DatasetReference>,
    outputs: HashMap<HandleToken, DatasetReference>,
    start_emitted: bool,
    finalized: bool,
}

/// Everything an event needs, copied out of the lock.
struct Snapshot {
    job_name: String,
    inputs: Vec<DatasetReference>,
    outputs: Vec<DatasetReference>,
}

pub struct RunTracker {
    state: Mutex<RunState>,
    // Serializes emissions so START and COMPLETE never interleave.
    emission: Mutex<()>,
    created_at: DateTime<Utc>,
    run_id: OnceLock<Uuid>,
    configured_job_name: Option<String>,
    job_namespace: String,
    integration: String,
    emitter: Box<dyn Emitter>,
    resolver: Box<dyn DatasetResolver>,
}

impl RunTracker {
    pub fn new(config: &LineageConfig, emitter: Box<dyn Emitter>) -> Self {
        Self {
            state: Mutex::new(RunState::default()),
            emission: Mutex::new(()),
            created_at: Utc::now(),
            run_id: OnceLock::new(),
            configured_job_name: config.job_name.clone(),
            job_namespace: config.job_namespace.clone(),
            integration: config.integration.clone(),
            emitter,
            resolver: Box::new(StorageResolver),
        }
    }

    /// Tracker with the emitter the configuration selects.
    pub fn from_config(config: &LineageConfig) -> Result<Self, EmitError> {
        let emitter = transport::from_config(&config.transport)?;
        Ok(Self::new(config, emitter))
    }

    pub fn with_resolver(mut self, resolver: Box<dyn DatasetResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Pins the creation instant the run id is derived from.
    pub fn with_created_at(mut self, instant: DateTime<Utc>) -> Self {
        self.created_at = instant;
        self
    }

    /// Computed on first access, then fixed for the life of the tracker.
    pub fn run_id(&self) -> Uuid {
        *self
            .run_id
            .get_or_init(|| run_id::run_id_for(self.created_at, run_id::RUN_ID_NAMESPACE))
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Resolves the job name once: configured override, else `caller`.
    pub fn ensure_job_name(&self, caller: &str) {
        let mut state = self.lock_state();
        if state
            .job_name
            .ensure(self.configured_job_name.as_deref(), caller)
        {
            debug!("Job name resolved: {:?}", state.job_name);
        }
    }

    /// Explicit job name. Wins over the caller fallback whenever it is set.
    pub fn override_job_name(&self, name: impl Into<String>) {
        self.lock_state().job_name.set_override(name);
    }

    pub fn job_name(&self) -> Option<String> {
        self.lock_state().job_name.as_str().map(str::to_string)
    }

    pub fn record_read(&self, reference: DatasetReference) {
        let mut state = self.lock_state();
        if state.finalized {
            debug!("Read of {} recorded after finalize", reference.path());
        }
        state.inputs.insert(reference.handle(), reference);
    }

    pub fn record_write(&self, reference: DatasetReference) {
        let mut state = self.lock_state();
        if state.finalized {
            debug!("Write of {} recorded after finalize", reference.path());
        }
        state.outputs.insert(reference.handle(), reference);
    }

    pub fn input_count(&self) -> usize {
        self.lock_state().inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.lock_state().outputs.len()
    }

    pub fn is_start_emitted(&self) -> bool {
        self.lock_state().start_emitted
    }

    pub fn is_finalized(&self) -> bool {
        self.lock_state().finalized
    }

    /// Emits START the first time it is called; later calls return `Ok(None)`.
    ///
    /// The flag is set before emitting, so a failed START is reported here
    /// and never attempted again.
    pub fn ensure_start_emitted(&self) -> Result<Option<EmissionReport>, TrackerError> {
        if self.lock_state().start_emitted {
            return Ok(None);
        }

        let _emission = self.lock_emission();
        let snapshot = {
            let mut state = self.lock_state();
            if state.start_emitted {
                return Ok(None);
            }
            state.start_emitted = true;
            if state.finalized {
                debug!("Run finalized before any activity; START skipped");
                return Ok(None);
            }
            self.snapshot(&state)
        };

        self.emit(EventType::Start, snapshot).map(Some)
    }

    /// Emits COMPLETE from whatever has been recorded so far.
    ///
    /// Must be called once, at shutdown. Recording that races with this call
    /// may or may not make it into the event.
    pub fn finalize(&self) -> Result<EmissionReport, TrackerError> {
        let _emission = self.lock_emission();
        let snapshot = {
            let mut state = self.lock_state();
            if state.finalized {
                warn!("finalize called twice for run {}", self.run_id());
                return Err(TrackerError::AlreadyFinalized);
            }
            state.finalized = true;
            self.snapshot(&state)
        };

        self.emit(EventType::Complete, snapshot)
    }

    fn snapshot(&self, state: &RunState) -> Snapshot {
        let mut inputs: Vec<DatasetReference> = state.inputs.values().cloned().collect();
        let mut outputs: Vec<DatasetReference> = state.outputs.values().cloned().collect();
        inputs.sort_by_key(DatasetReference::handle);
        outputs.sort_by_key(DatasetReference::handle);

        Snapshot {
            job_name: state
                .job_name
                .for_event(self.configured_job_name.as_deref())
                .to_string(),
            inputs,
            outputs,
        }
    }

    fn emit(&self, event_type: EventType, snapshot: Snapshot) -> Result<EmissionReport, TrackerError> {
        let mut skipped = 0;
        let inputs = self.resolve_all(&snapshot.inputs, &mut skipped);
        let outputs = self.resolve_all(&snapshot.outputs, &mut skipped);

        let report = EmissionReport {
            event_type,
            inputs: inputs.len(),
            outputs: outputs.len(),
            skipped,
        };

        let event = RunEvent::new(
            event_type,
            Utc::now(),
            self.run_id(),
            Job::task(&self.job_namespace, &snapshot.job_name, &self.integration),
            inputs,
            outputs,
        );

        match self.emitter.emit(&event) {
            Ok(()) => {
                info!(
                    "Emitted {:?} for run {} ({} inputs, {} outputs)",
                    event_type, event.run.run_id, report.inputs, report.outputs
                );
                Ok(report)
            }
            Err(e) => {
                warn!("Failed to emit {:?} for run {}: {}", event_type, event.run.run_id, e);
                Err(TrackerError::Emit(e))
            }
        }
    }

    // Skip-and-continue: one unresolvable dataset never drops the event.
    fn resolve_all(&self, references: &[DatasetReference], skipped: &mut usize) -> Vec<Dataset> {
        references
            .iter()
            .filter_map(|reference| match self.resolver.resolve(reference) {
                Ok(dataset) => Some(dataset),
                Err(e) => {
                    warn!("Skipping dataset {}: {}", reference.path(), e);
                    *skipped += 1;
                    None
                }
            })
            .collect()
    }

    fn lock_state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_emission(&self) -> MutexGuard<'_, ()> {
        self.emission.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RunTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunTracker")
            .field("created_at", &self.created_at)
            .field("job_namespace", &self.job_namespace)
            .field("integration", &self.integration)
            .finish_non_exhaustive()
    }
}
