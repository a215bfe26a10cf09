use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::table::Table;
use crate::error::InstrumentError;
use crate::lineage::reference::{DatasetReference, HandleToken};
use crate::tracker::job::caller_location;
use crate::tracker::{RunTracker, ShutdownGuard};

/// The interception point between table I/O and the run tracker.
///
/// Each wrapped call resolves the job name from its caller, makes sure the
/// START event went out, performs the I/O, then records the dataset.
/// Lineage failures are logged here; only argument and I/O errors reach
/// the caller.
#[derive(Debug, Clone)]
pub struct LineageSession {
    tracker: Arc<RunTracker>,
}

impl LineageSession {
    pub fn new(tracker: Arc<RunTracker>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &Arc<RunTracker> {
        &self.tracker
    }

    /// Guard that finalizes the run when dropped.
    pub fn shutdown_guard(&self) -> ShutdownGuard {
        ShutdownGuard::new(Arc::clone(&self.tracker))
    }

    #[track_caller]
    pub fn read_csv(&self, path: impl AsRef<Path>) -> Result<Table, InstrumentError> {
        let caller = caller_location();
        let location = dataset_path("read_csv", path.as_ref())?;

        self.before_io(caller);
        let table = Table::read_csv(path.as_ref())?;

        self.tracker.record_read(DatasetReference::new(
            table.handle(),
            location,
            table.columns().to_vec(),
        ));
        Ok(table)
    }

    #[track_caller]
    pub fn write_csv(&self, table: &Table, path: impl AsRef<Path>) -> Result<(), InstrumentError> {
        let caller = caller_location();
        let location = dataset_path("write_csv", path.as_ref())?;

        self.before_io(caller);
        table.write_csv(path.as_ref())?;

        self.tracker.record_write(DatasetReference::new(
            table.handle(),
            location,
            table.columns().to_vec(),
        ));
        Ok(())
    }

    /// Hook for hosts that perform their own reads.
    #[track_caller]
    pub fn observe_read(
        &self,
        handle: HandleToken,
        path: &str,
        columns: Vec<String>,
    ) -> Result<(), InstrumentError> {
        let caller = caller_location();
        let location = dataset_path("observe_read", Path::new(path))?;

        self.before_io(caller);
        self.tracker
            .record_read(DatasetReference::new(handle, location, columns));
        Ok(())
    }

    /// Hook for hosts that perform their own writes.
    #[track_caller]
    pub fn observe_write(
        &self,
        handle: HandleToken,
        path: &str,
        columns: Vec<String>,
    ) -> Result<(), InstrumentError> {
        let caller = caller_location();
        let location = dataset_path("observe_write", Path::new(path))?;

        self.before_io(caller);
        self.tracker
            .record_write(DatasetReference::new(handle, location, columns));
        Ok(())
    }

    /// Transformations are observed but not tracked.
    pub fn on_transform(&self, table: &Table) {
        info!("Transform observed on {}", table.handle());
    }

    fn before_io(&self, caller: &str) {
        self.tracker.ensure_job_name(caller);
        if let Err(e) = self.tracker.ensure_start_emitted() {
            warn!("Lineage START not delivered: {}", e);
        }
    }
}

fn dataset_path(operation: &'static str, path: &Path) -> Result<String, InstrumentError> {
    let location = path.to_string_lossy();
    if location.trim().is_empty() {
        return Err(InstrumentError::MissingPath {
            operation,
            argument: "path",
        });
    }
    Ok(location.into_owned())
}
