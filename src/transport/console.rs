use super::Emitter;
use crate::error::EmitError;
use crate::lineage::event::RunEvent;

/// Writes serialized events to the log. Used when no collector URL is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleEmitter;

impl Emitter for ConsoleEmitter {
    fn emit(&self, event: &RunEvent) -> Result<(), EmitError> {
        let json = serde_json::to_string(event)?;
        tracing::info!(target: "frame_lineage::events", "{}", json);
        Ok(())
    }
}
