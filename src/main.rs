use std::sync::Arc;

use anyhow::{bail, Context, Result};
use frame_lineage::observability::{init_logging, LogFormat};
use frame_lineage::{LineageConfig, LineageSession, RunTracker, Table};

// Usage: frame-lineage <input.csv>... <output.csv>
// Concatenates the inputs into the output and reports the run's lineage.
fn main() -> Result<()> {
    init_logging(LogFormat::Compact);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((output, inputs)) = args.split_last() else {
        bail!("usage: frame-lineage <input.csv>... <output.csv>");
    };
    if inputs.is_empty() {
        bail!("usage: frame-lineage <input.csv>... <output.csv>");
    }

    let config = LineageConfig::from_env().context("invalid lineage configuration")?;
    let tracker = Arc::new(RunTracker::from_config(&config).context("cannot build emitter")?);
    tracing::info!("Lineage run {} starting", tracker.run_id());

    let session = LineageSession::new(tracker);
    let guard = session.shutdown_guard();

    let mut combined: Option<Table> = None;
    for input in inputs {
        let table = session
            .read_csv(input)
            .with_context(|| format!("reading {}", input))?;
        match combined.as_mut() {
            Some(acc) => acc
                .append(&table)
                .with_context(|| format!("appending {}", input))?,
            None => {
                let mut acc = Table::empty(table.columns().to_vec());
                acc.append(&table)?;
                session.on_transform(&acc);
                combined = Some(acc);
            }
        }
    }

    if let Some(table) = &combined {
        session
            .write_csv(table, output)
            .with_context(|| format!("writing {}", output))?;
        tracing::info!("Wrote {} rows to {}", table.len(), output);
    }

    // Lineage problems never fail the pipeline.
    match guard.finish() {
        Ok(report) => tracing::info!(
            "Lineage complete: {} inputs, {} outputs, {} skipped",
            report.inputs,
            report.outputs,
            report.skipped
        ),
        Err(e) => tracing::warn!("Lineage not reported: {}", e),
    }

    Ok(())
}
