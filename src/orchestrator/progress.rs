//! Progress notifications emitted while a comparison grid runs.

use std::path::PathBuf;
use tracing::info;

use crate::exclusion::ExclusionPercentage;

/// Observable steps of a comparison run. Sinks cannot influence control flow.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    RunStarted {
        run: u32,
        total_runs: u32,
    },
    CellStarted {
        run: u32,
        round: usize,
        total_rounds: usize,
        policy: String,
        percentage: ExclusionPercentage,
        output: PathBuf,
    },
    CellFinished {
        run: u32,
        round: usize,
        policy: String,
        output: PathBuf,
    },
}

/// Receives [`GridEvent`]s from the orchestrator.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: &GridEvent);
}

/// Discards every event.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&self, _event: &GridEvent) {}
}

/// Logs each event through `tracing`.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_event(&self, event: &GridEvent) {
        match event {
            GridEvent::RunStarted { run, total_runs } => {
                info!("Starting run {}/{}", run, total_runs);
            }
            GridEvent::CellStarted {
                round,
                total_rounds,
                policy,
                percentage,
                ..
            } => {
                info!(
                    "Starting to train {} round {}/{} with {}% exclusion",
                    policy, round, total_rounds, percentage
                );
            }
            GridEvent::CellFinished { output, .. } => {
                info!(output = %output.display(), "cell finished");
            }
        }
    }
}
