pub mod compare;
pub mod naming;
pub mod progress;

pub use compare::{ComparisonOrchestrator, ComparisonPlan, ComparisonReport, CompletedCell};
pub use naming::run_output_path;
pub use progress::{GridEvent, NoProgress, ProgressSink, TracingProgress};
