//! Comparison grid: runs × exclusion percentages × policy configurations.
//!
//! Cells execute strictly in order (run, then percentage, then config), one
//! training job at a time. The first error aborts the remaining grid and
//! cells already trained keep their artifacts. The story-count summary is
//! written only after every cell has succeeded, so a missing
//! `num_stories.json` marks an incomplete run.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::naming::run_output_path;
use super::progress::{GridEvent, ProgressSink};
use crate::errors::{CompareError, ConfigurationError};
use crate::exclusion::{ExclusionPercentage, ExclusionStoryCounter};
use crate::extra_args::ExtraArgs;
use crate::policy::{PolicyConfigLoader, validate_single_policy};
use crate::trainer::{Trainer, TrainingRequest};

/// Inputs of one comparison invocation.
#[derive(Debug, Clone)]
pub struct ComparisonPlan {
    pub stories: PathBuf,
    pub domain: PathBuf,
    pub output_root: PathBuf,
    /// Order defines the 1-based round index; a repeated value reuses the
    /// round of its first occurrence
    pub percentages: Vec<ExclusionPercentage>,
    pub policy_configs: Vec<PathBuf>,
    pub runs: u32,
    pub dump_stories: bool,
    pub extra_args: ExtraArgs,
}

impl ComparisonPlan {
    /// 1-based round of `percentage`: the position of its first occurrence.
    pub fn round_of(&self, percentage: ExclusionPercentage) -> usize {
        self.percentages
            .iter()
            .position(|p| *p == percentage)
            .map_or(0, |i| i + 1)
    }

    pub fn total_cells(&self) -> usize {
        self.runs as usize * self.percentages.len() * self.policy_configs.len()
    }
}

/// A grid cell whose training job succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedCell {
    pub run: u32,
    pub round: usize,
    pub policy: String,
    pub percentage: ExclusionPercentage,
    pub output: PathBuf,
}

/// Outcome of a full comparison run.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub cells: Vec<CompletedCell>,
    pub story_counts: Vec<u64>,
    pub summary_path: PathBuf,
}

/// Drives the comparison grid against a trainer.
pub struct ComparisonOrchestrator<'a> {
    trainer: &'a dyn Trainer,
    configs: &'a dyn PolicyConfigLoader,
    progress: &'a dyn ProgressSink,
}

impl<'a> ComparisonOrchestrator<'a> {
    pub fn new(
        trainer: &'a dyn Trainer,
        configs: &'a dyn PolicyConfigLoader,
        progress: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            trainer,
            configs,
            progress,
        }
    }

    /// Train every cell of the grid, in order.
    pub async fn run_grid(&self, plan: &ComparisonPlan) -> Result<Vec<CompletedCell>, CompareError> {
        if plan.runs == 0 {
            return Err(ConfigurationError::ZeroRuns.into());
        }

        let total_rounds = plan.percentages.len();
        let mut completed = Vec::with_capacity(plan.total_cells());

        for run in 1..=plan.runs {
            self.progress.on_event(&GridEvent::RunStarted {
                run,
                total_runs: plan.runs,
            });

            for percentage in &plan.percentages {
                let round = plan.round_of(*percentage);

                for config_ref in &plan.policy_configs {
                    let cell = self
                        .train_cell(plan, run, round, total_rounds, *percentage, config_ref)
                        .await?;
                    completed.push(cell);
                }
            }
        }

        Ok(completed)
    }

    /// Train the grid, then count and persist the remaining stories per percentage.
    pub async fn run(
        &self,
        plan: &ComparisonPlan,
        counter: &ExclusionStoryCounter<'_>,
    ) -> Result<ComparisonReport, CompareError> {
        let cells = self.run_grid(plan).await?;

        let story_counts = counter.compute(&plan.stories, &plan.domain, &plan.percentages)?;
        let summary_path = counter.persist(&plan.output_root, &story_counts)?;

        Ok(ComparisonReport {
            cells,
            story_counts,
            summary_path,
        })
    }

    async fn train_cell(
        &self,
        plan: &ComparisonPlan,
        run: u32,
        round: usize,
        total_rounds: usize,
        percentage: ExclusionPercentage,
        config_ref: &Path,
    ) -> Result<CompletedCell, CompareError> {
        let config = self.configs.load(config_ref)?;
        let policy = validate_single_policy(&config)?.name().to_string();
        let output = run_output_path(&plan.output_root, run, &policy, round);

        self.progress.on_event(&GridEvent::CellStarted {
            run,
            round,
            total_rounds,
            policy: policy.clone(),
            percentage,
            output: output.clone(),
        });

        let request = TrainingRequest {
            domain: plan.domain.clone(),
            stories: plan.stories.clone(),
            output: output.clone(),
            policy_config: config_ref.to_path_buf(),
            exclusion_percentage: Some(percentage),
            dump_stories: plan.dump_stories,
            extra_args: plan.extra_args.clone(),
        };
        debug!(?request, "training cell");
        let artifact = self.trainer.train(&request).await?;

        self.progress.on_event(&GridEvent::CellFinished {
            run,
            round,
            policy: policy.clone(),
            output: artifact.path.clone(),
        });

        Ok(CompletedCell {
            run,
            round,
            policy,
            percentage,
            output: artifact.path,
        })
    }
}
