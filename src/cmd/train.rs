//! Single-model training and the comparison grid.

use anyhow::Result;
use console::{Term, style};
use tracing::info;

use dialogue_train::config::Config;
use dialogue_train::corpus::MarkdownStoryLoader;
use dialogue_train::errors::ConfigurationError;
use dialogue_train::exclusion::{ExclusionStoryCounter, parse_percentages};
use dialogue_train::orchestrator::{ComparisonOrchestrator, ComparisonPlan, TracingProgress};
use dialogue_train::policy::YamlPolicyLoader;
use dialogue_train::stories::resolve_stories;
use dialogue_train::trainer::{CommandTrainer, Trainer, TrainingRequest};
use dialogue_train::ui::GridUI;
use dialogue_train::ui::icons::CHECK;

use crate::Cli;

/// Train one model on the full story set with the first `--config`.
pub async fn cmd_default(cli: &Cli, config: &Config) -> Result<()> {
    let policy_config = cli
        .config
        .first()
        .ok_or(ConfigurationError::NoPolicyConfig)?;
    let stories = resolve_stories(&config.resolve(&cli.stories), cli.url.as_deref()).await?;

    let request = TrainingRequest {
        domain: config.resolve(&cli.domain),
        stories,
        output: config.resolve(&cli.out),
        policy_config: config.resolve(policy_config),
        exclusion_percentage: None,
        dump_stories: cli.dump_stories,
        extra_args: config.extra_args(),
    };

    let trainer = CommandTrainer::new(config.trainer_cmd(), &config.working_dir);
    let artifact = trainer.train(&request).await?;

    println!(
        "{} Model trained and saved to {}",
        CHECK,
        style(artifact.path.display()).green()
    );
    Ok(())
}

/// Train every `--config` at every exclusion percentage, `runs` times over,
/// then write the remaining story counts.
pub async fn cmd_compare(cli: &Cli, config: &Config, percentages: &[f64], runs: u32) -> Result<()> {
    let percentages = parse_percentages(percentages)?;
    let stories = resolve_stories(&config.resolve(&cli.stories), cli.url.as_deref()).await?;

    let plan = ComparisonPlan {
        stories,
        domain: config.resolve(&cli.domain),
        output_root: config.resolve(&cli.out),
        percentages,
        policy_configs: cli.config.iter().map(|p| config.resolve(p)).collect(),
        runs,
        dump_stories: cli.dump_stories,
        extra_args: config.extra_args(),
    };

    let trainer = CommandTrainer::new(config.trainer_cmd(), &config.working_dir);
    let policies = YamlPolicyLoader;
    let story_loader = MarkdownStoryLoader;
    let counter = ExclusionStoryCounter::new(&story_loader);

    if !Term::stderr().is_term() {
        let orchestrator = ComparisonOrchestrator::new(&trainer, &policies, &TracingProgress);
        let report = orchestrator.run(&plan, &counter).await?;
        info!(
            models = report.cells.len(),
            summary = %report.summary_path.display(),
            "Finished comparison training"
        );
        return Ok(());
    }

    let ui = GridUI::new(plan.total_cells() as u64, cli.verbose);
    let orchestrator = ComparisonOrchestrator::new(&trainer, &policies, &ui);
    match orchestrator.run(&plan, &counter).await {
        Ok(report) => {
            ui.grid_complete(&report);
            Ok(())
        }
        Err(e) => {
            ui.grid_failed(&e.to_string());
            Err(e.into())
        }
    }
}
